use anyhow::Result;
use unicode_width::UnicodeWidthChar;

use crate::app_config::SanitizeConfig;
use crate::script_convert::{IdentityConverter, ScriptConverter, TableConverter};

// @module: Script conversion and mixed-width spacing for one text field

/// Full-width punctuation marks that never get a space inserted next to them.
const FULLWIDTH_PUNCTUATION: &[char] = &[
    '。', '，', '！', '？', '：', '；', '“', '”', '‘', '’', '（', '）', '「', '」', '『', '』',
    '《', '》', '、', '—', '…', '～', '·', '〈', '〉', '﹏', '｛', '｝', '［', '］', '【', '】',
    '﹐', '﹑', '﹒', '﹔', '﹖', '﹗', '﹕', '﹘', '﹝', '﹞', '﹟', '﹡', '﹢', '﹣', '﹤', '﹥',
    '﹦', '﹩', '﹪', '﹫', '﹬', '﹭', '﹮', '﹯',
];

/// East Asian Width class H (halfwidth forms), as inclusive code point ranges.
const HALFWIDTH_RANGES: &[(char, char)] = &[
    ('\u{20A9}', '\u{20A9}'),
    ('\u{FF61}', '\u{FFBE}'),
    ('\u{FFC2}', '\u{FFC7}'),
    ('\u{FFCA}', '\u{FFCF}'),
    ('\u{FFD2}', '\u{FFD7}'),
    ('\u{FFDA}', '\u{FFDC}'),
    ('\u{FFE8}', '\u{FFEE}'),
];

/// Per-string sanitizer: applies the configured script conversion, then
/// inserts spaces at half-width/full-width boundaries.
///
/// Works on a flattened text value such as a table cell, independent of any
/// block structure. The converter choice is injected here rather than read
/// from global state.
#[derive(Debug)]
pub struct ContentSanitizer {
    converter: Box<dyn ScriptConverter>,
}

impl ContentSanitizer {
    /// Create a sanitizer with an explicit converter
    pub fn new(converter: Box<dyn ScriptConverter>) -> Self {
        ContentSanitizer { converter }
    }

    /// Create a sanitizer that only applies width spacing
    pub fn identity() -> Self {
        Self::new(Box::new(IdentityConverter))
    }

    /// Build a sanitizer from configuration, loading the conversion table if
    /// one is configured
    pub fn from_config(config: &SanitizeConfig) -> Result<Self> {
        match &config.conversion_table {
            Some(path) => Ok(Self::new(Box::new(TableConverter::from_json_file(path)?))),
            None => Ok(Self::identity()),
        }
    }

    /// Sanitize one text value: convert the whole string first, then walk it
    /// pairwise inserting width-boundary spaces. No characters are altered,
    /// reordered, or removed.
    pub fn sanitize(&self, content: &str) -> String {
        if content.is_empty() {
            return String::new();
        }
        insert_width_spacing(&self.converter.convert(content))
    }
}

/// Insert exactly one space between a half-width character and a following
/// full-width character that is not full-width punctuation, and symmetrically
/// between a full-width non-punctuation character and a following half-width
/// character. Pairs where either side is punctuation or whitespace are left
/// alone, as is the first character of the string.
pub fn insert_width_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if let Some(p) = prev {
            if !is_punctuation_or_space(p) && !is_punctuation_or_space(c) {
                if is_half_width(p) && is_full_width(c) && !is_full_width_punctuation(c) {
                    out.push(' ');
                } else if is_full_width(p) && !is_full_width_punctuation(p) && is_half_width(c) {
                    out.push(' ');
                }
            }
        }
        out.push(c);
        prev = Some(c);
    }

    out
}

/// Full-width covers the East Asian Wide, Fullwidth, and Ambiguous width
/// classes, which is exactly the set the CJK width tables report as 2 columns.
fn is_full_width(c: char) -> bool {
    c.width_cjk() == Some(2)
}

/// Half-width covers ASCII plus the East Asian Halfwidth class
fn is_half_width(c: char) -> bool {
    c.is_ascii() || HALFWIDTH_RANGES.iter().any(|&(lo, hi)| c >= lo && c <= hi)
}

fn is_full_width_punctuation(c: char) -> bool {
    FULLWIDTH_PUNCTUATION.contains(&c)
}

// Language-neutral whitespace and punctuation classes
fn is_punctuation_or_space(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation()
}
