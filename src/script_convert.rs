use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

// @module: Script conversion between writing-system variants

/// Deterministic character-level mapping between two writing-system variants
/// of the same language (e.g. Simplified to Traditional Chinese).
///
/// Implementations must be total over valid UTF-8 text and produce the same
/// output for the same input. The sanitizer applies the converter before any
/// width-based spacing.
pub trait ScriptConverter: Send + Sync + Debug {
    /// Convert a whole string to the target variant
    fn convert(&self, text: &str) -> String;
}

/// Converter that leaves text untouched. Used when no conversion table is
/// configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityConverter;

impl ScriptConverter for IdentityConverter {
    fn convert(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Converter backed by an explicit character map.
///
/// The map is loaded from a JSON object whose keys and values are single
/// characters, e.g. `{"国": "國", "后": "後"}`. Characters without an entry
/// pass through unchanged.
#[derive(Debug, Clone)]
pub struct TableConverter {
    table: HashMap<char, char>,
}

impl TableConverter {
    /// Build a converter from (source, target) character pairs
    pub fn from_pairs<I: IntoIterator<Item = (char, char)>>(pairs: I) -> Self {
        TableConverter {
            table: pairs.into_iter().collect(),
        }
    }

    /// Load a conversion table from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read conversion table: {}", path.display()))?;

        let raw: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse conversion table: {}", path.display()))?;

        let mut table = HashMap::with_capacity(raw.len());
        for (from, to) in raw {
            let from = single_char(&from)
                .ok_or_else(|| anyhow!("Conversion table key is not a single character: '{}'", from))?;
            let to = single_char(&to)
                .ok_or_else(|| anyhow!("Conversion table value is not a single character: '{}'", to))?;
            table.insert(from, to);
        }

        Ok(TableConverter { table })
    }
}

impl ScriptConverter for TableConverter {
    fn convert(&self, text: &str) -> String {
        text.chars()
            .map(|c| *self.table.get(&c).unwrap_or(&c))
            .collect()
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
