use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::errors::SubtitleError;

// @module: Subtitle parsing and serialization

// @const: SRT timestamp pattern, exact-width
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

// @const: SRT timecode line, surrounding whitespace tolerated
static TIMECODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})\s*$").unwrap()
});

// @const: Block separator, one or more blank lines
static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// A time-of-day value with millisecond resolution.
///
/// Canonical textual form is `HH:MM:SS,mmm`; the valid range is
/// 00:00:00,000 through 99:59:59,999. Parsing and formatting are exact
/// inverses over that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    /// Create a timestamp from a millisecond count
    pub fn from_millis(millis: u64) -> Self {
        Timestamp { millis }
    }

    /// Millisecond count since 00:00:00,000
    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Parse an SRT timestamp in `HH:MM:SS,mmm` form.
    ///
    /// Accepts exactly the zero-padded pattern; minutes and seconds must be
    /// below 60. Anything else is a `MalformedTimecode`.
    pub fn parse(text: &str) -> Result<Self, SubtitleError> {
        let caps = TIMESTAMP_REGEX
            .captures(text)
            .ok_or_else(|| SubtitleError::MalformedTimecode(text.to_string()))?;

        // The pattern guarantees each group is two or three digits
        let hours: u64 = caps[1].parse().unwrap_or(0);
        let minutes: u64 = caps[2].parse().unwrap_or(0);
        let seconds: u64 = caps[3].parse().unwrap_or(0);
        let millis: u64 = caps[4].parse().unwrap_or(0);

        if minutes >= 60 || seconds >= 60 {
            return Err(SubtitleError::MalformedTimecode(text.to_string()));
        }

        Ok(Timestamp {
            millis: hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hours = self.millis / 3_600_000;
        let minutes = (self.millis % 3_600_000) / 60_000;
        let seconds = (self.millis % 60_000) / 1_000;
        let millis = self.millis % 1_000;
        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

/// An ordered (start, end) pair of timestamps.
///
/// start <= end is not enforced anywhere; odd ranges pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timecode {
    /// Display start time
    pub start: Timestamp,
    /// Display end time
    pub end: Timestamp,
}

impl Timecode {
    /// Create a timecode from a start and end timestamp
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Timecode { start, end }
    }

    /// Parse a `start --> end` timecode line, tolerating surrounding whitespace
    pub fn parse(text: &str) -> Result<Self, SubtitleError> {
        let caps = TIMECODE_REGEX
            .captures(text)
            .ok_or_else(|| SubtitleError::MalformedTimecode(text.to_string()))?;

        Ok(Timecode {
            start: Timestamp::parse(&caps[1])?,
            end: Timestamp::parse(&caps[2])?,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} --> {}", self.start, self.end)
    }
}

// Deserialized from the canonical range text so CSV fields round-trip
// through Display
impl<'de> Deserialize<'de> for Timecode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timecode::parse(&text).map_err(serde::de::Error::custom)
    }
}

// @struct: Single subtitle block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    // @field: Sequence number, re-derived on output
    pub index: usize,

    // @field: Display time range
    pub timecode: Timecode,

    // @field: Text lines in display order
    pub lines: Vec<String>,
}

impl SubtitleBlock {
    /// Create a new subtitle block
    pub fn new(index: usize, timecode: Timecode, lines: Vec<String>) -> Self {
        SubtitleBlock { index, timecode, lines }
    }

    /// All text lines joined into one string with single spaces
    pub fn flattened_text(&self) -> String {
        self.lines.join(" ")
    }
}

impl fmt::Display for SubtitleBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{}", self.timecode)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Collection of subtitle blocks read from one file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Blocks in file order
    pub blocks: Vec<SubtitleBlock>,
}

impl SubtitleCollection {
    /// Create a new subtitle collection
    pub fn new(source_file: PathBuf, blocks: Vec<SubtitleBlock>) -> Self {
        SubtitleCollection { source_file, blocks }
    }

    /// Read and parse an SRT file.
    ///
    /// Individual malformed blocks are dropped with a warning; a file that
    /// yields zero usable blocks is an `EmptyFileResult`, which aborts
    /// processing of that file only.
    pub fn from_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        let blocks = Self::parse_srt_string(&content);
        if blocks.is_empty() {
            return Err(SubtitleError::EmptyFileResult(path.to_path_buf()).into());
        }

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            blocks,
        })
    }

    /// Parse SRT text into subtitle blocks.
    ///
    /// The text is split into chunks on runs of blank lines. Each chunk must
    /// carry an integer index line, a timecode line, and at least one text
    /// line; chunks that don't are skipped with a warning and have no effect
    /// on their siblings. Text lines are kept verbatim.
    pub fn parse_srt_string(content: &str) -> Vec<SubtitleBlock> {
        // Files written by Windows tools often carry a BOM
        let content = content.strip_prefix('\u{feff}').unwrap_or(content).trim();

        if content.is_empty() {
            return Vec::new();
        }

        let mut blocks = Vec::new();
        for chunk in BLOCK_SEPARATOR_REGEX.split(content) {
            match Self::parse_block(chunk) {
                Ok(block) => blocks.push(block),
                Err(e) => warn!("Skipping subtitle block: {}", e),
            }
        }
        blocks
    }

    // @parses: One blank-line-delimited chunk
    fn parse_block(chunk: &str) -> Result<SubtitleBlock, SubtitleError> {
        let lines: Vec<&str> = chunk.lines().collect();
        if lines.len() < 3 {
            return Err(SubtitleError::MalformedBlockStructure(format!(
                "expected at least 3 lines, got {}",
                lines.len()
            )));
        }

        let index: usize = lines[0].trim().parse().map_err(|_| {
            SubtitleError::MalformedBlockStructure(format!(
                "subtitle number expected, got '{}'",
                lines[0].trim()
            ))
        })?;

        let timecode = Timecode::parse(lines[1])?;

        let text_lines = lines[2..].iter().map(|l| l.to_string()).collect();

        Ok(SubtitleBlock::new(index, timecode, text_lines))
    }

    /// Render all blocks back to SRT text.
    ///
    /// Structural inverse of `parse_srt_string` for any sequence whose blocks
    /// carry at least one line.
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str(&block.to_string());
        }
        out
    }

    /// Write blocks to an SRT file, creating parent directories if needed
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for block in &self.blocks {
            write!(file, "{}", block)?;
        }

        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Blocks: {}", self.blocks.len())?;
        Ok(())
    }
}
