use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;

use crate::subtitle_processor::{SubtitleBlock, Timecode};

// @module: CSV record store for subtitle text

/// Header of the timecode-range column
pub const TIMECODE_COLUMN: &str = "Timecode";
/// Header of the source-text column
pub const CONTENT_COLUMN: &str = "Content";
/// Header of the translated-text column
pub const TRANSLATION_COLUMN: &str = "Translation";

/// One subtitle row in tabular form.
///
/// The timecode field holds the canonical `start --> end` text in the CSV and
/// round-trips through `Timecode::parse`. The translation column is absent in
/// freshly extracted files and present after the translate stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubtitleRecord {
    /// Display time range
    #[serde(rename = "Timecode")]
    pub timecode: Timecode,

    /// Source text, lines flattened into one string
    #[serde(rename = "Content")]
    pub content: String,

    /// Translated text, if the record went through the translate stage
    #[serde(rename = "Translation", default)]
    pub translation: Option<String>,
}

impl SubtitleRecord {
    /// Create a record without a translation
    pub fn new(timecode: Timecode, content: String) -> Self {
        SubtitleRecord {
            timecode,
            content,
            translation: None,
        }
    }

    /// The text the convert stage should emit: the translation when one is
    /// present and non-empty, the source content otherwise
    pub fn output_text(&self) -> &str {
        match &self.translation {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.content,
        }
    }
}

/// Read subtitle records from a CSV file
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: SubtitleRecord =
            result.with_context(|| format!("Failed to parse CSV record in {}", path.display()))?;
        records.push(record);
    }

    Ok(records)
}

/// Write subtitle records to a CSV file.
///
/// The `Translation` column is written only when at least one record carries
/// a translation, so extracted files keep the two-column shape.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[SubtitleRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    let has_translation = records.iter().any(|r| r.translation.is_some());

    if has_translation {
        writer.write_record([TIMECODE_COLUMN, CONTENT_COLUMN, TRANSLATION_COLUMN])?;
        for record in records {
            writer.write_record([
                record.timecode.to_string().as_str(),
                record.content.as_str(),
                record.translation.as_deref().unwrap_or(""),
            ])?;
        }
    } else {
        writer.write_record([TIMECODE_COLUMN, CONTENT_COLUMN])?;
        for record in records {
            writer.write_record([record.timecode.to_string().as_str(), record.content.as_str()])?;
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

/// Flatten blocks into records, joining each block's lines with single spaces
pub fn blocks_to_records(blocks: &[SubtitleBlock]) -> Vec<SubtitleRecord> {
    blocks
        .iter()
        .map(|block| SubtitleRecord::new(block.timecode, block.flattened_text().trim().to_string()))
        .collect()
}

/// Turn records back into subtitle blocks, renumbered from 1.
///
/// Rows with empty output text are skipped with a warning. Any literal `-->`
/// inside the text is replaced with `→` so the serialized file stays
/// parseable.
pub fn records_to_blocks(records: &[SubtitleRecord]) -> Vec<SubtitleBlock> {
    let mut blocks = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        let text = record.output_text().trim();
        if text.is_empty() {
            warn!("Skipping row {}: empty subtitle text", row + 1);
            continue;
        }

        let text = text.replace("-->", "→");
        blocks.push(SubtitleBlock::new(
            blocks.len() + 1,
            record.timecode,
            vec![text],
        ));
    }

    blocks
}
