/*!
 * Tests for the CSV record store and block/record conversions
 */

use anyhow::Result;
use subpipe::tabular::{self, SubtitleRecord};

use crate::common;

/// Test flattening blocks into records
#[test]
fn test_blocks_to_records_withMultiLineBlock_shouldFlattenLines() {
    let blocks = vec![
        common::block(1, 0, 4_000, &["Hello", "world."]),
        common::block(2, 5_000, 9_000, &["Single line."]),
    ];
    let records = tabular::blocks_to_records(&blocks);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].content, "Hello world.");
    assert_eq!(records[0].timecode, blocks[0].timecode);
    assert_eq!(records[0].translation, None);
    assert_eq!(records[1].content, "Single line.");
}

/// Test rebuilding blocks from records, preferring the translation
#[test]
fn test_records_to_blocks_withTranslations_shouldUseTranslation() {
    let mut record = SubtitleRecord::new(common::timecode(0, 4_000), "Hello.".to_string());
    record.translation = Some("你好。".to_string());

    let blocks = tabular::records_to_blocks(&[record]);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].index, 1);
    assert_eq!(blocks[0].lines, vec!["你好。"]);
}

/// Test that rows with empty text are skipped and indices stay gap-free
#[test]
fn test_records_to_blocks_withEmptyRow_shouldSkipAndRenumber() {
    let records = vec![
        SubtitleRecord::new(common::timecode(0, 1_000), "First.".to_string()),
        SubtitleRecord::new(common::timecode(1_000, 2_000), "   ".to_string()),
        SubtitleRecord::new(common::timecode(2_000, 3_000), "Third.".to_string()),
    ];
    let blocks = tabular::records_to_blocks(&records);

    assert_eq!(blocks.len(), 2);
    let indices: Vec<usize> = blocks.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(blocks[1].lines, vec!["Third."]);
}

/// Test that a literal arrow in the text is escaped so serialization stays
/// parseable
#[test]
fn test_records_to_blocks_withArrowInText_shouldEscapeArrow() {
    let record = SubtitleRecord::new(common::timecode(0, 1_000), "a --> b.".to_string());
    let blocks = tabular::records_to_blocks(&[record]);

    assert_eq!(blocks[0].lines, vec!["a → b."]);
}

/// Test the output text fallback when the translation is empty
#[test]
fn test_output_text_withEmptyTranslation_shouldFallBackToContent() {
    let mut record = SubtitleRecord::new(common::timecode(0, 1_000), "Source.".to_string());
    assert_eq!(record.output_text(), "Source.");

    record.translation = Some("".to_string());
    assert_eq!(record.output_text(), "Source.");

    record.translation = Some("Übersetzt.".to_string());
    assert_eq!(record.output_text(), "Übersetzt.");
}

/// Test writing and reading records without a translation column
#[test]
fn test_csv_roundTrip_withoutTranslation_shouldKeepTwoColumns() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("extracted.csv");

    let records = vec![
        SubtitleRecord::new(common::timecode(1_000, 4_000), "First.".to_string()),
        SubtitleRecord::new(common::timecode(5_000, 9_000), "Second, with comma.".to_string()),
    ];
    tabular::write_records(&path, &records)?;

    let header = std::fs::read_to_string(&path)?;
    assert!(header.starts_with("Timecode,Content\n"));

    let reread = tabular::read_records(&path)?;
    assert_eq!(reread, records);

    Ok(())
}

/// Test writing and reading records with a translation column
#[test]
fn test_csv_roundTrip_withTranslation_shouldKeepThreeColumns() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("pretranslated.csv");

    let mut records = vec![
        SubtitleRecord::new(common::timecode(1_000, 4_000), "Hello.".to_string()),
        SubtitleRecord::new(common::timecode(5_000, 9_000), "World.".to_string()),
    ];
    records[0].translation = Some("你好。".to_string());
    records[1].translation = Some("世界。".to_string());

    tabular::write_records(&path, &records)?;

    let header = std::fs::read_to_string(&path)?;
    assert!(header.starts_with("Timecode,Content,Translation\n"));

    let reread = tabular::read_records(&path)?;
    assert_eq!(reread, records);

    Ok(())
}

/// Test that the timecode column round-trips through its canonical text
#[test]
fn test_csv_roundTrip_withTimecodes_shouldPreserveMillis() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("timecodes.csv");

    let records = vec![SubtitleRecord::new(
        common::timecode(3_725_123, 3_729_456),
        "Text.".to_string(),
    )];
    tabular::write_records(&path, &records)?;

    let reread = tabular::read_records(&path)?;
    assert_eq!(reread[0].timecode.start.as_millis(), 3_725_123);
    assert_eq!(reread[0].timecode.end.as_millis(), 3_729_456);

    Ok(())
}

/// Test that a malformed timecode cell fails the read with context
#[test]
fn test_read_records_withMalformedTimecode_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "bad.csv",
        "Timecode,Content\nnot a timecode,Text.\n",
    )?;

    assert!(tabular::read_records(&path).is_err());

    Ok(())
}
