/*!
 * End-to-end tests for the batch pipeline
 */

use anyhow::Result;
use subpipe::app_config::Config;
use subpipe::app_controller::Controller;
use subpipe::providers::mock::{MockProvider, TRANSLATED_MARKER};
use subpipe::subtitle_processor::SubtitleCollection;
use subpipe::tabular;
use subpipe::translation_service::TranslationService;

use crate::common;

fn controller() -> Controller {
    Controller::with_config(Config::default()).expect("default config is valid")
}

/// Test preprocessing a file where the first two blocks lack terminal
/// punctuation: they merge, everything renumbers gap-free
#[test]
fn test_preprocess_file_withUnterminatedBlocks_shouldMergeAndRenumber() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_unterminated_subtitle(temp_dir.path(), "input.srt")?;
    let output = temp_dir.path().join("input_cleaned.srt");

    controller().preprocess_file(&input, &output)?;

    let cleaned = SubtitleCollection::from_srt_file(&output)?;
    assert_eq!(cleaned.blocks.len(), 3);

    assert_eq!(cleaned.blocks[0].lines, vec!["This sentence continues across two blocks."]);
    assert_eq!(cleaned.blocks[0].timecode.start.as_millis(), 1_000);
    assert_eq!(cleaned.blocks[0].timecode.end.as_millis(), 9_000);
    assert_eq!(cleaned.blocks[1].lines, vec!["This one stands alone."]);
    assert_eq!(cleaned.blocks[2].lines, vec!["And so does this one!"]);

    let indices: Vec<usize> = cleaned.blocks.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    Ok(())
}

/// Test that a malformed chunk has no effect on final indices
#[test]
fn test_preprocess_file_withMalformedChunk_shouldRenumberWithoutGaps() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst.\n\nabc\n00:00:03,000 --> 00:00:04,000\nDropped.\n\n3\n00:00:05,000 --> 00:00:06,000\nSecond.\n";
    let input = common::create_test_file(temp_dir.path(), "input.srt", content)?;
    let output = temp_dir.path().join("input_cleaned.srt");

    controller().preprocess_file(&input, &output)?;

    let cleaned = SubtitleCollection::from_srt_file(&output)?;
    let indices: Vec<usize> = cleaned.blocks.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(cleaned.blocks[1].lines, vec!["Second."]);

    Ok(())
}

/// Test that a folder batch survives one bad file and processes the rest
#[test]
fn test_preprocess_folder_withOneEmptyFile_shouldContinueBatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("raw");
    std::fs::create_dir_all(&input_dir)?;

    common::create_test_subtitle(&input_dir, "good.srt")?;
    common::create_test_file(&input_dir, "bad.srt", "no blocks here\n")?;

    let output_dir = temp_dir.path().join("preprocessed");
    let processed = controller().preprocess_folder(&input_dir, &output_dir, false)?;

    assert_eq!(processed, 1);
    assert!(output_dir.join("good_cleaned.srt").exists());
    assert!(!output_dir.join("bad_cleaned.srt").exists());

    Ok(())
}

/// Test that existing outputs are skipped unless force overwrite is set
#[test]
fn test_preprocess_folder_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("raw");
    std::fs::create_dir_all(&input_dir)?;
    common::create_test_subtitle(&input_dir, "movie.srt")?;

    let output_dir = temp_dir.path().join("preprocessed");
    let first = controller().preprocess_folder(&input_dir, &output_dir, false)?;
    assert_eq!(first, 1);

    let second = controller().preprocess_folder(&input_dir, &output_dir, false)?;
    assert_eq!(second, 0);

    let forced = controller().preprocess_folder(&input_dir, &output_dir, true)?;
    assert_eq!(forced, 1);

    Ok(())
}

/// Test the full pipeline on disk: preprocess, extract, translate with a
/// mock provider, sanitize, convert
#[tokio::test]
async fn test_full_pipeline_withMockProvider_shouldProduceTranslatedSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let raw = temp_dir.path().join("raw");
    std::fs::create_dir_all(&raw)?;
    common::create_unterminated_subtitle(&raw, "movie.srt")?;

    let preprocessed = temp_dir.path().join("preprocessed");
    let extracted = temp_dir.path().join("extracted");
    let pretranslated = temp_dir.path().join("pretranslated");
    let sanitized = temp_dir.path().join("sanitized");
    let converted = temp_dir.path().join("converted");

    let controller = controller();
    controller.preprocess_folder(&raw, &preprocessed, false)?;
    controller.extract_folder(&preprocessed, &extracted, false)?;

    // Extracted CSV has one row per normalized block
    let records = tabular::read_records(extracted.join("movie_cleaned.csv"))?;
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.translation.is_none()));

    let service = TranslationService::with_provider(
        Box::new(MockProvider::working()),
        Config::default().translation,
    );
    controller
        .translate_folder_with_service(&service, &extracted, &pretranslated, false)
        .await?;

    controller.sanitize_folder(&pretranslated, &sanitized, false)?;
    controller.convert_folder(&sanitized, &converted, false)?;

    let final_srt = converted.join("movie_cleaned_pretranslated_sanitized.srt");
    let output = SubtitleCollection::from_srt_file(&final_srt)?;

    assert_eq!(output.blocks.len(), 3);
    let indices: Vec<usize> = output.blocks.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
    for block in &output.blocks {
        assert_eq!(block.lines.len(), 1);
        assert!(block.lines[0].contains(TRANSLATED_MARKER));
    }
    // Timecodes survive the whole chain, merge included
    assert_eq!(output.blocks[0].timecode.start.as_millis(), 1_000);
    assert_eq!(output.blocks[0].timecode.end.as_millis(), 9_000);

    Ok(())
}

/// Test that the convert stage falls back to source content when a
/// translation is missing
#[test]
fn test_convert_folder_withMissingTranslations_shouldFallBackToContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path().join("csv");
    std::fs::create_dir_all(&input_dir)?;

    common::create_test_file(
        &input_dir,
        "movie.csv",
        "Timecode,Content,Translation\n\"00:00:01,000 --> 00:00:04,000\",Hello.,\n",
    )?;

    let output_dir = temp_dir.path().join("out");
    controller().convert_folder(&input_dir, &output_dir, false)?;

    let output = SubtitleCollection::from_srt_file(output_dir.join("movie.srt"))?;
    assert_eq!(output.blocks[0].lines, vec!["Hello."]);

    Ok(())
}
