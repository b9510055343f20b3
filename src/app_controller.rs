use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::normalize;
use crate::sanitize::ContentSanitizer;
use crate::subtitle_processor::SubtitleCollection;
use crate::tabular;
use crate::translation_service::TranslationService;

// @module: Batch orchestration over pipeline stages

/// Main application controller for the subtitle pipeline.
///
/// Each stage runs over one folder; files are processed strictly
/// sequentially and every file either completes or fails atomically. A
/// failed file is logged and the batch continues.
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Normalize one SRT file: parse, run the four-stage cleanup, rewrite
    pub fn preprocess_file(&self, input: &Path, output: &Path) -> Result<()> {
        let collection = SubtitleCollection::from_srt_file(input)?;
        let blocks = normalize::clean(collection.blocks);
        SubtitleCollection::new(input.to_path_buf(), blocks).write_to_srt(output)?;
        Ok(())
    }

    /// Extract one SRT file into tabular form
    pub fn extract_file(&self, input: &Path, output: &Path) -> Result<()> {
        let collection = SubtitleCollection::from_srt_file(input)?;
        let records = tabular::blocks_to_records(&collection.blocks);
        tabular::write_records(output, &records)
    }

    /// Translate the content column of one CSV file
    pub async fn translate_file(
        &self,
        service: &TranslationService,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        let mut records = tabular::read_records(input)?;
        if records.is_empty() {
            warn!("No records found in {:?}, skipping file", input);
            return Ok(());
        }

        info!("Translating {:?} ({} subtitles)", input, records.len());
        service
            .translate_records(
                &mut records,
                &self.config.source_language,
                &self.config.target_language,
            )
            .await;

        tabular::write_records(output, &records)
    }

    /// Sanitize the translation column of one CSV file
    pub fn sanitize_file(
        &self,
        sanitizer: &ContentSanitizer,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        let mut records = tabular::read_records(input)?;
        if !records.iter().any(|r| r.translation.is_some()) {
            warn!("No translation column in {:?}, skipping file", input);
            return Ok(());
        }

        for record in &mut records {
            if let Some(translation) = &record.translation {
                record.translation = Some(sanitizer.sanitize(translation));
            }
        }

        tabular::write_records(output, &records)
    }

    /// Convert one CSV file back to SRT
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<()> {
        let records = tabular::read_records(input)?;
        let blocks = tabular::records_to_blocks(&records);
        if blocks.is_empty() {
            warn!("No usable rows in {:?}, skipping file", input);
            return Ok(());
        }

        SubtitleCollection::new(input.to_path_buf(), blocks).write_to_srt(output)
    }

    /// Normalize every SRT file in a folder
    pub fn preprocess_folder(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<usize> {
        let files = Self::stage_files(input_dir, "srt")?;
        self.run_stage(&files, output_dir, force_overwrite, "preprocess", |input| {
            FileManager::stage_output_path(input, output_dir, Some("cleaned"), "srt")
        }, |input, output| self.preprocess_file(input, output))
    }

    /// Extract every SRT file in a folder to CSV
    pub fn extract_folder(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<usize> {
        let files = Self::stage_files(input_dir, "srt")?;
        self.run_stage(&files, output_dir, force_overwrite, "extract", |input| {
            FileManager::stage_output_path(input, output_dir, None, "csv")
        }, |input, output| self.extract_file(input, output))
    }

    /// Translate every CSV file in a folder
    pub async fn translate_folder(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<usize> {
        self.config.validate_for_translation()?;
        let service = TranslationService::new(&self.config.translation);
        service.test_connection().await?;

        self.translate_folder_with_service(&service, input_dir, output_dir, force_overwrite)
            .await
    }

    /// Translate every CSV file in a folder using an explicit service (used
    /// by tests with a mock provider)
    pub async fn translate_folder_with_service(
        &self,
        service: &TranslationService,
        input_dir: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<usize> {
        let files = Self::stage_files(input_dir, "csv")?;
        if files.is_empty() {
            return Ok(0);
        }
        FileManager::ensure_dir(output_dir)?;

        let progress = Self::stage_progress(files.len(), "translate");
        let mut processed = 0;

        for input in &files {
            let output =
                FileManager::stage_output_path(input, output_dir, Some("pretranslated"), "csv");
            if output.exists() && !force_overwrite {
                warn!("Skipping {:?}, output already exists (use -f to force overwrite)", input);
                progress.inc(1);
                continue;
            }

            match self.translate_file(service, input, &output).await {
                Ok(()) => processed += 1,
                Err(e) => error!("Failed to translate {:?}: {}", input, e),
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!("Translated {}/{} files", processed, files.len());
        Ok(processed)
    }

    /// Sanitize every CSV file in a folder
    pub fn sanitize_folder(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<usize> {
        let sanitizer = ContentSanitizer::from_config(&self.config.sanitize)?;
        let files = Self::stage_files(input_dir, "csv")?;
        self.run_stage(&files, output_dir, force_overwrite, "sanitize", |input| {
            FileManager::stage_output_path(input, output_dir, Some("sanitized"), "csv")
        }, |input, output| self.sanitize_file(&sanitizer, input, output))
    }

    /// Convert every CSV file in a folder back to SRT
    pub fn convert_folder(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        force_overwrite: bool,
    ) -> Result<usize> {
        let files = Self::stage_files(input_dir, "csv")?;
        self.run_stage(&files, output_dir, force_overwrite, "convert", |input| {
            FileManager::stage_output_path(input, output_dir, None, "srt")
        }, |input, output| self.convert_file(input, output))
    }

    /// Run the whole pipeline: preprocess, extract, translate, sanitize,
    /// convert. Intermediate outputs land in stage subdirectories of the
    /// work directory.
    pub async fn run_pipeline(
        &self,
        input_dir: &Path,
        work_dir: &Path,
        force_overwrite: bool,
    ) -> Result<()> {
        let preprocessed = work_dir.join("preprocessed");
        let extracted = work_dir.join("extracted");
        let pretranslated = work_dir.join("pretranslated");
        let sanitized = work_dir.join("sanitized");
        let converted = work_dir.join("converted");

        self.preprocess_folder(input_dir, &preprocessed, force_overwrite)?;
        self.extract_folder(&preprocessed, &extracted, force_overwrite)?;
        self.translate_folder(&extracted, &pretranslated, force_overwrite)
            .await?;
        self.sanitize_folder(&pretranslated, &sanitized, force_overwrite)?;
        self.convert_folder(&sanitized, &converted, force_overwrite)?;

        info!("Pipeline finished, translated subtitles in {:?}", converted);
        Ok(())
    }

    // Collect a stage's input files, warning when the folder has none
    fn stage_files(input_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }
        let files = FileManager::find_files(input_dir, extension)?;
        if files.is_empty() {
            warn!("No .{} files found in {:?}", extension, input_dir);
        }
        Ok(files)
    }

    // Shared folder loop for the synchronous stages: per-file recovery,
    // progress reporting, skip-unless-force
    fn run_stage(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        force_overwrite: bool,
        stage: &str,
        namer: impl Fn(&Path) -> PathBuf,
        mut op: impl FnMut(&Path, &Path) -> Result<()>,
    ) -> Result<usize> {
        if files.is_empty() {
            return Ok(0);
        }
        FileManager::ensure_dir(output_dir)?;

        let progress = Self::stage_progress(files.len(), stage);
        let mut processed = 0;

        for input in files {
            let output = namer(input);
            if output.exists() && !force_overwrite {
                warn!("Skipping {:?}, output already exists (use -f to force overwrite)", input);
                progress.inc(1);
                continue;
            }

            match op(input, &output) {
                Ok(()) => processed += 1,
                Err(e) => error!("Failed to {} {:?}: {}", stage, input, e),
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!("Stage {} processed {}/{} files", stage, processed, files.len());
        Ok(processed)
    }

    fn stage_progress(total: usize, stage: &str) -> ProgressBar {
        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{msg:>10} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        progress.set_message(stage.to_string());
        progress
    }
}
