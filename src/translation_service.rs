use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::openai::OpenAi;
use crate::providers::{CompletionRequest, Provider};
use crate::tabular::SubtitleRecord;

// @module: Batch translation over a completion provider

// @const: Numbered quoted item in a provider response
static NUMBERED_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*\d+\.\s*"(.*?)""#).unwrap());

/// Translation service for subtitle text batches.
///
/// Splits input into batches of at most `max_batch_size` texts, sends each
/// batch as one numbered-list prompt, and parses the numbered response. The
/// same-length contract with the provider is best-effort: under-returned
/// batches are padded with empty strings and over-returns are truncated,
/// with a warning either way. The service never retries; the provider client
/// owns retry and backoff.
#[derive(Debug)]
pub struct TranslationService {
    /// The completion provider
    provider: Box<dyn Provider>,

    /// Translation settings
    config: TranslationConfig,
}

impl TranslationService {
    /// Create a service backed by the configured OpenAI-compatible endpoint
    pub fn new(config: &TranslationConfig) -> Self {
        let provider = OpenAi::new(
            config.provider.endpoint.clone(),
            config.get_api_key(),
            config.provider.model.clone(),
            config.provider.timeout_secs,
            config.common.retry_count,
            config.common.retry_backoff_ms,
        );
        Self::with_provider(Box::new(provider), config.clone())
    }

    /// Create a service with an explicit provider (used by tests)
    pub fn with_provider(provider: Box<dyn Provider>, config: TranslationConfig) -> Self {
        TranslationService { provider, config }
    }

    /// Verify the provider is reachable before starting a batch run
    pub async fn test_connection(&self) -> Result<()> {
        self.provider
            .test_connection()
            .await
            .context("Translation provider connection test failed")
    }

    /// Translate a sequence of texts, preserving order and length.
    ///
    /// The result always has exactly one entry per input text; entries the
    /// provider failed to translate are empty strings.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }

        let max_batch_size = self.config.common.max_batch_size.max(1);
        let system = self
            .config
            .common
            .system_prompt
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language);

        let batch_count = texts.len().div_ceil(max_batch_size);
        let mut translations = Vec::with_capacity(texts.len());

        for (batch_index, batch) in texts.chunks(max_batch_size).enumerate() {
            debug!(
                "Translating batch {}/{} ({} texts)",
                batch_index + 1,
                batch_count,
                batch.len()
            );

            let request = CompletionRequest::new(
                system.clone(),
                Self::build_prompt(batch),
                self.config.common.temperature,
            );

            match self.provider.complete(request).await {
                Ok(response) => {
                    let mut parsed = Self::parse_numbered_response(&response.text);
                    if parsed.len() != batch.len() {
                        warn!(
                            "{}",
                            TranslationError::CountMismatch {
                                expected: batch.len(),
                                actual: parsed.len(),
                            }
                        );
                    }
                    // Pad under-returns, truncate over-returns
                    parsed.resize(batch.len(), String::new());
                    translations.extend(parsed);
                }
                Err(e) => {
                    warn!(
                        "Translation batch {} failed, padding with empty translations: {}",
                        batch_index + 1,
                        e
                    );
                    translations.extend(std::iter::repeat(String::new()).take(batch.len()));
                }
            }
        }

        translations
    }

    /// Translate the content of every record in place, filling the
    /// translation field
    pub async fn translate_records(
        &self,
        records: &mut [SubtitleRecord],
        source_language: &str,
        target_language: &str,
    ) {
        let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
        let translations = self
            .translate_batch(&texts, source_language, target_language)
            .await;

        for (record, translation) in records.iter_mut().zip(translations) {
            record.translation = Some(translation);
        }
    }

    /// Build the numbered-list prompt for one batch
    pub fn build_prompt(texts: &[String]) -> String {
        let mut prompt = String::from(
            "Translate each numbered subtitle below and reply in the same numbered format, one per line.\n\n",
        );
        for (i, text) in texts.iter().enumerate() {
            // Escape quotes so the item boundaries stay unambiguous
            let clean = text.replace('"', "\\\"");
            prompt.push_str(&format!("{}. \"{}\"\n", i + 1, clean));
        }
        prompt.push_str("\nTranslated subtitles:\n");
        prompt
    }

    /// Extract the numbered translations out of a provider response
    pub fn parse_numbered_response(response: &str) -> Vec<String> {
        NUMBERED_ITEM_REGEX
            .captures_iter(response)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}
