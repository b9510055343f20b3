/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Echoes every numbered prompt item as a translation
 * - `MockProvider::under_returning(n)` - Returns only the first n translations
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Returns an empty response
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// Marker the working mock prepends to every echoed item
pub const TRANSLATED_MARKER: &str = "[TRANSLATED]";

// Numbered quoted items in the prompt the service builds
static PROMPT_ITEM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*\d+\.\s*"(.*)"\s*$"#).unwrap());

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Echoes every numbered item back, marked as translated
    Working,
    /// Returns only the first n items (simulates a provider dropping entries)
    UnderReturning {
        /// How many items to return
        keep: usize,
    },
    /// Always fails with an error
    Failing,
    /// Returns an empty response body
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of completion requests received
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns fewer translations than requested
    pub fn under_returning(keep: usize) -> Self {
        Self::new(MockBehavior::UnderReturning { keep })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of completion requests this mock has received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Handle to the request counter, for asserting after the provider has
    /// been boxed away
    pub fn request_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.request_count)
    }

    /// Extract the numbered items out of a prompt built by the translation
    /// service
    fn prompt_items(prompt: &str) -> Vec<String> {
        PROMPT_ITEM_REGEX
            .captures_iter(prompt)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Generate a properly formatted numbered response for the given items
    pub fn generate_numbered_response(items: &[String]) -> String {
        let mut response = String::new();
        for (i, item) in items.iter().enumerate() {
            response.push_str(&format!("{}. \"{} {}\"\n", i + 1, TRANSLATED_MARKER, item));
        }
        response
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(generator) = self.custom_response {
            return Ok(CompletionResponse {
                text: generator(&request),
            });
        }

        match self.behavior {
            MockBehavior::Working => {
                let items = Self::prompt_items(&request.prompt);
                Ok(CompletionResponse {
                    text: Self::generate_numbered_response(&items),
                })
            }
            MockBehavior::UnderReturning { keep } => {
                let mut items = Self::prompt_items(&request.prompt);
                items.truncate(keep);
                Ok(CompletionResponse {
                    text: Self::generate_numbered_response(&items),
                })
            }
            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "mock provider configured to fail".to_string(),
            )),
            MockBehavior::Empty => Ok(CompletionResponse {
                text: String::new(),
            }),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "mock provider configured to fail".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
