/*!
 * Provider implementations for remote text-completion services.
 *
 * This module contains the client used to obtain translations:
 * - OpenAI: OpenAI-compatible chat completion API
 * - Mock: configurable in-process provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System message guiding the model
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Sampling temperature (0.0 for deterministic output)
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, temperature: f32) -> Self {
        CompletionRequest {
            system: system.into(),
            prompt: prompt.into(),
            temperature,
        }
    }
}

/// A completion response reduced to its text
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,
}

/// Common trait for completion providers.
///
/// Retry and backoff live behind this boundary: a provider either returns a
/// usable response or a terminal error, and callers never retry. This keeps
/// the translation service free of any network timing concerns.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod mock;
pub mod openai;
