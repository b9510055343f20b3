/*!
 * # subpipe - Batch Subtitle Translation Pipeline
 *
 * A Rust library for converting SRT subtitle files to tabular form,
 * translating and sanitizing the text, and producing translated subtitle
 * files.
 *
 * ## Features
 *
 * - Parse and re-serialize SRT subtitle files with per-block error recovery
 * - Normalize captions: whitespace cleanup, two-line folding,
 *   punctuation-continuation merging, renumbering
 * - Extract subtitles to CSV and rebuild SRT files from CSV
 * - Batch translation through an OpenAI-compatible provider
 * - Script conversion and mixed-width spacing for CJK text
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Timecode codec, SRT block parser and serializer
 * - `normalize`: Four-stage caption normalization pipeline
 * - `sanitize`: Script conversion and width-boundary spacing
 * - `script_convert`: Script conversion trait and implementations
 * - `tabular`: CSV record store and block/record conversions
 * - `translation_service`: Batch translation over a completion provider
 * - `providers`: Completion provider clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Mock provider for tests
 * - `file_utils`: File system operations
 * - `app_controller`: Batch orchestration over pipeline stages
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod normalize;
pub mod providers;
pub mod sanitize;
pub mod script_convert;
pub mod subtitle_processor;
pub mod tabular;
pub mod translation_service;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use subtitle_processor::{SubtitleBlock, SubtitleCollection, Timecode, Timestamp};
pub use tabular::SubtitleRecord;
pub use translation_service::TranslationService;
