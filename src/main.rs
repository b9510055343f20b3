// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod normalize;
mod providers;
mod sanitize;
mod script_convert;
mod subtitle_processor;
mod tabular;
mod translation_service;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Options shared by every pipeline stage
#[derive(Args, Debug)]
struct CommonArgs {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Arguments for a single pipeline stage
#[derive(Args, Debug)]
struct StageArgs {
    /// Input directory containing files for this stage
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Output directory (default: a stage-named sibling of the input directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

/// Arguments for the combined pipeline run
#[derive(Args, Debug)]
struct RunArgs {
    /// Directory containing the raw SRT files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Work directory for stage outputs (default: the input directory's parent)
    #[arg(short, long)]
    work_dir: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean and normalize raw SRT files
    Preprocess(StageArgs),

    /// Extract SRT files into CSV tables
    Extract(StageArgs),

    /// Translate the content column of CSV tables
    Translate(StageArgs),

    /// Apply script conversion and width spacing to translated CSV tables
    Sanitize(StageArgs),

    /// Convert CSV tables back into SRT files
    Convert(StageArgs),

    /// Run the whole pipeline: preprocess, extract, translate, sanitize, convert
    Run(RunArgs),

    /// Generate shell completions for subpipe
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subpipe - batch subtitle translation pipeline
///
/// Converts SRT subtitle files to tabular form, translates and sanitizes the
/// text, and produces translated subtitle files.
#[derive(Parser, Debug)]
#[command(name = "subpipe")]
#[command(version = "1.0.0")]
#[command(about = "Batch subtitle translation pipeline")]
#[command(long_about = "subpipe cleans SRT subtitle files, extracts them to CSV, translates the
text through an OpenAI-compatible provider, sanitizes the translated text,
and rebuilds translated SRT files.

EXAMPLES:
    subpipe preprocess ./raw                   # Clean raw SRT files
    subpipe extract ./preprocessed             # SRT -> CSV
    subpipe translate ./extracted              # Translate the Content column
    subpipe sanitize ./pretranslated           # Script conversion + spacing
    subpipe convert ./sanitized                # CSV -> SRT
    subpipe run ./raw                          # All stages in order
    subpipe preprocess -f ./raw                # Force overwrite existing files
    subpipe completions bash > subpipe.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically. The translation API
    key can also come from the OPENAI_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subpipe", &mut std::io::stdout());
            Ok(())
        }
        Commands::Preprocess(args) => {
            let controller = setup_controller(&args.common)?;
            let output_dir = resolve_output_dir(&args, "preprocessed");
            controller.preprocess_folder(&args.input_dir, &output_dir, args.common.force_overwrite)?;
            Ok(())
        }
        Commands::Extract(args) => {
            let controller = setup_controller(&args.common)?;
            let output_dir = resolve_output_dir(&args, "extracted");
            controller.extract_folder(&args.input_dir, &output_dir, args.common.force_overwrite)?;
            Ok(())
        }
        Commands::Translate(args) => {
            let controller = setup_controller(&args.common)?;
            let output_dir = resolve_output_dir(&args, "pretranslated");
            controller
                .translate_folder(&args.input_dir, &output_dir, args.common.force_overwrite)
                .await?;
            Ok(())
        }
        Commands::Sanitize(args) => {
            let controller = setup_controller(&args.common)?;
            let output_dir = resolve_output_dir(&args, "sanitized");
            controller.sanitize_folder(&args.input_dir, &output_dir, args.common.force_overwrite)?;
            Ok(())
        }
        Commands::Convert(args) => {
            let controller = setup_controller(&args.common)?;
            let output_dir = resolve_output_dir(&args, "converted");
            controller.convert_folder(&args.input_dir, &output_dir, args.common.force_overwrite)?;
            Ok(())
        }
        Commands::Run(args) => {
            let controller = setup_controller(&args.common)?;
            let work_dir = args
                .work_dir
                .clone()
                .unwrap_or_else(|| parent_dir(&args.input_dir));
            controller
                .run_pipeline(&args.input_dir, &work_dir, args.common.force_overwrite)
                .await
        }
    }
}

/// Load configuration, apply CLI overrides, and build the controller
fn setup_controller(common: &CommonArgs) -> Result<Controller> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &common.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let config = load_or_create_config(&common.config_path)?;

    // If log level was not set via command line, take it from the config
    if common.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    Controller::with_config(config)
}

/// Load the configuration file, creating a default one when it doesn't exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

// Stage outputs default to a named sibling of the input directory
fn resolve_output_dir(args: &StageArgs, stage_name: &str) -> PathBuf {
    args.output_dir
        .clone()
        .unwrap_or_else(|| parent_dir(&args.input_dir).join(stage_name))
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().unwrap_or(Path::new(".")).to_path_buf()
}
