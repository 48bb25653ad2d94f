// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod compositor;
mod cue_processor;
mod errors;
mod file_utils;
mod locale_utils;
mod providers;
mod synthesis_service;

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose an audio description track from a timed-text document (default command)
    Compose(ComposeArgs),

    /// Synthesize a single text to a waveform file
    Speak(SpeakArgs),

    /// Generate shell completions for audiodesc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input timed-text document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output waveform path (defaults to <input>.<locale>.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Locale of the cue text (e.g. 'en-US')
    #[arg(short, long)]
    locale: Option<String>,

    /// Model name to use for synthesis
    #[arg(short, long)]
    model: Option<String>,

    /// Voice prompt identifier
    #[arg(short, long)]
    voice: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct SpeakArgs {
    /// Text to synthesize
    #[arg(value_name = "TEXT")]
    text: String,

    /// Output waveform path
    #[arg(short, long, default_value = "speech.wav")]
    output: PathBuf,

    /// Locale of the text (e.g. 'en-US')
    #[arg(short, long)]
    locale: Option<String>,

    /// Model name to use for synthesis
    #[arg(short, long)]
    model: Option<String>,

    /// Voice prompt identifier
    #[arg(short, long)]
    voice: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// audiodesc - AI-voiced audio description tracks from timed text
///
/// Reads a timed-text document, synthesizes each cue through a hosted
/// text-to-speech service, and composes the clips into one time-aligned
/// waveform.
#[derive(Parser, Debug)]
#[command(name = "audiodesc")]
#[command(author = "audiodesc contributors")]
#[command(version = "1.0.0")]
#[command(about = "AI-voiced audio description track generator")]
#[command(long_about = "audiodesc turns timed-text documents into synthesized, time-aligned audio tracks.

EXAMPLES:
    audiodesc lesson.ttml                        # Compose using default config
    audiodesc -f lesson.ttml                     # Force overwrite existing output
    audiodesc -l en-US -o lesson.wav lesson.ttml # Explicit locale and output path
    audiodesc /captions/                         # Process an entire directory
    audiodesc speak \"Hello there\" -o hello.wav   # One-off synthesis
    audiodesc completions bash > audiodesc.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically (fill in your API key and voice prompt id).")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input timed-text document or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output waveform path (defaults to <input>.<locale>.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Locale of the cue text (e.g. 'en-US')
    #[arg(short, long)]
    locale: Option<String>,

    /// Model name to use for synthesis
    #[arg(short, long)]
    model: Option<String>,

    /// Voice prompt identifier
    #[arg(short, long)]
    voice: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
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
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
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
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "audiodesc", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Compose(args)) => run_compose(args).await,
        Some(Commands::Speak(args)) => run_speak(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let compose_args = ComposeArgs {
                input_path,
                output: cli.output,
                force_overwrite: cli.force_overwrite,
                locale: cli.locale,
                model: cli.model,
                voice: cli.voice,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_compose(compose_args).await
        }
    }
}

/// Load the configuration, creating a default file when missing, and apply
/// CLI overrides on top of it.
fn load_config(
    config_path: &str,
    locale: Option<&String>,
    model: Option<&String>,
    voice: Option<&String>,
    log_level: Option<&CliLogLevel>,
) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(locale) = locale {
        config.locale = locale.clone();
    }

    if let Some(model) = model {
        let provider_str = config.synthesis.provider.to_lowercase_string();
        if let Some(provider_config) = config
            .synthesis
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            provider_config.model = model.clone();
        }
    }

    if let Some(voice) = voice {
        config.synthesis.voice.voice_prompt_id = voice.clone();
    }

    if let Some(log_level) = log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

async fn run_compose(options: ComposeArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config = load_config(
        &options.config_path,
        options.locale.as_ref(),
        options.model.as_ref(),
        options.voice.as_ref(),
        options.log_level.as_ref(),
    )?;

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // Run the controller with the input file(s)
    if options.input_path.is_file() {
        controller
            .run(options.input_path.clone(), options.output, options.force_overwrite)
            .await?;
    } else if options.input_path.is_dir() {
        controller
            .run_folder(options.input_path.clone(), options.force_overwrite)
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

async fn run_speak(options: SpeakArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config = load_config(
        &options.config_path,
        options.locale.as_ref(),
        options.model.as_ref(),
        options.voice.as_ref(),
        options.log_level.as_ref(),
    )?;

    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    if options.text.trim().is_empty() {
        return Err(anyhow!("Nothing to synthesize: text is empty"));
    }

    let controller = Controller::with_config(config)?;
    controller.speak(&options.text, options.output).await
}
