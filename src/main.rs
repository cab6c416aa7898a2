// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use subspell::app_config::{Config, LogLevel, ProviderKind};
use subspell::app_controller::{Controller, FileOutcome};
use subspell::correction::BatchMode;

/// CLI Wrapper for ProviderKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Gemini,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl From<CliProvider> for ProviderKind {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Gemini => ProviderKind::Gemini,
            CliProvider::OpenAI => ProviderKind::OpenAI,
            CliProvider::Anthropic => ProviderKind::Anthropic,
            CliProvider::Ollama => ProviderKind::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Correct a subtitle file, or every subtitle file in a directory
    #[command(alias = "correct")]
    File(FileArgs),

    /// Correct a text given on the command line
    Text {
        /// Text to correct; paragraphs are separated by blank lines
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Test the connection to the configured provider
    Check,

    /// Generate shell completions for subspell
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Subtitle file (.srt, .ass, .ssa) or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output file (single file input only, default: <stem>_corrected.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Cues per chunk; 0 sizes chunks by token budget
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Print every changed cue after the run
    #[arg(long)]
    show_changes: bool,
}

/// subspell - spelling and grammar correction for subtitles
///
/// Corrects spelling, punctuation and grammar in Bulgarian subtitles with a
/// large language model while keeping timing and styling intact.
#[derive(Parser, Debug)]
#[command(name = "subspell")]
#[command(version)]
#[command(about = "AI-powered subtitle spelling and grammar correction")]
#[command(long_about = "subspell corrects spelling, punctuation and grammar in subtitles using AI providers.

EXAMPLES:
    subspell file movie.srt                        # Writes movie_corrected.srt
    subspell file movie.ass -o fixed.ass           # Explicit output file
    subspell file /subs/ --show-changes            # Whole directory, list changes
    subspell --provider openai file movie.srt      # Use a specific provider
    subspell text \"Аз немога да дойда\"             # Correct free text
    subspell completions bash > subspell.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in ~/.subspell/config.json by default. You can specify
    a different file with --config. If the file doesn't exist, a default one is
    created automatically. API keys may also come from GEMINI_API_KEY,
    OPENAI_API_KEY or ANTHROPIC_API_KEY.

SUPPORTED PROVIDERS:
    gemini    - Google Gemini API (default: gemini-2.0-flash, requires API key)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic API (requires API key)
    ollama    - Local Ollama server (default: llama3.2:3b)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Correction provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliProvider>,

    /// API key for the provider
    #[arg(long, env = "SUBSPELL_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model name to use for correction
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Token budget per chunk
    #[arg(long, global = true)]
    max_tokens: Option<usize>,

    /// Context cues repeated from the previous chunk
    #[arg(long, global = true)]
    chunk_overlap: Option<usize>,

    /// Maximum concurrent provider requests
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
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
        // The logger itself accepts everything; the max level does the filtering
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
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
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

// @applies: CLI overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(provider) = &options.provider {
        config.correction.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.correction.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.correction.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(concurrency) = options.concurrency {
        config.correction.active_provider_config_mut().concurrent_requests = concurrency;
    }
    if let Some(max_tokens) = options.max_tokens {
        config.chunking.max_tokens = max_tokens;
    }
    if let Some(overlap) = options.chunk_overlap {
        config.chunking.overlap_size = overlap;
    }
    if let Commands::File(args) = &options.command {
        if let Some(batch_size) = args.batch_size {
            config.chunking.fixed_batch_size = batch_size;
            config.chunking.mode = if batch_size > 0 { BatchMode::FixedSize } else { BatchMode::TokenBased };
        }
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

fn load_config(options: &CommandLineOptions) -> Result<Config> {
    let config_path = options
        .config
        .clone()
        .or_else(Config::default_path)
        .unwrap_or_else(|| PathBuf::from("subspell.json"));

    let mut config = Config::load_or_create(&config_path)?;
    apply_overrides(&mut config, options);
    Ok(config)
}

// Cancel the token on the first Ctrl-C; in-flight requests still finish
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing requests already sent...");
            token.cancel();
        }
    });
    cancel
}

fn print_outcome(outcome: &FileOutcome, show_changes: bool) {
    if show_changes && !outcome.report.changes.is_empty() {
        println!("{:?}", outcome.input);
        print!("{}", Controller::format_changes(&outcome.report));
    }
    info!("Success: {:?}", outcome.output);
}

async fn run_file(controller: &Controller, args: &FileArgs) -> Result<()> {
    let cancel = cancel_on_ctrl_c();

    if args.input_path.is_dir() {
        if args.output.is_some() {
            warn!("--output is ignored for directory input");
        }
        let outcomes = controller.correct_folder(&args.input_path, &cancel).await?;
        for outcome in &outcomes {
            print_outcome(outcome, args.show_changes);
        }
        if !outcomes.is_empty() && outcomes.iter().all(|o| o.report.all_failed()) {
            return Err(anyhow!("No chunk could be corrected in any file"));
        }
        return Ok(());
    }

    if !args.input_path.is_file() {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    let outcome = controller
        .correct_file(&args.input_path, args.output.as_deref(), &cancel)
        .await?;
    print_outcome(&outcome, args.show_changes);

    if outcome.report.all_failed() {
        return Err(anyhow!(
            "No chunk could be corrected, {:?} holds the original text",
            outcome.output
        ));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let options = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &options.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subspell", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&options).context("Failed to load configuration")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    match &options.command {
        Commands::File(args) => run_file(&controller, args).await,
        Commands::Text { text } => {
            let (corrected, report) = controller.correct_text(text).await?;
            println!("{}", corrected);
            if report.all_failed() {
                return Err(anyhow!("The text could not be corrected"));
            }
            Ok(())
        }
        Commands::Check => controller.check_provider().await,
        Commands::Completions { .. } => Ok(()),
    }
}
