//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use boardcorpus_core::pipeline::{BuildOptions, PipelineReport, ProgressReporter};
use boardcorpus_shared::{
    AppConfig, CardFilter, LookupStrategy, init_config, load_config, load_config_from,
    load_credentials, validate_config, write_default_config,
};
use boardcorpus_trello::{BoardService, TrelloClient};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// boardcorpus: flatten a Trello board into a text corpus.
#[derive(Parser)]
#[command(
    name = "boardcorpus",
    version,
    about = "Export every card on a Trello board as a plain-text corpus record.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.boardcorpus/boardcorpus.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build the corpus artifact for the configured board.
    Build(BuildArgs),

    /// List the names of all boards visible to the account.
    Boards,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `build`; each overrides the matching `[corpus]` setting.
#[derive(Args, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Exact name of the board to export.
    #[arg(long)]
    pub board: Option<String>,

    /// Output file for the corpus.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Which cards to include: open, closed, or all.
    #[arg(long)]
    pub cards: Option<CardFilter>,

    /// Resolve lists and members from one board-wide fetch each.
    #[arg(long)]
    pub cached: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "boardcorpus=info",
        1 => "boardcorpus=debug",
        _ => "boardcorpus=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => cmd_build(cli.config, &args).await,
        Command::Boards => cmd_boards(cli.config).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(cli.config),
            ConfigAction::Show => cmd_config_show(cli.config),
        },
    }
}

/// Load the config from `--config` when given, else from the default location.
fn resolve_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(&path)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Fold `build` flags into the loaded config.
fn apply_overrides(config: &mut AppConfig, args: &BuildArgs) {
    if let Some(board) = &args.board {
        config.corpus.board_name = board.clone();
    }
    if let Some(out) = &args.out {
        config.corpus.output_path = out.to_string_lossy().into_owned();
    }
    if let Some(cards) = args.cards {
        config.corpus.card_filter = cards;
    }
    if args.cached {
        config.corpus.list_lookup = LookupStrategy::BoardCache;
        config.corpus.member_lookup = LookupStrategy::BoardCache;
    }
}

/// Build an authenticated client, failing before any request when
/// credentials are missing.
fn connect(config: &AppConfig) -> Result<TrelloClient> {
    let credentials = load_credentials(&config.trello)?;
    Ok(TrelloClient::new(&config.trello, credentials)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(config_path: Option<PathBuf>, args: &BuildArgs) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    apply_overrides(&mut config, args);
    validate_config(&config)?;

    let client = connect(&config)?;
    let options = BuildOptions::from(&config.corpus);

    info!(
        board = %options.board_name,
        out = %options.output_path.display(),
        cards = %options.card_filter,
        lists = %options.list_lookup,
        members = %options.member_lookup,
        "building corpus"
    );

    let reporter = CliProgress::new();
    let report = boardcorpus_core::pipeline::build_board_corpus(&client, &options, &reporter)
        .await
        .inspect_err(|_| reporter.abandon())?;

    println!();
    println!("  Corpus written successfully!");
    println!("  Board:   {}", report.board.name);
    println!("  Records: {}", report.record_count);
    println!("  Size:    {} bytes", report.artifact.size_bytes);
    println!("  SHA-256: {}", report.artifact.sha256);
    println!("  Path:    {}", report.artifact.path.display());
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_boards(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let client = connect(&config)?;

    let boards = client.list_boards().await?;
    if boards.is_empty() {
        println!("No boards found.");
        return Ok(());
    }

    for board in &boards {
        if board.closed {
            println!("{} (closed)", board.name);
        } else {
            println!("{}", board.name);
        }
    }

    Ok(())
}

fn cmd_config_init(config_path: Option<PathBuf>) -> Result<()> {
    let path = match config_path {
        Some(path) => {
            write_default_config(&path)?;
            path
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn abandon(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn card_normalized(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Normalizing [{current}/{total}] {title}"));
    }

    fn done(&self, _report: &PipelineReport) {
        self.spinner.finish_and_clear();
    }
}
