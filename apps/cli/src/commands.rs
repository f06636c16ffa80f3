//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use compendium_core::ProgressSink;
use compendium_shared::{ConvertConfig, config_file_path, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Compendium: normalize scraped compendium categories for storage and search.
#[derive(Parser)]
#[command(
    name = "compendium",
    version,
    about = "Normalize scraped compendium entries into sortable, searchable records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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
    /// Convert a JSON dump of categories.
    Convert {
        /// JSON file holding an array of categories.
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the converted categories.
        #[arg(short, long)]
        output: PathBuf,

        /// Validate every converted entry and log findings.
        #[arg(long)]
        debug: bool,

        /// Categories converted in parallel (overrides config).
        #[arg(long, env = "COMPENDIUM_CONCURRENCY")]
        concurrency: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "compendium=info",
        1 => "compendium=debug",
        _ => "compendium=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
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
        Command::Convert {
            input,
            output,
            debug,
            concurrency,
        } => cmd_convert(&input, &output, debug, concurrency).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_convert(
    input: &Path,
    output: &Path,
    debug: bool,
    concurrency: Option<u32>,
) -> Result<()> {
    let config = load_config()?;

    let mut convert_config = ConvertConfig::from(&config);
    convert_config.debug |= debug;
    if let Some(n) = concurrency {
        convert_config.concurrency = n.max(1);
    }

    let categories = compendium_core::load_categories(input)?;

    let total: usize = categories.iter().map(|c| c.entries.len()).sum();
    info!(
        input = %input.display(),
        categories = categories.len(),
        entries = total,
        debug = convert_config.debug,
        concurrency = convert_config.concurrency,
        "converting categories"
    );

    let progress = Arc::new(CliProgress::new(total as u64));
    let report =
        compendium_core::convert_batch(categories, &convert_config, progress.clone()).await;
    progress.finish();
    let report = report?;

    compendium_core::save_categories(output, &report.categories)?;

    let elapsed = report.finished_at - report.started_at;

    println!();
    println!("  Conversion complete!");
    println!("  Categories: {}", report.categories.len());
    println!("  Entries:    {}", report.entries);
    println!("  Corrected:  {}", report.corrected);
    println!("  Output:     {}", output.display());
    println!(
        "  Time:       {:.1}s",
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar over all entries.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} entries ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for CliProgress {
    fn entry_completed(&self) {
        self.bar.inc(1);
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config file created at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let path = config_file_path()?;
    println!("# Config file: {}", path.display());
    println!();
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
