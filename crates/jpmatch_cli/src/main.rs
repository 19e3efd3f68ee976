//! jpmatch CLI - Evaluate path expressions and check matchers against JSON documents.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use jpmatch_core::{Config, MatchError};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "jpmatch")]
#[command(about = "Assert on JSON documents with path expressions", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(long, global = true, default_value = "jpmatch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value(s) a path expression selects
    Eval {
        /// Path expression, e.g. '{.status.replicas}'
        expression: String,
        /// JSON document (stdin if omitted or '-')
        file: Option<PathBuf>,
        /// Output format (json, text)
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Check that the value(s) a path selects satisfy a matcher
    Check(CheckArgs),
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
#[command(group(
    clap::ArgGroup::new("matcher")
        .required(true)
        .args(["equals", "equivalent", "contains", "len", "empty", "null"]),
))]
pub(crate) struct CheckArgs {
    /// Path expression, e.g. '{.status.conditions[?(@.type=="Available")].reason}'
    pub expression: String,
    /// JSON document (stdin if omitted or '-')
    pub file: Option<PathBuf>,

    /// Strict equality with a JSON literal (bare words are taken as strings)
    #[arg(long)]
    pub equals: Option<String>,
    /// Loose equality: 1, 1.0 and "1" are equivalent
    #[arg(long)]
    pub equivalent: Option<String>,
    /// The selected array contains this element
    #[arg(long)]
    pub contains: Option<String>,
    /// The selected array, object or string has this length
    #[arg(long)]
    pub len: Option<usize>,
    /// The selection is empty, null, or absent
    #[arg(long)]
    pub empty: bool,
    /// The selection is null or absent
    #[arg(long)]
    pub null: bool,

    /// Negate the matcher
    #[arg(long)]
    pub not: bool,
    /// Hand an empty selection to the matcher instead of failing
    #[arg(long)]
    pub tolerate_absence: bool,

    /// Re-read FILE until the matcher passes or the timeout elapses
    #[arg(long)]
    pub watch: bool,
    /// Watch timeout in seconds (overrides configuration)
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Watch polling interval in milliseconds (overrides configuration)
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Show => load_config(&cli.config)
                .and_then(|config| commands::config::show(&config))
                .map(|_| true),
            ConfigCommands::Init => commands::config::init(&cli.config).map(|_| true),
        },
        Commands::Eval {
            expression,
            file,
            format,
        } => commands::eval::run(&expression, file.as_deref(), &format),
        Commands::Check(args) => {
            load_config(&cli.config).and_then(|config| commands::check::run(&args, &config))
        }
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            let hint = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<MatchError>())
                .and_then(MatchError::recovery_suggestion);
            if let Some(hint) = hint {
                eprintln!("{} {}", style("hint:").cyan().bold(), hint);
            }
            Err(err)
        }
    }
}

fn load_config(path: &std::path::Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
}
