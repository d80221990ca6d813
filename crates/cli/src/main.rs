//! matchshot CLI - Main Entry Point
//!
//! Matches screenshots against the stable set, inspects and cleans it, and
//! exposes the file-op tasks to host test runners.

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use matchshot::MatchConfig;

mod commands;
mod output;

use commands::{matching, paths, stable, task};

/// Exit code for a screenshot that does not match its stable image
const EXIT_MISMATCH: i32 = 1;

/// Exit code for every other failure
const EXIT_ERROR: i32 = 2;

/// matchshot - visual regression against a stable screenshot set
#[derive(Parser)]
#[command(name = "matchshot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "matchshot.toml", global = true, env = "MATCHSHOT_CONFIG")]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a screenshot and match it against the stable set
    Match(matching::MatchArgs),

    /// Show where the images for a screenshot live
    Paths(paths::PathsArgs),

    /// Run a file-op task given as JSON
    Task(task::TaskArgs),

    /// List stable images
    List,

    /// Remove diff and rejected images
    Clean,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        let code = match e.downcast_ref::<matchshot::MatchError>() {
            Some(err) if err.is_mismatch() => EXIT_MISMATCH,
            _ => EXIT_ERROR,
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = MatchConfig::load(&cli.config)?;
    config.apply_env()?;

    match cli.command {
        Commands::Match(args) => matching::execute(args, config, cli.format).await?,
        Commands::Paths(args) => paths::execute(args, &config, cli.format)?,
        Commands::Task(args) => task::execute(args).await?,
        Commands::List => stable::list(&config, cli.format)?,
        Commands::Clean => stable::clean(&config)?,
    }

    Ok(())
}
