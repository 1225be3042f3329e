//! Artwork CLI - catalog artwork extraction and derivative generation.
//!
//! Resolves each product's cover artwork (from its ZIP archive, a direct
//! image, or the configured default image) and writes a thumbnail and a
//! small JPEG preview under a deterministic path and URL layout.
//!
//! # Usage
//!
//! ```bash
//! # Build one product's derivatives
//! artwork build --catalog catalog.json --nrn CB01USC512L --nsn 7644012312312
//!
//! # Build every product in a catalog
//! artwork batch --catalog catalog.json --output builds.jsonl --format jsonl
//!
//! # Pull the artwork document out of an archive
//! artwork extract DISC01.zip ./out
//!
//! # View configuration
//! artwork config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Artwork - catalog artwork extraction and derivative generation.
#[derive(Parser, Debug)]
#[command(name = "artwork")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "ARTWORK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the derivatives for one catalog product
    Build(cli::build::BuildArgs),

    /// Build the derivatives for every product in a catalog
    Batch(cli::batch::BatchArgs),

    /// Extract the first matching entry from an archive
    Extract(cli::extract::ExtractArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_none() => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `artwork config path`."
            );
            artwork_core::Config::default()
        }
        Err(e) => return Err(e),
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Artwork v{}", artwork_core::VERSION);

    match cli.command {
        Commands::Build(args) => cli::build::execute(args, &config).await,
        Commands::Batch(args) => cli::batch::execute(args, &config).await,
        Commands::Extract(args) => cli::extract::execute(args).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
