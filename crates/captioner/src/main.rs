//! Captioner CLI - print auto-generated captions for a folder of images.
//!
//! Reads `AI_SERVICE_REGION` and `AI_SERVICE_KEY` (a `.env` file in the
//! working directory is honored), uploads each JPG/JPEG/PNG in the folder to
//! the Azure Computer Vision describe operation, and prints the captions.
//!
//! # Usage
//!
//! ```bash
//! # Caption ./images
//! captioner
//!
//! # Caption another folder, three candidates each, as JSON Lines
//! captioner caption ./photos -n 3 --format jsonl
//!
//! # View configuration
//! captioner config show
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// Captioner - print auto-generated captions for a folder of images.
#[derive(Parser, Debug)]
#[command(name = "captioner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "CAPTIONER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Caption every image in a folder (the default command)
    Caption(cli::caption::CaptionArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env must be loaded before the config resolves ${VAR} references.
    let dotenv_path = dotenvy::dotenv().ok();

    let config = load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Captioner v{}", captioner_core::VERSION);
    if let Some(path) = dotenv_path {
        tracing::debug!(".env read from {}", path.display());
    }

    match cli.command {
        Some(Commands::Caption(args)) => cli::caption::execute(args, config).await,
        Some(Commands::Config(args)) => cli::config::execute(args, &config).await,
        None => cli::caption::execute(cli::caption::CaptionArgs::default(), config).await,
    }
}

/// Load the config file named on the command line, or the default one.
///
/// A file the user named must load. A broken default file only warns.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<captioner_core::Config> {
    if let Some(path) = explicit {
        return captioner_core::Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    // Logging isn't initialized yet, so use eprintln for config warnings.
    match captioner_core::Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `captioner config path`."
            );
            Ok(captioner_core::Config::default())
        }
    }
}
