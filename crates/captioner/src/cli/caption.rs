//! The `captioner caption` command: caption every image in a folder.

use clap::{Args, ValueEnum};
use captioner_core::{
    CaptionRunner, CaptionServiceFactory, Config, OutputFormat, OutputWriter, RunOptions,
    RunOutcome,
};
use std::path::PathBuf;

/// Output formats selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    /// Human-readable caption blocks
    Text,
    /// One JSON object per image (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Text => write!(f, "text"),
            Format::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Arguments for the `caption` command.
#[derive(Args, Debug, Default)]
pub struct CaptionArgs {
    /// Folder of images (defaults to processing.image_dir, "./images")
    pub input: Option<PathBuf>,

    /// Caption language (en, es, ja, pt, zh)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Maximum caption candidates per image
    #[arg(short = 'n', long)]
    pub max_candidates: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Stop at the first image that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Retries for transient service errors (rate limits, 5xx, timeouts)
    #[arg(long)]
    pub retries: Option<u32>,
}

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(mut config: Config, args: &CaptionArgs) -> anyhow::Result<Config> {
    if let Some(input) = &args.input {
        config.processing.image_dir = input.clone();
    }
    if let Some(language) = &args.language {
        config.caption.language = language.clone();
    }
    if let Some(n) = args.max_candidates {
        config.caption.max_candidates = n;
    }
    if let Some(format) = args.format {
        config.output.format = format.to_string();
    }
    if args.fail_fast {
        config.pipeline.fail_fast = true;
    }
    if let Some(retries) = args.retries {
        config.pipeline.retry_attempts = retries;
    }
    config.validate()?;
    Ok(config)
}

/// Execute the caption command.
pub async fn execute(args: CaptionArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;

    // Credentials are resolved before the folder is looked at.
    let service = CaptionServiceFactory::create(&config.service, &config.limits)?;

    let dir = config.image_dir();
    let format = OutputFormat::parse(&config.output.format).unwrap_or_default();
    let stdout = std::io::stdout();
    let mut out = OutputWriter::new(stdout.lock(), format);

    let runner = CaptionRunner::new(service.as_ref(), RunOptions::from_config(&config));
    match runner.run(&dir, &mut out).await? {
        RunOutcome::Completed(summary) if summary.failed > 0 => {
            anyhow::bail!(
                "{} of {} image(s) could not be captioned",
                summary.failed,
                summary.processed
            )
        }
        _ => Ok(()),
    }
}
