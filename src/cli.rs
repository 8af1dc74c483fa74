use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "vocalscreen",
    version,
    about = "Extract acoustic voice markers (pitch, jitter, shimmer, HNR, formants) from recordings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode recordings, extract voice features and score them.
    Analyze(AnalyzeArgs),
    /// Print the built-in screening configuration as JSON.
    Defaults,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Audio files to analyze (WAV, MP3, OGG, FLAC, ...).
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
    /// Optional JSON file overriding thresholds and weights.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Report features only, without a risk assessment.
    #[arg(long = "no-score")]
    pub no_score: bool,
    /// Recordings to decode at once (defaults to the number of CPUs).
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<NonZeroUsize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
