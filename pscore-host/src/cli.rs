//! CLI argument parsing for the `pscore` binary.
//!
//! Two subcommands:
//! - `classify` runs both handlers on a single packet given on the command line
//! - `replay` runs a packet file through the pipeline under threshold control

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;

use crate::pipeline::ScoreSource;

/// Default number of worker threads for replay.
pub const DEFAULT_WORKERS: usize = 1;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("factor must be non-zero")]
    ZeroFactor,

    #[error("workers must be at least 1, got {0}")]
    InvalidWorkers(usize),

    #[error("period-ms must be at least 1, got {0}")]
    InvalidPeriod(u64),
}

/// PacketScore tiering pipeline: quantify, classify and replay packet scores.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "pscore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the Quantifier and Classifier on one packet.
    Classify(ClassifyArgs),
    /// Replay a JSONL packet file through the pipeline.
    Replay(ReplayArgs),
}

/// Arguments for the classify command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ClassifyArgs {
    /// The packet's factor.x attribute (non-zero).
    #[arg(long, allow_hyphen_values = true)]
    pub factor: i32,

    /// The packet's raw score.
    #[arg(long, allow_hyphen_values = true)]
    pub score: i32,

    /// T_high threshold.
    #[arg(long, allow_hyphen_values = true)]
    pub high: i32,

    /// T_low threshold.
    #[arg(long, allow_hyphen_values = true)]
    pub low: i32,

    /// Egress spec before classification.
    #[arg(long, default_value_t = 0)]
    pub egress: u16,

    /// Score the Classifier compares.
    #[arg(long, value_enum, default_value_t = ScoreSource::Quantified)]
    pub score_source: ScoreSource,
}

impl ClassifyArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.factor == 0 {
            return Err(CliError::ZeroFactor);
        }
        Ok(())
    }
}

/// Arguments for the replay command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ReplayArgs {
    /// JSONL packet file.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for verdicts.jsonl, status.jsonl and counters.json.
    #[arg(short, long = "out-dir")]
    pub out_dir: PathBuf,

    /// Worker threads classifying packets in parallel.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Control period in milliseconds (overrides the config file).
    #[arg(long)]
    pub period_ms: Option<u64>,

    /// Threshold controller config (JSON).
    #[arg(long, conflicts_with = "no_control")]
    pub config: Option<PathBuf>,

    /// Disable threshold control; packets without rule thresholds use
    /// --high/--low, or pass everything as white.
    #[arg(long)]
    pub no_control: bool,

    /// Static T_high for packets without rule thresholds (requires --no-control).
    #[arg(long, allow_hyphen_values = true, requires_all = ["low", "no_control"])]
    pub high: Option<i32>,

    /// Static T_low for packets without rule thresholds (requires --no-control).
    #[arg(long, allow_hyphen_values = true, requires_all = ["high", "no_control"])]
    pub low: Option<i32>,

    /// Score the Classifier compares.
    #[arg(long, value_enum, default_value_t = ScoreSource::Quantified)]
    pub score_source: ScoreSource,
}

impl ReplayArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.workers == 0 {
            return Err(CliError::InvalidWorkers(self.workers));
        }
        if self.period_ms == Some(0) {
            return Err(CliError::InvalidPeriod(0));
        }
        Ok(())
    }
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
