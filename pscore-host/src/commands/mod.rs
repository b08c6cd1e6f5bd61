//! Command orchestration for CLI subcommands.
//!
//! Provides execute functions for:
//! - `classify` - Run both handlers on one packet
//! - `replay` - Run a packet file under threshold control

pub mod classify;
pub mod replay;

pub use classify::execute_classify;
pub use replay::{execute_replay, ReplayResult};

use pscore_control::ConfigError;
use thiserror::Error;

use crate::cli::CliError;
use crate::fs::FsError;
use crate::io::{OutputWriterError, PacketLoadError, StatusWriterError};

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),

    #[error("packet file error: {0}")]
    Packets(#[from] PacketLoadError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] OutputWriterError),

    #[error("status error: {0}")]
    Status(#[from] StatusWriterError),

    #[error("no packets found in {0}")]
    NoPackets(String),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
