//! PacketScore host integration.
//!
//! Hosts the `pscore-plugin` handlers the way a switch pipeline would:
//! loads packet metadata, runs the Quantifier and Classifier stages on a
//! pool of workers sharing one counters handle, and drives the
//! `pscore-control` threshold controller once per control period.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod fs;
pub mod io;
pub mod logger;
pub mod pipeline;

pub use cli::{parse_from, ClassifyArgs, Cli, CliError, Command, ReplayArgs, DEFAULT_WORKERS};
pub use commands::{execute_classify, execute_replay, CommandError, CommandResult, ReplayResult};
pub use fs::{Filesystem, FsError, MockFilesystem, RealFilesystem};
pub use io::{load_packets, parse_packets, PacketLoadError, PacketRecord};
pub use logger::{Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use pipeline::{HostPipeline, PacketOutcome, ScoreSource};
