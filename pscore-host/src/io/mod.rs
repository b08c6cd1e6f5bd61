//! IO helpers for CLI operations.
//!
//! Provides utilities for:
//! - Loading packet files (JSONL packet metadata)
//! - Writing replay artifacts (verdicts.jsonl, counters.json, status.jsonl)

pub mod output_writer;
pub mod packet_loader;
pub mod status_writer;

pub use output_writer::{OutputWriter, OutputWriterError};
pub use packet_loader::{load_packets, parse_packets, PacketLoadError, PacketRecord};
pub use status_writer::{StatusWriter, StatusWriterError};
