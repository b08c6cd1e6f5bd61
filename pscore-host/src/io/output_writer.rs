//! Output writer for replay artifacts.
//!
//! Writes two files to the output directory:
//! - verdicts.jsonl - one `PacketOutcome` per input packet, in input order
//! - counters.json - the final tier counters

use std::path::{Path, PathBuf};

use pscore_plugin::CounterSnapshot;
use thiserror::Error;

use crate::fs::{Filesystem, FsError};
use crate::pipeline::PacketOutcome;

pub const VERDICTS_FILE: &str = "verdicts.jsonl";
pub const COUNTERS_FILE: &str = "counters.json";
pub const STATUS_FILE: &str = "status.jsonl";

/// Errors from output writing.
#[derive(Debug, Error)]
pub enum OutputWriterError {
    #[error("failed to create output directory: {0}")]
    CreateDir(#[source] FsError),

    #[error("failed to write {file}: {source}")]
    Write {
        file: &'static str,
        #[source]
        source: FsError,
    },
}

/// Writes replay artifacts into one directory.
pub struct OutputWriter<'a, F: Filesystem> {
    fs: &'a F,
    out_dir: &'a Path,
}

impl<'a, F: Filesystem> OutputWriter<'a, F> {
    pub fn new(fs: &'a F, out_dir: &'a Path) -> Self {
        Self { fs, out_dir }
    }

    /// Ensure the output directory exists.
    pub fn ensure_dir(&self) -> Result<(), OutputWriterError> {
        self.fs
            .create_dir_all(self.out_dir)
            .map_err(OutputWriterError::CreateDir)
    }

    /// Write verdicts.jsonl.
    pub fn write_verdicts(&self, outcomes: &[PacketOutcome]) -> Result<PathBuf, OutputWriterError> {
        let mut content = String::with_capacity(outcomes.len() * 160);
        for outcome in outcomes {
            content.push_str(&outcome.to_json());
            content.push('\n');
        }
        self.write(VERDICTS_FILE, content.as_bytes())
    }

    /// Write counters.json.
    pub fn write_counters(&self, counters: &CounterSnapshot) -> Result<PathBuf, OutputWriterError> {
        let mut json = counters.to_json_pretty();
        json.push('\n');
        self.write(COUNTERS_FILE, json.as_bytes())
    }

    pub fn verdicts_path(&self) -> PathBuf {
        self.out_dir.join(VERDICTS_FILE)
    }

    pub fn counters_path(&self) -> PathBuf {
        self.out_dir.join(COUNTERS_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.out_dir.join(STATUS_FILE)
    }

    fn write(&self, file: &'static str, data: &[u8]) -> Result<PathBuf, OutputWriterError> {
        let path = self.out_dir.join(file);
        self.fs
            .write_atomic(&path, data)
            .map_err(|source| OutputWriterError::Write { file, source })?;
        Ok(path)
    }
}
