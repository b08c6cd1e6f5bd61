//! Status writer for status.jsonl output.
//!
//! One `CycleSummary` JSON line per closed control cycle. The file is
//! truncated when a replay starts, then appended to as cycles close.

use std::path::{Path, PathBuf};

use pscore_control::CycleSummary;
use thiserror::Error;

use crate::fs::{Filesystem, FsError};

/// Errors from status writing.
#[derive(Debug, Error)]
pub enum StatusWriterError {
    #[error("failed to reset status file: {0}")]
    Reset(#[source] FsError),

    #[error("failed to append status: {0}")]
    Append(#[source] FsError),
}

/// Writer for the status.jsonl file.
pub struct StatusWriter<'a, F: Filesystem> {
    fs: &'a F,
    path: PathBuf,
}

impl<'a, F: Filesystem> StatusWriter<'a, F> {
    pub fn new(fs: &'a F, path: PathBuf) -> Self {
        Self { fs, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start an empty status file, discarding lines from a previous run.
    pub fn reset(&self) -> Result<(), StatusWriterError> {
        self.fs
            .write_atomic(&self.path, b"")
            .map_err(StatusWriterError::Reset)
    }

    /// Append one cycle summary followed by a newline.
    pub fn append(&self, summary: &CycleSummary) -> Result<(), StatusWriterError> {
        let line = format!("{}\n", summary.to_json());
        self.fs
            .append(&self.path, line.as_bytes())
            .map_err(StatusWriterError::Append)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFilesystem;
    use pscore_control::{Thresholds, TierRates};
    use pscore_plugin::CounterSnapshot;

    fn summary(cycle: u64) -> CycleSummary {
        let counts = CounterSnapshot::new(cycle as u32, 1, 0);
        CycleSummary {
            cycle,
            counts,
            rates: TierRates::from_counts(&counts, 1.0),
            filter_on: false,
            psi_white: 1.0,
            psi_grey: 1.0,
            previous: Thresholds::pass_all(),
            current: Thresholds::pass_all(),
            cdf_rotated: false,
        }
    }

    #[test]
    fn test_append_writes_one_line_per_cycle() {
        let fs = MockFilesystem::new();
        let writer = StatusWriter::new(&fs, PathBuf::from("/out/status.jsonl"));

        writer.append(&summary(1)).expect("append");
        writer.append(&summary(2)).expect("append");

        let content = fs.get_string(writer.path()).expect("file");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(CycleSummary::from_json(lines[0]).expect("parse"), summary(1));
        assert_eq!(CycleSummary::from_json(lines[1]).expect("parse"), summary(2));
    }

    #[test]
    fn test_reset_discards_previous_lines() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/out/status.jsonl");
        fs.add_file(path.clone(), "stale\n");
        let writer = StatusWriter::new(&fs, path.clone());

        writer.reset().expect("reset");
        writer.append(&summary(1)).expect("append");

        let content = fs.get_string(&path).expect("file");
        assert!(!content.contains("stale"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_line_uses_counter_names() {
        let fs = MockFilesystem::new();
        let writer = StatusWriter::new(&fs, PathBuf::from("/s.jsonl"));
        writer.append(&summary(3)).expect("append");

        let content = fs.get_string(writer.path()).expect("file");
        assert!(content.contains("\"white_flows\":3"));
        assert!(content.contains("\"grey_flows\":1"));
        assert!(content.ends_with('\n'));
    }
}
