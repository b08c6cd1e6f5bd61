//! Packet file loader.
//!
//! Packet files are JSONL, one record per line:
//!
//! ```text
//! {"ts_ms": 1000, "factor_x": 2, "score": 100, "threshold_high": 60, "threshold_low": 40}
//! ```
//!
//! - Lines starting with # are comments
//! - Empty lines are ignored
//! - `ts_ms` and `egress_spec` default to 0
//! - `threshold_high`/`threshold_low` are a rule's static thresholds; give
//!   both or neither
//! - `ts_ms` must not decrease from one record to the next

use std::path::Path;

use pscore_control::Thresholds;
use pscore_plugin::PacketMetadata;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fs::{Filesystem, FsError};

/// Errors from packet loading.
#[derive(Debug, Error)]
pub enum PacketLoadError {
    #[error("failed to read packet file: {0}")]
    Read(#[from] FsError),

    #[error("invalid record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("factor_x must be non-zero on line {line}")]
    ZeroFactor { line: usize },

    #[error("threshold_high and threshold_low must be given together on line {line}")]
    PartialThresholds { line: usize },

    #[error("ts_ms went backwards on line {line}: {ts_ms} after {previous}")]
    OutOfOrder { line: usize, ts_ms: u64, previous: u64 },
}

/// One input packet's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacketRecord {
    /// Arrival time in milliseconds; assigns the packet to a control cycle.
    #[serde(default)]
    pub ts_ms: u64,

    pub factor_x: i32,

    pub score: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_high: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_low: Option<i32>,

    /// Egress port already assigned upstream.
    #[serde(default)]
    pub egress_spec: u16,
}

impl PacketRecord {
    pub fn new(factor_x: i32, score: i32) -> Self {
        Self {
            ts_ms: 0,
            factor_x,
            score,
            threshold_high: None,
            threshold_low: None,
            egress_spec: 0,
        }
    }

    /// Builder: set ts_ms.
    pub fn with_ts_ms(mut self, ts_ms: u64) -> Self {
        self.ts_ms = ts_ms;
        self
    }

    /// Builder: set the rule thresholds.
    pub fn with_thresholds(mut self, high: i32, low: i32) -> Self {
        self.threshold_high = Some(high);
        self.threshold_low = Some(low);
        self
    }

    /// Builder: set egress_spec.
    pub fn with_egress_spec(mut self, egress_spec: u16) -> Self {
        self.egress_spec = egress_spec;
        self
    }

    /// The record's own thresholds, if it carries a complete pair.
    pub fn rule_thresholds(&self) -> Option<Thresholds> {
        match (self.threshold_high, self.threshold_low) {
            (Some(high), Some(low)) => Some(Thresholds::new(high, low)),
            _ => None,
        }
    }

    /// Build handler metadata, using `fallback` when the record has no
    /// thresholds of its own.
    pub fn to_metadata(&self, fallback: Thresholds) -> PacketMetadata {
        let thresholds = self.rule_thresholds().unwrap_or(fallback);
        PacketMetadata::new(self.factor_x, self.score)
            .with_thresholds(thresholds.high, thresholds.low)
            .with_egress_spec(self.egress_spec)
    }
}

/// Load packet records from a file.
pub fn load_packets<F: Filesystem>(
    fs: &F,
    path: &Path,
) -> Result<Vec<PacketRecord>, PacketLoadError> {
    let content = fs.read_file(path)?;
    parse_packets(&content)
}

/// Parse packet records from JSONL content.
pub fn parse_packets(content: &str) -> Result<Vec<PacketRecord>, PacketLoadError> {
    let mut records = Vec::new();
    let mut previous_ts: Option<u64> = None;

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = line_num + 1;

        let record: PacketRecord = serde_json::from_str(trimmed)
            .map_err(|source| PacketLoadError::Parse { line, source })?;

        if record.factor_x == 0 {
            return Err(PacketLoadError::ZeroFactor { line });
        }
        if record.threshold_high.is_some() != record.threshold_low.is_some() {
            return Err(PacketLoadError::PartialThresholds { line });
        }
        if let Some(previous) = previous_ts {
            if record.ts_ms < previous {
                return Err(PacketLoadError::OutOfOrder {
                    line,
                    ts_ms: record.ts_ms,
                    previous,
                });
            }
        }

        previous_ts = Some(record.ts_ms);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFilesystem;
    use std::path::PathBuf;

    // ===========================================
    // parse_packets
    // ===========================================

    #[test]
    fn test_parse_empty() {
        assert!(parse_packets("").expect("parse").is_empty());
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let content = "# capture from lab\n\n{\"factor_x\": 2, \"score\": 100}\n   \n";
        let records = parse_packets(content).expect("parse");
        assert_eq!(records, vec![PacketRecord::new(2, 100)]);
    }

    #[test]
    fn test_parse_full_record() {
        let content = r#"{"ts_ms": 1500, "factor_x": 3, "score": -90, "threshold_high": 10, "threshold_low": -10, "egress_spec": 7}"#;
        let records = parse_packets(content).expect("parse");
        assert_eq!(
            records[0],
            PacketRecord::new(3, -90)
                .with_ts_ms(1500)
                .with_thresholds(10, -10)
                .with_egress_spec(7)
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let content = "{\"factor_x\": 1, \"score\": 1}\n# comment\nnot json\n";
        let err = parse_packets(content).unwrap_err();
        assert!(matches!(err, PacketLoadError::Parse { line: 3, .. }));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_missing_score_rejected() {
        let err = parse_packets(r#"{"factor_x": 1}"#).unwrap_err();
        assert!(matches!(err, PacketLoadError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_parse_unknown_field_rejected() {
        let err = parse_packets(r#"{"factor_x": 1, "score": 1, "sc0re": 2}"#).unwrap_err();
        assert!(matches!(err, PacketLoadError::Parse { .. }));
    }

    #[test]
    fn test_parse_egress_out_of_range_rejected() {
        let err = parse_packets(r#"{"factor_x": 1, "score": 1, "egress_spec": 70000}"#).unwrap_err();
        assert!(matches!(err, PacketLoadError::Parse { .. }));
    }

    #[test]
    fn test_parse_zero_factor_rejected() {
        let content = "{\"factor_x\": 1, \"score\": 1}\n{\"factor_x\": 0, \"score\": 5}\n";
        let err = parse_packets(content).unwrap_err();
        assert!(matches!(err, PacketLoadError::ZeroFactor { line: 2 }));
    }

    #[test]
    fn test_parse_partial_thresholds_rejected() {
        let err = parse_packets(r#"{"factor_x": 1, "score": 1, "threshold_high": 5}"#).unwrap_err();
        assert!(matches!(err, PacketLoadError::PartialThresholds { line: 1 }));
    }

    #[test]
    fn test_parse_out_of_order_rejected() {
        let content = concat!(
            "{\"ts_ms\": 100, \"factor_x\": 1, \"score\": 1}\n",
            "{\"ts_ms\": 100, \"factor_x\": 1, \"score\": 1}\n",
            "{\"ts_ms\": 99, \"factor_x\": 1, \"score\": 1}\n",
        );
        let err = parse_packets(content).unwrap_err();
        assert!(matches!(
            err,
            PacketLoadError::OutOfOrder {
                line: 3,
                ts_ms: 99,
                previous: 100
            }
        ));
    }

    // ===========================================
    // PacketRecord
    // ===========================================

    #[test]
    fn test_rule_thresholds_need_both() {
        assert_eq!(PacketRecord::new(1, 1).rule_thresholds(), None);
        assert_eq!(
            PacketRecord::new(1, 1).with_thresholds(9, 3).rule_thresholds(),
            Some(Thresholds::new(9, 3))
        );
    }

    #[test]
    fn test_to_metadata_prefers_rule_thresholds() {
        let record = PacketRecord::new(2, 100).with_thresholds(60, 40).with_egress_spec(5);
        let meta = record.to_metadata(Thresholds::new(1, 0));

        assert_eq!(meta, PacketMetadata::new(2, 100).with_thresholds(60, 40).with_egress_spec(5));
    }

    #[test]
    fn test_to_metadata_uses_fallback() {
        let meta = PacketRecord::new(2, 100).to_metadata(Thresholds::new(70, 30));
        assert_eq!(meta.threshold_high, 70);
        assert_eq!(meta.threshold_low, 30);
    }

    #[test]
    fn test_record_serialization_omits_absent_thresholds() {
        let json = serde_json::to_string(&PacketRecord::new(1, 2)).expect("serialize");
        assert!(!json.contains("threshold"));
    }

    // ===========================================
    // load_packets
    // ===========================================

    #[test]
    fn test_load_packets_from_filesystem() {
        let fs = MockFilesystem::new();
        let path = PathBuf::from("/in/packets.jsonl");
        fs.add_file(path.clone(), "{\"factor_x\": 4, \"score\": 8}\n");

        let records = load_packets(&fs, &path).expect("load");
        assert_eq!(records, vec![PacketRecord::new(4, 8)]);
    }

    #[test]
    fn test_load_packets_missing_file() {
        let fs = MockFilesystem::new();
        let err = load_packets(&fs, Path::new("/nope")).unwrap_err();
        assert!(matches!(err, PacketLoadError::Read(_)));
    }
}
