//! Shared controller types.

use pscore_plugin::CounterSnapshot;
use serde::{Deserialize, Serialize};

/// Threshold pair published to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: i32,
    pub low: i32,
}

impl Thresholds {
    pub fn new(high: i32, low: i32) -> Self {
        Self { high, low }
    }

    /// Thresholds under which every score classifies white.
    pub fn pass_all() -> Self {
        Self {
            high: i32::MIN,
            low: i32::MIN,
        }
    }

    pub fn is_pass_all(&self) -> bool {
        *self == Self::pass_all()
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::pass_all()
    }
}

/// Flows per second for each tier over one control period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierRates {
    pub white_fps: f64,
    pub grey_fps: f64,
    pub black_fps: f64,
}

impl TierRates {
    /// Convert per-period counts to rates.
    pub fn from_counts(counts: &CounterSnapshot, period_sec: f64) -> Self {
        Self {
            white_fps: counts.white_flows as f64 / period_sec,
            grey_fps: counts.grey_flows as f64 / period_sec,
            black_fps: counts.black_flows as f64 / period_sec,
        }
    }

    pub fn total_fps(&self) -> f64 {
        self.white_fps + self.grey_fps + self.black_fps
    }
}

/// Outcome of one control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Control cycle number (1-indexed).
    pub cycle: u64,

    /// Flows classified per tier during this cycle.
    pub counts: CounterSnapshot,

    /// The same counts as rates.
    pub rates: TierRates,

    /// Whether the filter was engaged at the end of this cycle.
    pub filter_on: bool,

    pub psi_white: f64,
    pub psi_grey: f64,

    /// Thresholds published before this cycle.
    pub previous: Thresholds,

    /// Thresholds published for the next cycle.
    pub current: Thresholds,

    /// True when the score CDF was rotated at the start of this cycle,
    /// before its deltas and thresholds were computed.
    pub cdf_rotated: bool,
}

impl CycleSummary {
    /// Total flows classified during this cycle.
    pub fn flows(&self) -> u64 {
        self.counts.total()
    }

    pub fn thresholds_changed(&self) -> bool {
        self.previous != self.current
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("CycleSummary serialization cannot fail")
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_all_classifies_everything_white() {
        let thresholds = Thresholds::pass_all();
        assert_eq!(
            pscore_plugin::classify(i32::MIN, thresholds.high, thresholds.low),
            pscore_plugin::Tier::White
        );
        assert!(thresholds.is_pass_all());
    }

    #[test]
    fn test_thresholds_default_is_pass_all() {
        assert_eq!(Thresholds::default(), Thresholds::pass_all());
        assert!(!Thresholds::new(10, 5).is_pass_all());
    }

    #[test]
    fn test_rates_from_counts() {
        let counts = CounterSnapshot::new(100, 50, 25);
        let rates = TierRates::from_counts(&counts, 0.5);
        assert_eq!(rates.white_fps, 200.0);
        assert_eq!(rates.grey_fps, 100.0);
        assert_eq!(rates.black_fps, 50.0);
        assert_eq!(rates.total_fps(), 350.0);
    }

    #[test]
    fn test_cycle_summary_json_roundtrip() {
        let summary = CycleSummary {
            cycle: 3,
            counts: CounterSnapshot::new(4, 2, 1),
            rates: TierRates::from_counts(&CounterSnapshot::new(4, 2, 1), 1.0),
            filter_on: true,
            psi_white: 0.5,
            psi_grey: 0.25,
            previous: Thresholds::pass_all(),
            current: Thresholds::new(12, 7),
            cdf_rotated: false,
        };

        let json = summary.to_json();
        assert!(json.contains("\"white_flows\":4"));
        assert!(!json.contains('\n'));

        let parsed = CycleSummary::from_json(&json).expect("parse");
        assert_eq!(parsed, summary);
        assert_eq!(parsed.flows(), 7);
        assert!(parsed.thresholds_changed());
    }
}
