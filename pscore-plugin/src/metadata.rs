//! Packet metadata accessors.
//!
//! The host pipeline owns the per-packet metadata layout. Handlers only see
//! it through the named accessors in `Metadata`, one per field the match
//! stages thread between each other.

use serde::{Deserialize, Serialize};

/// Named metadata accessors the host pipeline must provide.
pub trait Metadata {
    /// `factor.x`
    fn factor_x(&self) -> i32;

    /// `score_metadata.score`
    fn score(&self) -> i32;

    /// Set `score_metadata.score`.
    fn set_score(&mut self, value: i32);

    /// `score_metadata.score_quantified`
    fn score_quantified(&self) -> i32;

    /// Set `score_metadata.score_quantified`.
    fn set_score_quantified(&mut self, value: i32);

    /// `threshold.T_high`
    fn threshold_high(&self) -> i32;

    /// `threshold.T_low`
    fn threshold_low(&self) -> i32;

    /// Set `standard_metadata.egress_spec`.
    fn set_egress_spec(&mut self, port: u16);
}

/// Match result for the rule that invoked a handler.
///
/// Neither handler inspects it; it is carried so the entry points keep the
/// host's two-handle calling convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchData {
    pub rule_id: u32,
}

impl MatchData {
    pub fn new(rule_id: u32) -> Self {
        Self { rule_id }
    }
}

/// Plain in-memory packet metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketMetadata {
    pub factor_x: i32,
    pub score: i32,
    #[serde(default)]
    pub score_quantified: i32,
    #[serde(default)]
    pub threshold_high: i32,
    #[serde(default)]
    pub threshold_low: i32,
    #[serde(default)]
    pub egress_spec: u16,
}

impl PacketMetadata {
    /// Metadata carrying only the quantifier inputs.
    pub fn new(factor_x: i32, score: i32) -> Self {
        Self {
            factor_x,
            score,
            ..Default::default()
        }
    }

    /// Builder: set both thresholds.
    pub fn with_thresholds(mut self, threshold_high: i32, threshold_low: i32) -> Self {
        self.threshold_high = threshold_high;
        self.threshold_low = threshold_low;
        self
    }

    /// Builder: set the egress spec already present before classification.
    pub fn with_egress_spec(mut self, egress_spec: u16) -> Self {
        self.egress_spec = egress_spec;
        self
    }
}

impl Metadata for PacketMetadata {
    fn factor_x(&self) -> i32 {
        self.factor_x
    }

    fn score(&self) -> i32 {
        self.score
    }

    fn set_score(&mut self, value: i32) {
        self.score = value;
    }

    fn score_quantified(&self) -> i32 {
        self.score_quantified
    }

    fn set_score_quantified(&mut self, value: i32) {
        self.score_quantified = value;
    }

    fn threshold_high(&self) -> i32 {
        self.threshold_high
    }

    fn threshold_low(&self) -> i32 {
        self.threshold_low
    }

    fn set_egress_spec(&mut self, port: u16) {
        self.egress_spec = port;
    }
}
