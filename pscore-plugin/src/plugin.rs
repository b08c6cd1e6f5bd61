//! Match-action entry points.
//!
//! `ScorePlugin` binds the two handlers to the counters handle the host
//! created. It is cheap to clone; every clone shares the same counters, so
//! one plugin can be handed to each parallel execution context.

use std::sync::Arc;

use crate::classifier::classify;
use crate::counters::TierCounters;
use crate::metadata::{MatchData, Metadata};
use crate::quantifier::quantify;
use crate::verdict::{Tier, Verdict};

/// The quantifier and classifier handlers with their shared counters.
#[derive(Debug, Clone)]
pub struct ScorePlugin {
    counters: Arc<TierCounters>,
}

impl ScorePlugin {
    /// Bind the handlers to a counters handle owned by the host.
    pub fn new(counters: Arc<TierCounters>) -> Self {
        Self { counters }
    }

    /// The shared counters handle.
    pub fn counters(&self) -> &Arc<TierCounters> {
        &self.counters
    }

    /// Quantifier: `score_quantified = score / factor.x`.
    ///
    /// Always returns `Verdict::Forward`.
    ///
    /// # Panics
    /// Panics if `factor.x` is zero; the host must not invoke the handler
    /// on such a packet.
    pub fn set_x_factor<M>(&self, headers: &mut M, _data: &MatchData) -> Verdict
    where
        M: Metadata + ?Sized,
    {
        let x = headers.factor_x();
        let score = headers.score();
        headers.set_score_quantified(quantify(score, x));
        Verdict::Forward
    }

    /// Classifier: bucket `score` against `T_high`/`T_low`.
    ///
    /// White and grey packets get their egress spec set and are forwarded.
    /// Black packets are dropped with the egress spec left as it was.
    /// Exactly one tier counter is incremented per call.
    pub fn split<M>(&self, headers: &mut M, data: &MatchData) -> Verdict
    where
        M: Metadata + ?Sized,
    {
        self.split_tier(headers, data).verdict()
    }

    /// Same as [`split`](Self::split), returning the tier instead of the verdict.
    pub fn split_tier<M>(&self, headers: &mut M, _data: &MatchData) -> Tier
    where
        M: Metadata + ?Sized,
    {
        let tier = classify(
            headers.score(),
            headers.threshold_high(),
            headers.threshold_low(),
        );

        if let Some(port) = tier.egress() {
            headers.set_egress_spec(port);
        }
        self.counters.increment(tier);

        tier
    }
}
