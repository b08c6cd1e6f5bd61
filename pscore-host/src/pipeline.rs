//! Host pipeline runner.
//!
//! Drives one packet through the two match stages the way the switch
//! pipeline would: Quantifier, then Classifier, with the host threading the
//! quantified score into the field the Classifier compares.

use clap::ValueEnum;
use pscore_control::Thresholds;
use pscore_plugin::{MatchData, Metadata, ScorePlugin, Tier, Verdict};
use serde::{Deserialize, Serialize};

use crate::io::PacketRecord;

/// Which score the Classifier compares against the thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Copy `score_quantified` into `score` between the two stages.
    #[default]
    Quantified,
    /// Leave `score` as it arrived.
    Raw,
}

/// Result of running one packet through both stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketOutcome {
    pub ts_ms: u64,
    pub verdict: Verdict,
    pub tier: Tier,
    /// The score the Classifier compared.
    pub score: i32,
    pub score_quantified: i32,
    pub threshold_high: i32,
    pub threshold_low: i32,
    /// Egress after classification; unchanged from the input for black.
    pub egress_spec: u16,
}

impl PacketOutcome {
    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("PacketOutcome serialization cannot fail")
    }
}

/// Runs packets through a `ScorePlugin`.
#[derive(Debug, Clone)]
pub struct HostPipeline {
    plugin: ScorePlugin,
    source: ScoreSource,
}

impl HostPipeline {
    pub fn new(plugin: ScorePlugin, source: ScoreSource) -> Self {
        Self { plugin, source }
    }

    pub fn plugin(&self) -> &ScorePlugin {
        &self.plugin
    }

    pub fn source(&self) -> ScoreSource {
        self.source
    }

    /// Run one packet. `fallback` applies when the record has no rule
    /// thresholds of its own.
    ///
    /// # Panics
    /// Panics if the record's `factor_x` is zero; `parse_packets` rejects
    /// such records.
    pub fn process(&self, record: &PacketRecord, fallback: Thresholds) -> PacketOutcome {
        let data = MatchData::default();
        let mut meta = record.to_metadata(fallback);

        self.plugin.set_x_factor(&mut meta, &data);
        if self.source == ScoreSource::Quantified {
            let quantified = meta.score_quantified();
            meta.set_score(quantified);
        }
        let tier = self.plugin.split_tier(&mut meta, &data);

        PacketOutcome {
            ts_ms: record.ts_ms,
            verdict: tier.verdict(),
            tier,
            score: meta.score,
            score_quantified: meta.score_quantified,
            threshold_high: meta.threshold_high,
            threshold_low: meta.threshold_low,
            egress_spec: meta.egress_spec,
        }
    }

    /// Run a batch on up to `workers` threads sharing the plugin's counters.
    ///
    /// Records are split into contiguous chunks, one per worker; outcomes are
    /// returned in input order.
    pub fn process_batch(
        &self,
        records: &[PacketRecord],
        fallback: Thresholds,
        workers: usize,
    ) -> Vec<PacketOutcome> {
        let workers = workers.clamp(1, records.len().max(1));
        if workers == 1 {
            return records.iter().map(|r| self.process(r, fallback)).collect();
        }

        let chunk_size = (records.len() + workers - 1) / workers;
        std::thread::scope(|scope| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|r| self.process(r, fallback))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut outcomes = Vec::with_capacity(records.len());
            for handle in handles {
                match handle.join() {
                    Ok(part) => outcomes.extend(part),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            outcomes
        })
    }
}
