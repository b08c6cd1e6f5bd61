//! Threshold control loop step.
//!
//! One `close_cycle` call per control period:
//! 1. rotate the score CDF every `cdf_rotation_cycles` cycles
//! 2. diff the tier counters against the previous cycle
//! 3. engage filtering (sticky) once a CDF exists and the cycle is overloaded
//! 4. update psi for the white and grey tiers
//! 5. translate psi into `T_high`/`T_low` through the CDF
//! 6. publish the computed thresholds, or pass-all while filtering is off

use pscore_plugin::CounterSnapshot;

use crate::cdf::ScoreCdf;
use crate::config::ControlConfig;
use crate::shedding::update_psi;
use crate::types::{CycleSummary, Thresholds, TierRates};

/// Stateful threshold controller.
#[derive(Debug, Clone)]
pub struct ThresholdController {
    config: ControlConfig,
    cycle: u64,
    last_snapshot: CounterSnapshot,
    filter_on: bool,
    psi_white: f64,
    psi_grey: f64,
    computed: Option<Thresholds>,
    published: Thresholds,
    current_cdf: ScoreCdf,
    search_cdf: Option<ScoreCdf>,
}

impl ThresholdController {
    /// Create a controller.
    ///
    /// `baseline` is the counter state when control starts; the first cycle
    /// only counts flows classified after it.
    pub fn new(config: ControlConfig, baseline: CounterSnapshot) -> Self {
        let current_cdf = ScoreCdf::new(config.cdf_bins);
        Self {
            config,
            cycle: 0,
            last_snapshot: baseline,
            filter_on: false,
            psi_white: 1.0,
            psi_grey: 1.0,
            computed: None,
            published: Thresholds::pass_all(),
            current_cdf,
            search_cdf: None,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Thresholds the classifier should use until the next cycle closes.
    pub fn thresholds(&self) -> Thresholds {
        self.published
    }

    pub fn filter_on(&self) -> bool {
        self.filter_on
    }

    pub fn psi(&self) -> (f64, f64) {
        (self.psi_white, self.psi_grey)
    }

    /// Number of cycles closed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether a finalized score CDF is available for threshold search.
    pub fn has_cdf(&self) -> bool {
        self.search_cdf.is_some()
    }

    /// Record a score seen by the classifier in the current interval.
    pub fn observe_score(&mut self, score: i32) {
        self.current_cdf.add(score);
    }

    /// Close one control period given the counters read at its end.
    pub fn close_cycle(&mut self, snapshot: CounterSnapshot) -> CycleSummary {
        self.cycle += 1;

        let cdf_rotated = self.cycle % self.config.cdf_rotation_cycles == 0 && self.rotate_cdf();

        let counts = snapshot.delta_since(&self.last_snapshot);
        self.last_snapshot = snapshot;
        let rates = TierRates::from_counts(&counts, self.config.period_sec());

        if self.search_cdf.is_some() && rates.total_fps() >= self.config.overload_fps {
            self.filter_on = true;
        }

        self.psi_white = update_psi(
            self.psi_white,
            rates.white_fps,
            self.config.target_white_fps,
            self.config.psi_min,
        );
        self.psi_grey = update_psi(
            self.psi_grey,
            rates.grey_fps,
            self.config.target_grey_fps,
            self.config.psi_min,
        );

        if let Some(cdf) = &self.search_cdf {
            let high = cdf.search(1.0 - self.psi_white);
            let low = cdf.search(1.0 - self.psi_white - self.psi_grey);
            if let (Some(high), Some(low)) = (high, low) {
                self.computed = Some(Thresholds::new(to_threshold(high), to_threshold(low)));
            }
        }

        let previous = self.published;
        self.published = match (self.filter_on, self.computed) {
            (true, Some(thresholds)) => thresholds,
            _ => Thresholds::pass_all(),
        };

        CycleSummary {
            cycle: self.cycle,
            counts,
            rates,
            filter_on: self.filter_on,
            psi_white: self.psi_white,
            psi_grey: self.psi_grey,
            previous,
            current: self.published,
            cdf_rotated,
        }
    }

    /// Finalize the collecting CDF and make it the search CDF.
    /// An interval with no scores keeps the previous search CDF.
    fn rotate_cdf(&mut self) -> bool {
        if !self.current_cdf.finalize() {
            return false;
        }
        let fresh = ScoreCdf::new(self.config.cdf_bins);
        self.search_cdf = Some(std::mem::replace(&mut self.current_cdf, fresh));
        true
    }
}

/// Round a CDF bin midpoint to the nearest integer score (saturating).
fn to_threshold(value: f64) -> i32 {
    value.round() as i32
}
