//! PacketScore Threshold Control
//!
//! Control-plane companion to `pscore-plugin`. Once per control period it
//! reads the tier counters, measures white/grey/black flow rates and moves
//! `T_high`/`T_low` so the forwarded rate tracks the configured targets:
//! - `cdf` - score distribution used to translate pass ratios into thresholds
//! - `shedding` - per-tier pass ratio (psi) update
//! - `controller` - the per-cycle control loop step
//! - `config` - controller parameters and their defaults

pub mod cdf;
pub mod config;
pub mod controller;
pub mod shedding;
pub mod types;

pub use cdf::ScoreCdf;
pub use config::{ConfigError, ControlConfig};
pub use controller::ThresholdController;
pub use shedding::update_psi;
pub use types::{CycleSummary, Thresholds, TierRates};
