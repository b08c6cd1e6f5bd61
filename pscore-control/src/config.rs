//! Threshold controller configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cdf::{DEFAULT_BINS, MAX_BINS};

/// Default control period in milliseconds.
pub const DEFAULT_PERIOD_MS: u64 = 1000;

/// Default cycle rate (flows per second) that engages filtering.
pub const DEFAULT_OVERLOAD_FPS: f64 = 400.0;

/// Default target white-tier rate.
pub const DEFAULT_TARGET_WHITE_FPS: f64 = 400.0;

/// Default target grey-tier rate.
pub const DEFAULT_TARGET_GREY_FPS: f64 = 200.0;

/// Default lower bound for the per-tier pass ratio.
pub const DEFAULT_PSI_MIN: f64 = 0.05;

/// Default number of control cycles between score CDF rotations.
pub const DEFAULT_CDF_ROTATION_CYCLES: u64 = 15;

/// Errors from configuration validation or loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("period_ms must be at least 1, got {0}")]
    InvalidPeriod(u64),

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("psi_min must be in (0, 1], got {0}")]
    InvalidPsiMin(f64),

    #[error("cdf_bins must be in [1, {max}], got {0}", max = MAX_BINS)]
    InvalidBins(usize),

    #[error("cdf_rotation_cycles must be at least 1, got {0}")]
    InvalidRotation(u64),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Threshold controller configuration.
///
/// Every field may be omitted from a JSON config file and takes its
/// `DEFAULT_*` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    pub period_ms: u64,
    pub overload_fps: f64,
    pub target_white_fps: f64,
    pub target_grey_fps: f64,
    pub psi_min: f64,
    pub cdf_bins: usize,
    pub cdf_rotation_cycles: u64,
}

impl ControlConfig {
    /// Create a config with all defaults.
    pub fn new() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            overload_fps: DEFAULT_OVERLOAD_FPS,
            target_white_fps: DEFAULT_TARGET_WHITE_FPS,
            target_grey_fps: DEFAULT_TARGET_GREY_FPS,
            psi_min: DEFAULT_PSI_MIN,
            cdf_bins: DEFAULT_BINS,
            cdf_rotation_cycles: DEFAULT_CDF_ROTATION_CYCLES,
        }
    }

    /// Builder: set period_ms.
    pub fn with_period_ms(mut self, period_ms: u64) -> Self {
        self.period_ms = period_ms;
        self
    }

    /// Builder: set overload_fps.
    pub fn with_overload_fps(mut self, fps: f64) -> Self {
        self.overload_fps = fps;
        self
    }

    /// Builder: set both tier targets.
    pub fn with_targets(mut self, white_fps: f64, grey_fps: f64) -> Self {
        self.target_white_fps = white_fps;
        self.target_grey_fps = grey_fps;
        self
    }

    /// Builder: set psi_min.
    pub fn with_psi_min(mut self, psi_min: f64) -> Self {
        self.psi_min = psi_min;
        self
    }

    /// Builder: set cdf_bins.
    pub fn with_cdf_bins(mut self, bins: usize) -> Self {
        self.cdf_bins = bins;
        self
    }

    /// Builder: set cdf_rotation_cycles.
    pub fn with_cdf_rotation_cycles(mut self, cycles: u64) -> Self {
        self.cdf_rotation_cycles = cycles;
        self
    }

    /// Control period in seconds.
    pub fn period_sec(&self) -> f64 {
        self.period_ms as f64 / 1000.0
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_ms == 0 {
            return Err(ConfigError::InvalidPeriod(self.period_ms));
        }
        check_rate("overload_fps", self.overload_fps)?;
        check_rate("target_white_fps", self.target_white_fps)?;
        check_rate("target_grey_fps", self.target_grey_fps)?;
        if !(self.psi_min > 0.0 && self.psi_min <= 1.0) {
            return Err(ConfigError::InvalidPsiMin(self.psi_min));
        }
        if self.cdf_bins == 0 || self.cdf_bins > MAX_BINS {
            return Err(ConfigError::InvalidBins(self.cdf_bins));
        }
        if self.cdf_rotation_cycles == 0 {
            return Err(ConfigError::InvalidRotation(self.cdf_rotation_cycles));
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ControlConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn check_rate(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // Defaults and builders
    // ===========================================

    #[test]
    fn test_defaults() {
        let config = ControlConfig::new();
        assert_eq!(config.period_ms, 1000);
        assert_eq!(config.overload_fps, 400.0);
        assert_eq!(config.target_white_fps, 400.0);
        assert_eq!(config.target_grey_fps, 200.0);
        assert_eq!(config.psi_min, 0.05);
        assert_eq!(config.cdf_bins, 1000);
        assert_eq!(config.cdf_rotation_cycles, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = ControlConfig::new()
            .with_period_ms(250)
            .with_overload_fps(10.0)
            .with_targets(8.0, 4.0)
            .with_psi_min(0.1)
            .with_cdf_bins(20)
            .with_cdf_rotation_cycles(3);

        assert_eq!(config.period_ms, 250);
        assert_eq!(config.period_sec(), 0.25);
        assert_eq!(config.overload_fps, 10.0);
        assert_eq!(config.target_white_fps, 8.0);
        assert_eq!(config.target_grey_fps, 4.0);
        assert_eq!(config.psi_min, 0.1);
        assert_eq!(config.cdf_bins, 20);
        assert_eq!(config.cdf_rotation_cycles, 3);
    }

    // ===========================================
    // Validation
    // ===========================================

    #[test]
    fn test_zero_period_rejected() {
        let err = ControlConfig::new().with_period_ms(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPeriod(0)));
    }

    #[test]
    fn test_non_positive_rates_rejected() {
        let err = ControlConfig::new().with_overload_fps(0.0).validate().unwrap_err();
        assert!(err.to_string().contains("overload_fps"));

        let err = ControlConfig::new().with_targets(-1.0, 1.0).validate().unwrap_err();
        assert!(err.to_string().contains("target_white_fps"));

        let err = ControlConfig::new().with_targets(1.0, f64::NAN).validate().unwrap_err();
        assert!(err.to_string().contains("target_grey_fps"));
    }

    #[test]
    fn test_psi_min_range() {
        assert!(ControlConfig::new().with_psi_min(1.0).validate().is_ok());
        assert!(matches!(
            ControlConfig::new().with_psi_min(0.0).validate(),
            Err(ConfigError::InvalidPsiMin(_))
        ));
        assert!(matches!(
            ControlConfig::new().with_psi_min(1.5).validate(),
            Err(ConfigError::InvalidPsiMin(_))
        ));
    }

    #[test]
    fn test_zero_bins_and_rotation_rejected() {
        assert!(matches!(
            ControlConfig::new().with_cdf_bins(0).validate(),
            Err(ConfigError::InvalidBins(0))
        ));
        assert!(matches!(
            ControlConfig::new().with_cdf_rotation_cycles(0).validate(),
            Err(ConfigError::InvalidRotation(0))
        ));
    }

    #[test]
    fn test_bins_upper_bound() {
        assert!(ControlConfig::new().with_cdf_bins(MAX_BINS).validate().is_ok());
        let err = ControlConfig::new().with_cdf_bins(MAX_BINS + 1).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBins(n) if n == MAX_BINS + 1));
        assert!(err.to_string().contains("1000000"));
    }

    // ===========================================
    // JSON loading
    // ===========================================

    #[test]
    fn test_from_json_empty_object_is_default() {
        let config = ControlConfig::from_json("{}").expect("parse");
        assert_eq!(config, ControlConfig::default());
    }

    #[test]
    fn test_from_json_partial_override() {
        let config =
            ControlConfig::from_json(r#"{"period_ms": 500, "target_grey_fps": 50.0}"#).expect("parse");
        assert_eq!(config.period_ms, 500);
        assert_eq!(config.target_grey_fps, 50.0);
        assert_eq!(config.target_white_fps, DEFAULT_TARGET_WHITE_FPS);
    }

    #[test]
    fn test_from_json_unknown_field_rejected() {
        let err = ControlConfig::from_json(r#"{"period": 500}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_json_invalid_values_rejected() {
        let err = ControlConfig::from_json(r#"{"cdf_bins": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBins(0)));
    }

    #[test]
    fn test_from_json_oversized_bins_rejected() {
        let err = ControlConfig::from_json(r#"{"cdf_bins": 18446744073709551615}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBins(usize::MAX)));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            ControlConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
