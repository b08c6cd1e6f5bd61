//! Per-tier pass ratio (psi) update.
//!
//! psi is the fraction of the score distribution admitted into a tier.
//! Each cycle it is scaled by `target / measured` so the tier's rate moves
//! toward its target, then clamped to `[psi_min, 1.0]`.

/// Multiplier applied when a tier saw no traffic at all.
/// Only needs to be large enough to saturate psi at 1.0.
const IDLE_BOOST: f64 = 999_999.9;

/// Compute the next pass ratio for one tier.
pub fn update_psi(last_psi: f64, current_fps: f64, target_fps: f64, psi_min: f64) -> f64 {
    let scaled = if current_fps == 0.0 {
        last_psi * IDLE_BOOST
    } else {
        last_psi * target_fps / current_fps
    };

    scaled.min(1.0).max(psi_min)
}
