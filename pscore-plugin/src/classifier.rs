//! Three-tier threshold classification.

use crate::verdict::Tier;

/// Pick the tier for `score`.
///
/// Decision order:
/// - `score >= threshold_high` -> White
/// - `score >= threshold_low`  -> Grey
/// - otherwise                 -> Black
///
/// Equality goes to the higher tier. The thresholds are expected to satisfy
/// `threshold_low <= threshold_high` but this is not checked: with inverted
/// thresholds the grey band is empty and scores in `[high, low)` are white,
/// scores below `high` are black.
#[inline]
pub fn classify(score: i32, threshold_high: i32, threshold_low: i32) -> Tier {
    if score >= threshold_high {
        Tier::White
    } else if score >= threshold_low {
        Tier::Grey
    } else {
        Tier::Black
    }
}
