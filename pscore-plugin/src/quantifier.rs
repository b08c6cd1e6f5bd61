//! Score quantification.

/// Normalize `score` by `factor_x` with truncating integer division.
///
/// `i32::MIN / -1` wraps to `i32::MIN` instead of overflowing.
///
/// # Panics
/// `factor_x` must be non-zero. Passing zero is a caller contract violation
/// and panics.
#[inline]
pub fn quantify(score: i32, factor_x: i32) -> i32 {
    debug_assert_ne!(factor_x, 0, "factor.x must be non-zero");
    score.wrapping_div(factor_x)
}
