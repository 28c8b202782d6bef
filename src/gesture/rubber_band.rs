//! Rubber-band resistance for out-of-bounds drags.
//!
//! Displacement past a bound is scaled by a diminishing-returns curve:
//!
//! ```text
//! overshoot = distance * dimension * c / (dimension + c * distance)
//! ```
//!
//! where `dimension` is the distance between the two bounds and `c` the
//! resistance constant. The curve is ~`c * distance` for small pulls and
//! approaches `dimension` asymptotically, so the overshoot is always bounded.

/// Resistance constant used when none is configured.
pub const DEFAULT_CONSTANT: f64 = 0.55;

/// Overshoot for pulling `distance` past a bound whose neighbor is `dimension` away.
///
/// Returns 0 for a degenerate `dimension` (no neighbor to measure against),
/// for non-positive distances, and for non-finite input.
pub fn rubber_band(distance: f64, dimension: f64, constant: f64) -> f64 {
    if !(distance.is_finite() && dimension.is_finite() && constant.is_finite()) {
        return 0.0;
    }
    if distance <= 0.0 || dimension <= 0.0 || constant <= 0.0 {
        return 0.0;
    }
    (distance * dimension * constant) / (dimension + constant * distance)
}

/// Apply resistance to `position` if it lies outside `[min, max]`.
///
/// Inside the bounds the position is returned unchanged. A zero constant
/// degenerates to a hard clamp.
pub fn rubber_band_if_out_of_bounds(position: f64, min: f64, max: f64, constant: f64) -> f64 {
    if constant <= 0.0 {
        return position.clamp(min.min(max), max.max(min));
    }
    let dimension = max - min;
    if position < min {
        min - rubber_band(min - position, dimension, constant)
    } else if position > max {
        max + rubber_band(position - max, dimension, constant)
    } else {
        position
    }
}
