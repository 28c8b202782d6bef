//! Snap points and snap-point sets.

use super::error::InvalidHeight;
use serde::Serialize;
use std::fmt;

/// A height the sheet may rest at.
///
/// # Invariants
/// - Always an integer (rounded on construction)
/// - Always within `[0, max_height]` at construction time
/// - Never constructed from NaN (smart constructor fails fast)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SnapPoint(u32);

impl SnapPoint {
    /// The fully-collapsed height.
    pub const ZERO: Self = Self(0);

    /// Round `height` to the nearest integer and clamp it to `[0, max_height]`.
    ///
    /// # Errors
    /// Returns [`InvalidHeight`] when `height` is NaN. `max_height` that is NaN
    /// or negative is treated as zero.
    pub fn new(height: f64, max_height: f64) -> Result<Self, InvalidHeight> {
        let rounded = round_height(height)?;
        let ceiling = round_height(max_height).unwrap_or(0.0).max(0.0);
        let clamped = rounded.clamp(0.0, ceiling);
        Ok(Self(clamped.min(u32::MAX as f64) as u32))
    }

    /// Height in layout pixels.
    pub fn height(&self) -> f64 {
        f64::from(self.0)
    }

    /// Raw integer height.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for SnapPoint {
    fn from(height: u32) -> Self {
        Self(height)
    }
}

impl fmt::Display for SnapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Round a height to the nearest integer, failing fast on NaN.
///
/// Infinite values pass through; callers clamp them.
pub fn round_height(height: f64) -> Result<f64, InvalidHeight> {
    if height.is_nan() {
        return Err(InvalidHeight(height));
    }
    Ok(height.round())
}

/// Ascending, duplicate-free, non-empty sequence of snap points.
///
/// `min()` is the first element and `max()` the last. Before dimensions are
/// known the set is the single-element fallback `[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapPointSet(Vec<SnapPoint>);

impl Default for SnapPointSet {
    fn default() -> Self {
        Self::fallback()
    }
}

impl SnapPointSet {
    /// The `[0]` set used before the content region has been measured.
    pub fn fallback() -> Self {
        Self(vec![SnapPoint::ZERO])
    }

    /// Build a set from arbitrary points, sorting and deduplicating.
    ///
    /// Returns `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = SnapPoint>) -> Option<Self> {
        let mut points: Vec<SnapPoint> = points.into_iter().collect();
        if points.is_empty() {
            return None;
        }
        points.sort_unstable();
        points.dedup();
        Some(Self(points))
    }

    /// Smallest snap point.
    pub fn min(&self) -> SnapPoint {
        self.0[0]
    }

    /// Largest snap point.
    pub fn max(&self) -> SnapPoint {
        self.0[self.0.len() - 1]
    }

    /// Number of snap points (always >= 1).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = SnapPoint> + '_ {
        self.0.iter().copied()
    }

    /// Heights as a plain slice.
    pub fn as_slice(&self) -> &[SnapPoint] {
        &self.0
    }

    /// Whether `height`, once rounded, is a member of the set.
    pub fn contains_height(&self, height: f64) -> bool {
        match round_height(height) {
            Ok(rounded) => self.0.iter().any(|p| p.height() == rounded),
            Err(_) => false,
        }
    }

    /// Nearest member to `target`; exact ties resolve to the smaller point.
    ///
    /// `target` is rounded first. Linear scan in ascending order, replacing the
    /// best candidate only on a strictly smaller distance.
    ///
    /// # Errors
    /// Returns [`InvalidHeight`] when `target` is NaN.
    pub fn nearest(&self, target: f64) -> Result<SnapPoint, InvalidHeight> {
        let query = round_height(target)?;
        let mut best = self.min();
        let mut best_distance = (best.height() - query).abs();
        for point in self.iter().skip(1) {
            let distance = (point.height() - query).abs();
            if distance < best_distance {
                best = point;
                best_distance = distance;
            }
        }
        Ok(best)
    }
}

impl fmt::Display for SnapPointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, point) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{point}")?;
        }
        write!(f, "]")
    }
}
