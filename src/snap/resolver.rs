//! Snap-point resolution.
//!
//! Pure functions: dimension snapshot + policy -> [`SnapPointSet`], and
//! nearest-point lookup. Nothing here holds state; the coordinator calls
//! [`resolve`] on every dimension change.

use super::policy::{SelectionContext, SnapContext, SnapPolicy};
use crate::model::{DimensionSnapshot, SheetError, SnapPoint, SnapPointSet};
use std::fmt;
use tracing::{debug, error};

/// Resolve the policy into a sorted, deduplicated, clamped snap-point set.
///
/// Before the content region has been measured the policy is not called and
/// the result is `[0]`.
///
/// # Errors
/// - [`SheetError::EmptySnapPoints`] if the policy returns an empty list
/// - [`SheetError::NotANumber`] if any returned height is NaN
pub fn resolve(
    snapshot: &DimensionSnapshot,
    current_height: f64,
    policy: &dyn SnapPolicy,
) -> Result<SnapPointSet, SheetError> {
    if !snapshot.is_measured() {
        debug!("Content not measured yet, resolving to fallback snap set");
        return Ok(SnapPointSet::fallback());
    }

    let ctx = SnapContext::from_snapshot(snapshot, current_height);
    let raw = policy.snap_points(&ctx).into_vec();
    if raw.is_empty() {
        error!(?ctx, "Snap point policy returned an empty list");
        return Err(SheetError::EmptySnapPoints);
    }

    let points = raw
        .into_iter()
        .map(|height| SnapPoint::new(height, snapshot.max_height))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            error!(?ctx, "Snap point policy returned NaN: {}", err);
            SheetError::NotANumber { what: "snap point" }
        })?;

    // Non-empty input guarantees Some
    SnapPointSet::from_points(points).ok_or(SheetError::EmptySnapPoints)
}

/// Nearest member of `snap_points` to `target`; exact ties go to the smaller point.
///
/// # Errors
/// [`SheetError::NotANumber`] if `target` is NaN.
pub fn nearest(snap_points: &SnapPointSet, target: f64) -> Result<SnapPoint, SheetError> {
    snap_points
        .nearest(target)
        .map_err(|_| SheetError::NotANumber { what: "snap target" })
}

/// Evaluate the policy's initial snap point and snap it onto the set.
///
/// # Errors
/// [`SheetError::NotANumber`] if the policy returns NaN.
pub fn initial_snap(
    snapshot: &DimensionSnapshot,
    snap_points: &SnapPointSet,
    last_snap: Option<SnapPoint>,
    current_height: f64,
    policy: &dyn SnapPolicy,
) -> Result<SnapPoint, SheetError> {
    let ctx = SelectionContext {
        dimensions: SnapContext::from_snapshot(snapshot, current_height),
        snap_points,
        last_snap: last_snap.map(|p| p.height()),
    };
    let requested = policy.initial_snap_point(&ctx);
    snap_points.nearest(requested).map_err(|_| {
        error!("Initial snap point policy returned NaN");
        SheetError::NotANumber {
            what: "initial snap point",
        }
    })
}

/// Closure form of a snap target, evaluated against the live context.
pub type SnapTargetFn = Box<dyn Fn(&SelectionContext<'_>) -> f64>;

/// Target of an imperative snap request.
pub enum SnapTarget {
    /// A literal height.
    Height(f64),
    /// A function of the current dimensions and snap points.
    Select(SnapTargetFn),
}

impl SnapTarget {
    /// Target computed by `f` at request time.
    pub fn select(f: impl Fn(&SelectionContext<'_>) -> f64 + 'static) -> Self {
        SnapTarget::Select(Box::new(f))
    }

    /// Evaluate to a raw height (not yet snapped).
    pub fn evaluate(&self, ctx: &SelectionContext<'_>) -> f64 {
        match self {
            SnapTarget::Height(height) => *height,
            SnapTarget::Select(f) => f(ctx),
        }
    }
}

impl From<f64> for SnapTarget {
    fn from(height: f64) -> Self {
        SnapTarget::Height(height)
    }
}

impl fmt::Debug for SnapTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapTarget::Height(height) => f.debug_tuple("Height").field(height).finish(),
            SnapTarget::Select(_) => f.write_str("Select(..)"),
        }
    }
}

/// Evaluate a snap request and snap it to the nearest point.
///
/// Returns `None` when the target does not resolve to a number; the caller
/// reports that as a diagnostic rather than an error.
pub fn find_snap(
    target: &SnapTarget,
    snapshot: &DimensionSnapshot,
    snap_points: &SnapPointSet,
    last_snap: Option<SnapPoint>,
    current_height: f64,
) -> Option<SnapPoint> {
    let ctx = SelectionContext {
        dimensions: SnapContext::from_snapshot(snapshot, current_height),
        snap_points,
        last_snap: last_snap.map(|p| p.height()),
    };
    snap_points.nearest(target.evaluate(&ctx)).ok()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
