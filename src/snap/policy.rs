//! Snap-point policy capability.
//!
//! The host decides where the sheet may rest through a [`SnapPolicy`]. Both
//! methods must be pure: the engine calls them fresh on every relevant
//! dimension or state change and never caches a result across changes.
//!
//! # Context freshness
//! Every field of [`SnapContext`] is read from the dimension snapshot that is
//! current at call time. `current_height` is the last height committed to the
//! animator (the target, not the in-flight animated value).

use crate::model::{DimensionSnapshot, SnapPointSet};
use std::fmt;

/// Dimensions handed to [`SnapPolicy::snap_points`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapContext {
    /// Height of the viewport.
    pub viewport_height: f64,
    /// Tallest the sheet may be.
    pub max_height: f64,
    /// Header region height.
    pub header_height: f64,
    /// Footer region height.
    pub footer_height: f64,
    /// Content region height.
    pub content_height: f64,
    /// Header plus footer.
    pub min_content: f64,
    /// Header plus content plus footer, capped at `max_height`.
    pub max_content: f64,
    /// Last committed target height (0 when nothing has been committed).
    pub current_height: f64,
}

impl SnapContext {
    /// Build the context from a snapshot and the committed height.
    pub fn from_snapshot(snapshot: &DimensionSnapshot, current_height: f64) -> Self {
        Self {
            viewport_height: snapshot.viewport_height,
            max_height: snapshot.max_height,
            header_height: snapshot.header_height,
            footer_height: snapshot.footer_height,
            content_height: snapshot.content_height,
            min_content: snapshot.min_content(),
            max_content: snapshot.max_content(),
            current_height,
        }
    }
}

/// Context handed to [`SnapPolicy::initial_snap_point`] and to
/// function-valued snap requests: the dimensions plus the resolved set.
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    /// Current dimensions.
    pub dimensions: SnapContext,
    /// Snap points resolved from the same dimensions.
    pub snap_points: &'a SnapPointSet,
    /// Height the sheet last settled at, remembered across close/reopen.
    pub last_snap: Option<f64>,
}

/// Raw policy result before rounding, clamping, and deduplication.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutput {
    /// A single height.
    Single(f64),
    /// Several heights in any order.
    Many(Vec<f64>),
}

impl PolicyOutput {
    /// Coerce to a list.
    pub fn into_vec(self) -> Vec<f64> {
        match self {
            PolicyOutput::Single(height) => vec![height],
            PolicyOutput::Many(heights) => heights,
        }
    }
}

impl From<f64> for PolicyOutput {
    fn from(height: f64) -> Self {
        PolicyOutput::Single(height)
    }
}

impl From<Vec<f64>> for PolicyOutput {
    fn from(heights: Vec<f64>) -> Self {
        PolicyOutput::Many(heights)
    }
}

impl<const N: usize> From<[f64; N]> for PolicyOutput {
    fn from(heights: [f64; N]) -> Self {
        PolicyOutput::Many(heights.to_vec())
    }
}

/// Host-supplied snap-point policy.
pub trait SnapPolicy {
    /// Heights the sheet may rest at for the given dimensions.
    fn snap_points(&self, ctx: &SnapContext) -> PolicyOutput;

    /// Height to open at. The result is snapped to the nearest resolved point.
    fn initial_snap_point(&self, ctx: &SelectionContext<'_>) -> f64;
}

/// Fits the content, and reopens where the sheet last rested.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitContent;

impl SnapPolicy for FitContent {
    fn snap_points(&self, ctx: &SnapContext) -> PolicyOutput {
        PolicyOutput::Single(ctx.max_content)
    }

    fn initial_snap_point(&self, ctx: &SelectionContext<'_>) -> f64 {
        ctx.last_snap
            .unwrap_or_else(|| ctx.snap_points.min().height())
    }
}

/// Policy built from a pair of closures.
pub struct FnPolicy<S, I> {
    snap_points: S,
    initial: I,
}

impl<S, I> FnPolicy<S, I> {
    /// Wrap the two closures.
    pub fn new(snap_points: S, initial: I) -> Self
    where
        S: Fn(&SnapContext) -> PolicyOutput,
        I: Fn(&SelectionContext<'_>) -> f64,
    {
        Self {
            snap_points,
            initial,
        }
    }
}

impl<S, I> SnapPolicy for FnPolicy<S, I>
where
    S: Fn(&SnapContext) -> PolicyOutput,
    I: Fn(&SelectionContext<'_>) -> f64,
{
    fn snap_points(&self, ctx: &SnapContext) -> PolicyOutput {
        (self.snap_points)(ctx)
    }

    fn initial_snap_point(&self, ctx: &SelectionContext<'_>) -> f64 {
        (self.initial)(ctx)
    }
}

impl<S, I> fmt::Debug for FnPolicy<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPolicy").finish_non_exhaustive()
    }
}

/// Fixed list of heights; opens at the last snap or the smallest point.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPolicy {
    heights: Vec<f64>,
    initial: Option<f64>,
}

impl FixedPolicy {
    /// Rest only at `heights`.
    pub fn new(heights: impl Into<Vec<f64>>) -> Self {
        Self {
            heights: heights.into(),
            initial: None,
        }
    }

    /// Always open at `height` instead of the last snap.
    pub fn with_initial(mut self, height: f64) -> Self {
        self.initial = Some(height);
        self
    }
}

impl SnapPolicy for FixedPolicy {
    fn snap_points(&self, _ctx: &SnapContext) -> PolicyOutput {
        PolicyOutput::Many(self.heights.clone())
    }

    fn initial_snap_point(&self, ctx: &SelectionContext<'_>) -> f64 {
        self.initial
            .or(ctx.last_snap)
            .unwrap_or_else(|| ctx.snap_points.min().height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_derives_content_bounds() {
        let snapshot = DimensionSnapshot::new(600.0, 40.0, 200.0, 60.0);
        let ctx = SnapContext::from_snapshot(&snapshot, 120.0);
        assert_eq!(ctx.min_content, 100.0);
        assert_eq!(ctx.max_content, 300.0);
        assert_eq!(ctx.current_height, 120.0);
    }

    #[test]
    fn fit_content_opens_at_last_snap_when_known() {
        let set = SnapPointSet::fallback();
        let ctx = SelectionContext {
            dimensions: SnapContext::from_snapshot(&DimensionSnapshot::default(), 0.0),
            snap_points: &set,
            last_snap: Some(250.0),
        };
        assert_eq!(FitContent.initial_snap_point(&ctx), 250.0);
    }

    #[test]
    fn scalar_output_coerces_to_single_element() {
        assert_eq!(PolicyOutput::from(300.0).into_vec(), vec![300.0]);
        assert_eq!(PolicyOutput::from([1.0, 2.0]).into_vec(), vec![1.0, 2.0]);
    }
}
