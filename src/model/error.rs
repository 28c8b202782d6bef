//! Error types for the sheet engine.
//!
//! This module defines the error taxonomy using `thiserror`. Only a small set
//! of conditions are errors at all; most irregular situations are handled
//! internally and never surface to the host.
//!
//! # Taxonomy
//!
//! - [`SheetError`] - Fatal configuration errors. Never retried. Returned from
//!   every engine entry point and terminate the sheet instance.
//! - [`InvalidHeight`] - A height that cannot be a snap point (NaN).
//! - [`CollaboratorError`] - A collaborator (focus trap, scroll lock, aria
//!   hider) failed. Logged and ignored: availability wins over strict a11y
//!   sequencing.
//! - [`Diagnostic`] - Not an error. A developer-facing report for an invalid
//!   imperative call that was turned into a no-op.
//!
//! Soft timeouts and stale completions are not represented here at all. A soft
//! timeout is a policy decision to proceed; a stale completion is silently
//! discarded.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Fatal configuration error.
///
/// Propagates to the host and is expected to terminate the sheet instance. No
/// partial visual state is preserved after one of these.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SheetError {
    /// The snap-point policy returned an empty list.
    ///
    /// An empty list has no meaningful default: silently picking `[0]` would
    /// make the sheet unopenable with no indication why.
    #[error("Snap point policy returned an empty list")]
    EmptySnapPoints,

    /// A computed height resolved to NaN.
    #[error("Height for {what} resolved to NaN")]
    NotANumber {
        /// Which value was being computed (e.g. "snap point", "initial snap point").
        what: &'static str,
    },

    /// Content dimensions were still unknown when the safety timeout expired
    /// during the initial open.
    #[error("Content dimensions still unknown after {waited:?}")]
    DimensionsUnavailable {
        /// How long the engine waited for a measurement.
        waited: Duration,
    },

    /// The sheet already failed with a fatal error and accepts no more input.
    #[error("Sheet was terminated by an earlier fatal error")]
    Terminated,
}

impl SheetError {
    /// Whether this error is the terminal marker rather than an original cause.
    pub fn is_terminated(&self) -> bool {
        matches!(self, SheetError::Terminated)
    }
}

/// Error returned when constructing a snap point from NaN.
///
/// # Examples
///
/// ```
/// use snapsheet::model::SnapPoint;
///
/// assert!(SnapPoint::new(f64::NAN, 600.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Snap point height must be a number (got {0})")]
pub struct InvalidHeight(pub f64);

impl From<InvalidHeight> for SheetError {
    fn from(_: InvalidHeight) -> Self {
        SheetError::NotANumber { what: "snap point" }
    }
}

/// Failure reported by a collaborator primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{primitive} failed: {reason}")]
pub struct CollaboratorError {
    /// Which primitive failed ("focus trap", "scroll lock", "aria hider").
    pub primitive: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl CollaboratorError {
    /// Create a new collaborator error.
    pub fn new(primitive: &'static str, reason: impl Into<String>) -> Self {
        Self {
            primitive,
            reason: reason.into(),
        }
    }
}

/// Developer-facing report of an invalid imperative call.
///
/// The offending call is a no-op. Diagnostics are delivered to the lifecycle
/// observer and logged at `warn` level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Diagnostic {
    /// A snap was requested while the sheet was closed or closing.
    #[error("snap requested while the sheet is not open")]
    SnapWhileInactive,

    /// A snap was requested while the user was dragging.
    #[error("snap requested during an active drag")]
    SnapWhileDragging,

    /// A snap target did not resolve to a number.
    #[error("snap target did not resolve to a number")]
    NonNumericSnapTarget,

    /// A drag frame arrived while the sheet was not interactive.
    #[error("drag received while the sheet is not interactive")]
    DragWhileInactive,

    /// A move or end frame arrived without a preceding start frame.
    #[error("drag frame received without an active drag session")]
    DragWithoutSession,

    /// A content-region drag arrived while content dragging is disabled.
    #[error("content drag received while expand_on_content_drag is disabled")]
    ContentDragDisabled,
}
