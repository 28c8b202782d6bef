//! Drag gesture interpretation.
//!
//! Turns a drag's live movement into a displayed height while the pointer is
//! down, and into a settle decision (dismiss, cancel, or snap target) when it
//! is released. Pure: the session is the only state and the caller owns it.

use super::rubber_band::{rubber_band_if_out_of_bounds, DEFAULT_CONSTANT};
use super::session::{DragDirection, DragFrame, DragPhase, DragSession};
use crate::model::{SheetError, SnapPointSet};
use crate::snap::nearest;
use tracing::debug;

/// Tunable gesture constants.
///
/// The numbers are feel-tuned starting points rather than derived values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Whether a downward fling past half the lowest snap point dismisses.
    pub dismissible: bool,
    /// Whether drags that start on the content region move the sheet.
    pub expand_on_content_drag: bool,
    /// Multiplier on `delta * velocity` when predicting the settle height.
    pub prediction_factor: f64,
    /// Rubber-band resistance constant.
    pub rubber_band_constant: f64,
    /// Movement at or below this on release counts as a tap.
    pub tap_threshold: f64,
    /// Release velocities at or below this are negligible.
    pub velocity_threshold: f64,
    /// Velocity handed to the animator when the release velocity is negligible.
    pub velocity_floor: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            dismissible: true,
            expand_on_content_drag: false,
            prediction_factor: 2.0,
            rubber_band_constant: DEFAULT_CONSTANT,
            tap_threshold: 3.0,
            velocity_threshold: 0.05,
            velocity_floor: 1.0,
        }
    }
}

/// Result of interpreting one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    /// Height to display (while down) or to settle at (on release).
    pub target_height: f64,
    /// Release should dismiss the sheet instead of snapping.
    pub should_dismiss: bool,
    /// Release was a tap or micro-drag; nothing should settle.
    pub should_cancel: bool,
    /// Velocity to hand the animator when settling.
    pub velocity: f64,
}

impl DragOutcome {
    fn follow(height: f64) -> Self {
        Self {
            target_height: height,
            should_dismiss: false,
            should_cancel: false,
            velocity: 0.0,
        }
    }
}

/// Stateless interpreter parameterized by [`GestureConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureInterpreter {
    config: GestureConfig,
}

impl GestureInterpreter {
    /// Interpreter with the given constants.
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    /// The constants in use.
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Start a session anchored at the height under the finger.
    pub fn begin(&self, current_height: f64, from_content: bool) -> DragSession {
        DragSession::new(current_height.max(0.0), from_content)
    }

    /// Interpret one frame against the current snap points.
    ///
    /// # Errors
    /// [`SheetError::NotANumber`] if the settle target resolves to NaN.
    pub fn on_drag_frame(
        &self,
        session: &mut DragSession,
        frame: &DragFrame,
        snap_points: &SnapPointSet,
    ) -> Result<DragOutcome, SheetError> {
        session.delta = if frame.delta.is_finite() { frame.delta } else { 0.0 };
        session.velocity = if frame.velocity.is_finite() {
            frame.velocity.abs()
        } else {
            0.0
        };

        let min_snap = snap_points.min().height();
        let max_snap = snap_points.max().height();
        let raw = session.raw_height();
        let predicted_distance = session.delta * session.velocity;
        let predicted = (raw + predicted_distance * self.config.prediction_factor)
            .clamp(min_snap, max_snap);

        let dismiss_reached = self.config.dismissible
            && frame.direction == DragDirection::Down
            && raw + predicted_distance < min_snap / 2.0;
        session.will_dismiss = dismiss_reached;

        if frame.phase != DragPhase::End {
            return Ok(DragOutcome::follow(self.displayed_height(session, min_snap, max_snap)));
        }

        if dismiss_reached {
            debug!(raw, predicted_distance, min_snap, "Drag released past dismiss threshold");
            return Ok(DragOutcome {
                target_height: 0.0,
                should_dismiss: true,
                should_cancel: false,
                velocity: session.velocity,
            });
        }

        let is_tap = frame.tap || session.delta.abs() <= self.config.tap_threshold;
        if is_tap {
            let dismiss = frame.close_on_tap && self.config.dismissible;
            debug!(dismiss, "Drag released as tap");
            return Ok(DragOutcome {
                target_height: session.memo,
                should_dismiss: dismiss,
                should_cancel: !dismiss,
                velocity: 0.0,
            });
        }

        let snapped = nearest(snap_points, predicted)?;
        let velocity = if session.velocity > self.config.velocity_threshold {
            session.velocity
        } else {
            self.config.velocity_floor
        };
        debug!(raw, predicted, snapped = snapped.get(), velocity, "Drag released");
        Ok(DragOutcome {
            target_height: snapped.height(),
            should_dismiss: false,
            should_cancel: false,
            velocity,
        })
    }

    /// Height shown under the finger while the pointer is down.
    fn displayed_height(&self, session: &DragSession, min_snap: f64, max_snap: f64) -> f64 {
        let raw = session.raw_height();
        let constant = self.config.rubber_band_constant;

        if session.from_content && raw >= max_snap {
            // Content drags stop at the top so the content region can scroll
            return max_snap;
        }

        let height = if self.config.dismissible {
            rubber_band_if_out_of_bounds(raw, 0.0, max_snap, constant)
        } else if min_snap == max_snap {
            // A single snap point has no neighbor; borrow one on each side
            if raw < min_snap {
                rubber_band_if_out_of_bounds(raw, min_snap, max_snap * 2.0, constant)
            } else {
                rubber_band_if_out_of_bounds(raw, min_snap / 2.0, max_snap, constant)
            }
        } else {
            rubber_band_if_out_of_bounds(raw, min_snap, max_snap, constant)
        };
        height.max(0.0)
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
