//! Transition modes of the sheet.
//!
//! A tagged union: the parent state is the outer variant and substates only
//! exist inside their parent. Exactly one leaf is active at a time because a
//! value of this type can only ever be one leaf.

use serde::Serialize;
use std::fmt;

/// Substates of [`TransitionMode::Opening`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpeningStep {
    /// Activation side effects (focus trap, scroll lock, aria hiding) are running.
    Preparing,
    /// Rendered invisibly at the target height while focus-driven viewport changes settle.
    Autofocusing,
    /// Animating from zero to the initial snap point.
    Animating,
}

/// Substates of [`TransitionMode::Open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpenStep {
    /// Resting, no transition in flight.
    Idle,
    /// The user is dragging; resize and snap intake is suspended.
    Dragging,
    /// Animating to the nearest valid point after a dimension change.
    Resizing,
    /// Animating to an explicitly requested height.
    Snapping,
}

/// Substates of [`TransitionMode::Closing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClosingStep {
    /// Deactivation side effects are running.
    Preparing,
    /// Animating from the current height to zero.
    Animating,
}

/// Current leaf state of the transition machine.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransitionMode {
    /// Not shown. Initial state.
    #[default]
    Closed,
    /// Becoming visible.
    Opening(OpeningStep),
    /// Visible.
    Open(OpenStep),
    /// Becoming hidden.
    Closing(ClosingStep),
}

impl TransitionMode {
    /// Every leaf mode, for exhaustive table checks.
    pub const ALL: [TransitionMode; 10] = [
        TransitionMode::Closed,
        TransitionMode::Opening(OpeningStep::Preparing),
        TransitionMode::Opening(OpeningStep::Autofocusing),
        TransitionMode::Opening(OpeningStep::Animating),
        TransitionMode::Open(OpenStep::Idle),
        TransitionMode::Open(OpenStep::Dragging),
        TransitionMode::Open(OpenStep::Resizing),
        TransitionMode::Open(OpenStep::Snapping),
        TransitionMode::Closing(ClosingStep::Preparing),
        TransitionMode::Closing(ClosingStep::Animating),
    ];

    /// Whether the sheet is in any `Open` substate.
    pub fn is_open(&self) -> bool {
        matches!(self, TransitionMode::Open(_))
    }

    /// Whether the sheet is `Closed` or in any `Closing` substate.
    pub fn is_closed_or_closing(&self) -> bool {
        matches!(self, TransitionMode::Closed | TransitionMode::Closing(_))
    }

    /// Whether the sheet should be painted.
    ///
    /// The sheet exists in the tree during `Opening.Autofocusing` but is
    /// visually hidden there.
    pub fn is_visible(&self) -> bool {
        match self {
            TransitionMode::Closed => false,
            TransitionMode::Opening(OpeningStep::Preparing | OpeningStep::Autofocusing) => false,
            TransitionMode::Opening(OpeningStep::Animating) => true,
            TransitionMode::Open(_) => true,
            TransitionMode::Closing(_) => true,
        }
    }

    /// Whether dimension-driven snap recomputation may be committed to the animator.
    pub fn commits_resize(&self) -> bool {
        matches!(
            self,
            TransitionMode::Open(OpenStep::Idle | OpenStep::Resizing | OpenStep::Snapping)
        )
    }
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionMode::Closed => write!(f, "Closed"),
            TransitionMode::Opening(step) => write!(f, "Opening.{step:?}"),
            TransitionMode::Open(step) => write!(f, "Open.{step:?}"),
            TransitionMode::Closing(step) => write!(f, "Closing.{step:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_closed() {
        assert_eq!(TransitionMode::default(), TransitionMode::Closed);
    }

    #[test]
    fn display_uses_dotted_path() {
        assert_eq!(
            TransitionMode::Opening(OpeningStep::Autofocusing).to_string(),
            "Opening.Autofocusing"
        );
        assert_eq!(TransitionMode::Closed.to_string(), "Closed");
    }

    #[test]
    fn only_three_open_substates_commit_resizes() {
        let committing: Vec<_> = TransitionMode::ALL
            .iter()
            .filter(|m| m.commits_resize())
            .collect();
        assert_eq!(committing.len(), 3);
        assert!(!TransitionMode::Open(OpenStep::Dragging).commits_resize());
    }

    #[test]
    fn hidden_while_preparing_and_autofocusing() {
        assert!(!TransitionMode::Opening(OpeningStep::Preparing).is_visible());
        assert!(!TransitionMode::Opening(OpeningStep::Autofocusing).is_visible());
        assert!(TransitionMode::Opening(OpeningStep::Animating).is_visible());
        assert!(TransitionMode::Closing(ClosingStep::Animating).is_visible());
    }
}
