//! Inbound triggers.

use crate::gesture::{DragFrame, DragPhase};
use crate::model::{CollaboratorError, DimensionSnapshot, Ticket, TransitionSource};
use crate::snap::SnapTarget;
use serde::Serialize;
use std::fmt;

/// Everything that can move the machine.
#[derive(Debug)]
pub enum Trigger {
    /// Show the sheet.
    Open {
        /// Who asked.
        source: TransitionSource,
    },
    /// Hide the sheet.
    Close {
        /// Who asked.
        source: TransitionSource,
    },
    /// One pointer frame.
    Drag {
        /// The frame.
        frame: DragFrame,
        /// Height displayed when the frame arrived.
        current_height: f64,
    },
    /// Imperative snap request.
    Snap {
        /// Height or selector.
        target: SnapTarget,
        /// Initial velocity for the animation (px/ms).
        velocity: f64,
        /// Who asked.
        source: TransitionSource,
    },
    /// A coalesced dimension change.
    Dimensions {
        /// Dimensions after the change.
        snapshot: DimensionSnapshot,
        /// What changed.
        source: TransitionSource,
    },
    /// The focus trap finished activating.
    ActivationSettled {
        /// Ticket handed out with `Effect::Activate`.
        ticket: Ticket,
        /// Failure is logged, never fatal.
        result: Result<(), CollaboratorError>,
    },
    /// The focus trap finished deactivating.
    DeactivationSettled {
        /// Ticket handed out with `Effect::Deactivate`.
        ticket: Ticket,
    },
    /// Autofocus finished and the viewport settled.
    FocusSettled {
        /// Ticket handed out with `Effect::AwaitFocus`.
        ticket: Ticket,
    },
    /// An animation came to rest.
    AnimationRested {
        /// Ticket handed out with `Effect::Animate`.
        ticket: Ticket,
    },
    /// A safety timeout expired.
    TimerFired {
        /// Ticket handed out with `Effect::ScheduleTimeout`.
        ticket: Ticket,
    },
}

impl Trigger {
    /// Payload-free classification used for routing.
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Open { .. } => TriggerKind::Open,
            Trigger::Close { .. } => TriggerKind::Close,
            Trigger::Drag { frame, .. } => match frame.phase {
                DragPhase::Start => TriggerKind::DragStart,
                DragPhase::Move => TriggerKind::DragMove,
                DragPhase::End => TriggerKind::DragEnd,
            },
            Trigger::Snap { .. } => TriggerKind::Snap,
            Trigger::Dimensions { .. } => TriggerKind::Dimensions,
            Trigger::ActivationSettled { .. } => TriggerKind::ActivationSettled,
            Trigger::DeactivationSettled { .. } => TriggerKind::DeactivationSettled,
            Trigger::FocusSettled { .. } => TriggerKind::FocusSettled,
            Trigger::AnimationRested { .. } => TriggerKind::AnimationRested,
            Trigger::TimerFired { .. } => TriggerKind::TimerFired,
        }
    }
}

/// Trigger classification: the column of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum TriggerKind {
    Open,
    Close,
    DragStart,
    DragMove,
    DragEnd,
    Snap,
    Dimensions,
    ActivationSettled,
    DeactivationSettled,
    FocusSettled,
    AnimationRested,
    TimerFired,
}

impl TriggerKind {
    /// Every kind, for exhaustive table checks.
    pub const ALL: [TriggerKind; 12] = [
        TriggerKind::Open,
        TriggerKind::Close,
        TriggerKind::DragStart,
        TriggerKind::DragMove,
        TriggerKind::DragEnd,
        TriggerKind::Snap,
        TriggerKind::Dimensions,
        TriggerKind::ActivationSettled,
        TriggerKind::DeactivationSettled,
        TriggerKind::FocusSettled,
        TriggerKind::AnimationRested,
        TriggerKind::TimerFired,
    ];

    /// Whether this kind reports completion of an earlier effect.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            TriggerKind::ActivationSettled
                | TriggerKind::DeactivationSettled
                | TriggerKind::FocusSettled
                | TriggerKind::AnimationRested
                | TriggerKind::TimerFired
        )
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerKind::Open => "OPEN",
            TriggerKind::Close => "CLOSE",
            TriggerKind::DragStart => "DRAG_START",
            TriggerKind::DragMove => "DRAG_MOVE",
            TriggerKind::DragEnd => "DRAG_END",
            TriggerKind::Snap => "SNAP",
            TriggerKind::Dimensions => "DIMENSIONS",
            TriggerKind::ActivationSettled => "ACTIVATION_SETTLED",
            TriggerKind::DeactivationSettled => "DEACTIVATION_SETTLED",
            TriggerKind::FocusSettled => "FOCUS_SETTLED",
            TriggerKind::AnimationRested => "ANIMATION_RESTED",
            TriggerKind::TimerFired => "TIMER_FIRED",
        };
        f.write_str(s)
    }
}
