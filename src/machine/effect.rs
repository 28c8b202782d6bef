//! Outbound effects.
//!
//! The machine never calls a collaborator. It returns effects in the order
//! they must be executed, and the sheet runs them against its ports.

use crate::model::{Diagnostic, LifecycleEvent, Ticket};
use crate::ports::AnimationConfig;
use std::time::Duration;

/// One instruction for the sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver a lifecycle notification.
    Notify(LifecycleEvent),
    /// Switch the activation set on. Completion arrives as `ActivationSettled`.
    Activate {
        /// Completion ticket.
        ticket: Ticket,
    },
    /// Switch the activation set off. Completion arrives as `DeactivationSettled`.
    Deactivate {
        /// Completion ticket.
        ticket: Ticket,
    },
    /// Render invisibly at `height` so the focus trap can focus into it.
    RenderHidden {
        /// Height to render at.
        height: f64,
    },
    /// Autofocus. Completion arrives as `FocusSettled`.
    AwaitFocus {
        /// Completion ticket.
        ticket: Ticket,
    },
    /// Start a safety timeout.
    ScheduleTimeout {
        /// Ticket of the step being guarded.
        ticket: Ticket,
        /// Delay before `TimerFired`.
        after: Duration,
    },
    /// Set the height without animating.
    Jump {
        /// New height.
        height: f64,
    },
    /// Animate the height. Rest arrives as `AnimationRested`.
    Animate {
        /// Completion ticket.
        ticket: Ticket,
        /// Target height.
        target: f64,
        /// Velocity and immediacy.
        config: AnimationConfig,
    },
    /// Show or hide the sheet.
    SetVisible(bool),
    /// Start observing the sheet regions.
    ObserveRegions,
    /// Stop observing the sheet regions.
    UnobserveRegions,
    /// The user dismissed the sheet.
    Dismiss,
    /// Report an ignored call.
    Diagnostic(Diagnostic),
}

impl Effect {
    /// The lifecycle event carried by a `Notify`.
    pub fn as_event(&self) -> Option<&LifecycleEvent> {
        match self {
            Effect::Notify(event) => Some(event),
            _ => None,
        }
    }
}
