//! Collaborator interfaces consumed by the engine.
//!
//! The engine never touches the platform directly. Everything it needs from
//! the outside world (animation, focus, scroll locking, accessibility hiding,
//! timers, resize observation, notifications) goes through these traits.
//!
//! # Completion protocol
//! Asynchronous collaborators receive a [`Ticket`] when a step starts and
//! report completion back through the matching `Sheet` method with the same
//! ticket (`activation_settled`, `deactivation_settled`, `focus_settled`,
//! `animation_rested`, `timer_fired`). A report for a ticket the engine is no
//! longer waiting on is discarded.

pub mod activation;

use crate::model::{
    CollaboratorError, Diagnostic, LifecycleEvent, ObservationId, Region, Ticket,
};
use std::time::Duration;

pub use activation::{ActivationSet, ActivationStart, RefCounted, SharedEffect};

/// How an animation to a target should run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Initial velocity (px/ms) handed to the integrator.
    pub velocity: f64,
    /// Jump straight to the target instead of animating.
    pub immediate: bool,
}

impl AnimationConfig {
    /// Smooth animation with the given initial velocity.
    pub fn smooth(velocity: f64) -> Self {
        Self {
            velocity,
            immediate: false,
        }
    }

    /// Jump to the target.
    pub fn immediate() -> Self {
        Self {
            velocity: 0.0,
            immediate: true,
        }
    }
}

/// Animates the sheet's height.
///
/// A new `animate_to` interrupts the previous one; the interrupted ticket
/// never needs to be reported.
pub trait Animator {
    /// Current displayed height.
    fn value(&self) -> f64;

    /// Set the height without animating. Interrupts any running animation.
    fn jump_to(&mut self, value: f64);

    /// Animate toward `target`. Report rest via `Sheet::animation_rested(ticket)`.
    fn animate_to(&mut self, ticket: Ticket, target: f64, config: AnimationConfig);

    /// Show or hide the sheet without changing its height.
    fn set_visible(&mut self, visible: bool);
}

/// Focus trapping. Activation and deactivation are asynchronous.
pub trait FocusTrap {
    /// Start trapping focus. Report via `Sheet::activation_settled(ticket, ..)`.
    ///
    /// # Errors
    /// A synchronous failure; the engine proceeds without waiting.
    fn activate(&mut self, ticket: Ticket) -> Result<(), CollaboratorError>;

    /// Stop trapping focus. Report via `Sheet::deactivation_settled(ticket)`.
    ///
    /// # Errors
    /// A synchronous failure; the engine proceeds without waiting.
    fn deactivate(&mut self, ticket: Ticket) -> Result<(), CollaboratorError>;

    /// Move focus to the initial element and report via
    /// `Sheet::focus_settled(ticket)` once focus-driven viewport changes (soft
    /// keyboards) have settled.
    fn autofocus(&mut self, ticket: Ticket);
}

/// A synchronous document-wide effect: body scroll lock or aria hiding.
pub trait DocumentEffect {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Apply the effect.
    ///
    /// # Errors
    /// The effect could not be applied. Logged, never fatal.
    fn activate(&mut self) -> Result<(), CollaboratorError>;

    /// Remove the effect.
    ///
    /// # Errors
    /// The effect could not be removed. Logged, never fatal.
    fn deactivate(&mut self) -> Result<(), CollaboratorError>;
}

/// One-shot timers used for safety timeouts.
pub trait Scheduler {
    /// Call `Sheet::timer_fired(ticket)` after `after` has elapsed.
    fn schedule(&mut self, ticket: Ticket, after: Duration);
}

/// Resize observation of the sheet's regions.
pub trait ResizeSource {
    /// Begin observing `region`. Measurements arrive through
    /// `Sheet::region_resized`.
    fn observe(&mut self, region: Region) -> ObservationId;

    /// Stop observing.
    fn unobserve(&mut self, id: ObservationId);
}

/// Whether the engine may proceed past a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    /// Continue immediately.
    #[default]
    Proceed,
    /// Wait for `Sheet::release(operation)` before executing the rest of the batch.
    Hold,
}

/// Receives lifecycle notifications, dismissals and diagnostics.
pub trait LifecycleObserver {
    /// A transition started, was cancelled, or ended.
    fn on_transition(&mut self, _event: &LifecycleEvent) -> Gate {
        Gate::Proceed
    }

    /// The user dismissed the sheet by drag or tap.
    fn on_dismiss(&mut self) {}

    /// An imperative call was invalid and ignored.
    fn on_diagnostic(&mut self, _diagnostic: &Diagnostic) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {}

/// Document effect that does nothing, for hosts without one of the primitives.
#[derive(Debug, Clone, Copy)]
pub struct NoopEffect(pub &'static str);

impl DocumentEffect for NoopEffect {
    fn name(&self) -> &'static str {
        self.0
    }

    fn activate(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }
}
