//! The host-facing sheet engine.
//!
//! [`Sheet`] feeds inbound calls to the [`TransitionMachine`] and executes the
//! returned effects against the collaborator ports. It is the impure shell
//! around the pure machine.
//!
//! # Notification holds
//! A [`LifecycleObserver`] may answer a notification with [`Gate::Hold`]. The
//! rest of that effect batch is queued until [`Sheet::release`] is called with
//! the held operation. Any other inbound call first flushes the queue, so a
//! hold can delay effects but never reorder or drop them.

use crate::dimensions::DimensionTracker;
use crate::gesture::DragFrame;
use crate::machine::{Effect, MachineConfig, TransitionMachine, Trigger};
use crate::model::{
    CollaboratorError, OperationId, Region, SheetError, SnapPoint, SnapPointSet, Ticket,
    TransitionMode, TransitionSource,
};
use crate::ports::{
    ActivationSet, ActivationStart, Animator, Gate, LifecycleObserver, ResizeSource, Scheduler,
};
use crate::snap::{SnapPolicy, SnapTarget};
use std::collections::VecDeque;
use tracing::{debug, info};

/// The collaborators a sheet drives.
pub struct Ports {
    /// Height animation.
    pub animator: Box<dyn Animator>,
    /// Focus trap, scroll lock and aria hiding.
    pub activation: ActivationSet,
    /// Safety timeouts.
    pub scheduler: Box<dyn Scheduler>,
    /// Region resize observation.
    pub resize_source: Box<dyn ResizeSource>,
    /// Lifecycle notifications.
    pub observer: Box<dyn LifecycleObserver>,
}

/// Initial layout known when the sheet is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Height of the viewport.
    pub height: f64,
    /// Controlled max height, if any.
    pub max_height: Option<f64>,
}

struct Hold {
    operation: OperationId,
    queued: VecDeque<Effect>,
}

/// A bottom sheet.
pub struct Sheet {
    machine: TransitionMachine,
    tracker: DimensionTracker,
    ports: Ports,
    inbox: VecDeque<Trigger>,
    hold: Option<Hold>,
    destroyed: bool,
}

impl Sheet {
    /// Closed sheet.
    pub fn new(
        config: MachineConfig,
        policy: Box<dyn SnapPolicy>,
        viewport: Viewport,
        ports: Ports,
    ) -> Self {
        let tracker = DimensionTracker::new(viewport.height, viewport.max_height);
        info!(
            viewport = viewport.height,
            max_height = ?viewport.max_height,
            reduced_motion = config.reduced_motion,
            "Sheet created"
        );
        Self {
            machine: TransitionMachine::new(config, policy, tracker.snapshot()),
            tracker,
            ports,
            inbox: VecDeque::new(),
            hold: None,
            destroyed: false,
        }
    }

    // ===== Queries =====

    /// Current leaf mode.
    pub fn mode(&self) -> TransitionMode {
        self.machine.mode()
    }

    /// Height the animator currently displays.
    pub fn current_height(&self) -> f64 {
        self.ports.animator.value()
    }

    /// Latest resolved snap points.
    pub fn snap_points(&self) -> &SnapPointSet {
        self.machine.snap_points()
    }

    /// Snap point of the last settled open, snap or resize.
    pub fn last_snap(&self) -> Option<SnapPoint> {
        self.machine.last_snap()
    }

    /// Operation currently held by the observer, if any.
    pub fn held_operation(&self) -> Option<OperationId> {
        self.hold.as_ref().map(|hold| hold.operation)
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ===== Imperative API =====

    /// Show the sheet.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn open(&mut self, source: TransitionSource) -> Result<(), SheetError> {
        self.dispatch(Trigger::Open { source })
    }

    /// Hide the sheet.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn close(&mut self, source: TransitionSource) -> Result<(), SheetError> {
        self.dispatch(Trigger::Close { source })
    }

    /// Animate to the snap point nearest `target`.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn request_snap(
        &mut self,
        target: SnapTarget,
        velocity: f64,
        source: TransitionSource,
    ) -> Result<(), SheetError> {
        self.dispatch(Trigger::Snap {
            target,
            velocity,
            source,
        })
    }

    /// Shorthand for [`request_snap`](Self::request_snap) with a literal height.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn snap_to(&mut self, height: f64, source: TransitionSource) -> Result<(), SheetError> {
        self.request_snap(SnapTarget::Height(height), 0.0, source)
    }

    /// One pointer frame from the gesture library.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn drag_frame(&mut self, frame: DragFrame) -> Result<(), SheetError> {
        let current_height = self.current_height();
        self.dispatch(Trigger::Drag {
            frame,
            current_height,
        })
    }

    // ===== Dimensions =====

    /// A region's border-box height changed. Applied on the next frame.
    pub fn region_resized(&mut self, region: Region, height: f64) {
        if !self.destroyed {
            self.tracker.record(region, height);
        }
    }

    /// The viewport height changed. Applied on the next frame.
    pub fn viewport_resized(&mut self, height: f64) {
        if !self.destroyed {
            self.tracker.viewport_resized(height);
        }
    }

    /// Set or clear the controlled max height. Applied on the next frame.
    pub fn set_max_height(&mut self, max_height: Option<f64>) {
        if !self.destroyed {
            self.tracker.set_max_height(max_height);
        }
    }

    /// Frame boundary: hands the machine the coalesced dimension change, if any.
    ///
    /// # Errors
    /// A fatal [`SheetError`] from snap-point resolution.
    pub fn animation_frame(&mut self) -> Result<(), SheetError> {
        if self.destroyed {
            return Ok(());
        }
        match self.tracker.on_frame() {
            Some((snapshot, source)) => self.dispatch(Trigger::Dimensions { snapshot, source }),
            None => Ok(()),
        }
    }

    // ===== Completions =====

    /// The focus trap finished activating.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn activation_settled(
        &mut self,
        ticket: Ticket,
        result: Result<(), CollaboratorError>,
    ) -> Result<(), SheetError> {
        self.dispatch(Trigger::ActivationSettled { ticket, result })
    }

    /// The focus trap finished deactivating.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn deactivation_settled(&mut self, ticket: Ticket) -> Result<(), SheetError> {
        self.dispatch(Trigger::DeactivationSettled { ticket })
    }

    /// Autofocus finished and the viewport settled.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn focus_settled(&mut self, ticket: Ticket) -> Result<(), SheetError> {
        self.dispatch(Trigger::FocusSettled { ticket })
    }

    /// An animation came to rest.
    ///
    /// # Errors
    /// A fatal [`SheetError`]; the sheet is terminated afterwards.
    pub fn animation_rested(&mut self, ticket: Ticket) -> Result<(), SheetError> {
        self.dispatch(Trigger::AnimationRested { ticket })
    }

    /// A safety timeout expired.
    ///
    /// # Errors
    /// [`SheetError::DimensionsUnavailable`] if content was never measured.
    pub fn timer_fired(&mut self, ticket: Ticket) -> Result<(), SheetError> {
        self.dispatch(Trigger::TimerFired { ticket })
    }

    /// Let a held notification proceed.
    ///
    /// # Errors
    /// A fatal [`SheetError`] raised by a follow-up completion.
    pub fn release(&mut self, operation: OperationId) -> Result<(), SheetError> {
        if self.destroyed {
            return Ok(());
        }
        match self.hold.take() {
            Some(hold) if hold.operation == operation => {
                debug!(%operation, queued = hold.queued.len(), "Releasing held effects");
                self.execute(hold.queued, false);
                self.pump(false)
            }
            other => {
                debug!(%operation, "Release for an operation that is not held");
                self.hold = other;
                Ok(())
            }
        }
    }

    /// Tear the sheet down. Queued effects are dropped, activation is released
    /// without waiting and observation stops. Every later call is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.hold = None;
        self.inbox.clear();
        let ticket = self.machine.destroy();
        if self.ports.activation.deactivate(ticket) == ActivationStart::Pending {
            debug!(%ticket, "Final deactivation left running");
        }
        self.tracker.deactivate(self.ports.resize_source.as_mut());
        info!("Sheet destroyed");
    }

    // ===== Execution =====

    fn dispatch(&mut self, trigger: Trigger) -> Result<(), SheetError> {
        if self.destroyed {
            return Ok(());
        }
        self.pump(true)?;
        self.inbox.push_back(trigger);
        self.pump(false)
    }

    /// Run queued effects and pending triggers. Unless `force`d, stops at a hold.
    fn pump(&mut self, force: bool) -> Result<(), SheetError> {
        loop {
            if self.hold.is_some() {
                if !force {
                    return Ok(());
                }
                if let Some(hold) = self.hold.take() {
                    debug!(operation = %hold.operation, "Flushing held effects");
                    self.execute(hold.queued, true);
                }
                continue;
            }
            let Some(trigger) = self.inbox.pop_front() else {
                return Ok(());
            };
            let effects = self.machine.handle(trigger)?;
            self.execute(effects.into(), force);
        }
    }

    fn execute(&mut self, mut queue: VecDeque<Effect>, force: bool) {
        while let Some(effect) = queue.pop_front() {
            if let Effect::Notify(event) = &effect {
                debug!(%event, operation = %event.operation, "Lifecycle");
                let gate = self.ports.observer.on_transition(event);
                if gate == Gate::Hold && !force {
                    debug!(operation = %event.operation, "Observer holds the transition");
                    self.hold = Some(Hold {
                        operation: event.operation,
                        queued: queue,
                    });
                    return;
                }
                continue;
            }
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Notify(_) => {}
            Effect::Activate { ticket } => match self.ports.activation.activate(ticket) {
                ActivationStart::Pending => {}
                ActivationStart::Settled => self.inbox.push_back(Trigger::ActivationSettled {
                    ticket,
                    result: Ok(()),
                }),
                ActivationStart::Failed(err) => {
                    self.inbox.push_back(Trigger::ActivationSettled {
                        ticket,
                        result: Err(err),
                    })
                }
            },
            Effect::Deactivate { ticket } => match self.ports.activation.deactivate(ticket) {
                ActivationStart::Pending => {}
                ActivationStart::Settled | ActivationStart::Failed(_) => {
                    self.inbox.push_back(Trigger::DeactivationSettled { ticket })
                }
            },
            Effect::RenderHidden { height } => {
                self.ports.animator.set_visible(false);
                self.ports.animator.jump_to(height);
            }
            Effect::AwaitFocus { ticket } => self.ports.activation.autofocus(ticket),
            Effect::ScheduleTimeout { ticket, after } => {
                self.ports.scheduler.schedule(ticket, after)
            }
            Effect::Jump { height } => self.ports.animator.jump_to(height),
            Effect::Animate {
                ticket,
                target,
                config,
            } => self.ports.animator.animate_to(ticket, target, config),
            Effect::SetVisible(visible) => self.ports.animator.set_visible(visible),
            Effect::ObserveRegions => self.tracker.activate(self.ports.resize_source.as_mut()),
            Effect::UnobserveRegions => self.tracker.deactivate(self.ports.resize_source.as_mut()),
            Effect::Dismiss => self.ports.observer.on_dismiss(),
            Effect::Diagnostic(diagnostic) => self.ports.observer.on_diagnostic(&diagnostic),
        }
    }
}

#[cfg(test)]
#[path = "sheet_tests.rs"]
mod tests;
