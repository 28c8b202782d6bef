//! The transition coordinator.
//!
//! Owns the mode, the current operation and every in-flight ticket. Each
//! trigger is routed through [`table::route`](super::table::route) and turned
//! into an ordered list of [`Effect`]s. No collaborator is ever called from
//! here, which keeps every path testable without a host.
//!
//! # Operations
//! Open, close, snap and resize are operations. Each gets an [`OperationId`],
//! a `Start` notification, and exactly one of `Cancel` or `End`. Starting an
//! operation while another is current cancels the old one first, so a
//! `Cancel` always precedes the next `Start`.
//!
//! # Suspension
//! Activation, dimension measurement, autofocus and deactivation are awaited
//! through a single ticket guarded by a timeout. Animations carry their own
//! ticket. Completions for any other ticket are stale and dropped.

use super::effect::Effect;
use super::table::{self, Route};
use super::trigger::{Trigger, TriggerKind};
use crate::gesture::{DragFrame, DragSession, GestureConfig, GestureInterpreter};
use crate::model::{
    ClosingStep, CollaboratorError, Diagnostic, DimensionSnapshot, LifecycleEvent, OpenStep,
    OpeningStep, OperationId, Phase, Sequence, SheetError, SnapPoint, SnapPointSet, Ticket,
    TransitionKind, TransitionMode, TransitionSource,
};
use crate::ports::AnimationConfig;
use crate::snap::{find_snap, initial_snap, nearest, resolve, SnapPolicy, SnapTarget};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Behavior switches and safety timeouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineConfig {
    /// Gesture constants and the dismiss/content-drag switches.
    pub gesture: GestureConfig,
    /// Replace every animation with a jump.
    pub reduced_motion: bool,
    /// Longest wait for the focus trap to activate.
    pub activation_timeout: Duration,
    /// Longest wait for the focus trap to deactivate.
    pub deactivation_timeout: Duration,
    /// Longest wait for autofocus-driven viewport changes to settle.
    pub autofocus_timeout: Duration,
    /// Longest wait for the content region to be measured.
    pub dimension_timeout: Duration,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            reduced_motion: false,
            activation_timeout: Duration::from_millis(5000),
            deactivation_timeout: Duration::from_millis(5000),
            autofocus_timeout: Duration::from_millis(300),
            dimension_timeout: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AwaitStep {
    Activation,
    Dimensions,
    Autofocus,
    Deactivation,
}

#[derive(Debug, Clone, Copy)]
struct Awaiting {
    ticket: Ticket,
    step: AwaitStep,
}

#[derive(Debug, Clone)]
struct Operation {
    id: OperationId,
    kind: TransitionKind,
    source: TransitionSource,
}

/// Pure state machine coordinating opening, closing, snapping, resizing and dragging.
pub struct TransitionMachine {
    config: MachineConfig,
    interpreter: GestureInterpreter,
    policy: Box<dyn SnapPolicy>,
    mode: TransitionMode,
    trigger: TriggerKind,
    snapshot: DimensionSnapshot,
    snap_points: SnapPointSet,
    sequence: Sequence,
    operation: Option<Operation>,
    awaiting: Option<Awaiting>,
    animation: Option<Ticket>,
    committed: SnapPoint,
    opening_request: Option<SnapTarget>,
    last_snap: Option<SnapPoint>,
    pending_resize: Option<TransitionSource>,
    shown: bool,
    close_velocity: f64,
    drag: Option<DragSession>,
    terminated: bool,
}

impl TransitionMachine {
    /// Closed machine with the given policy and initial dimensions.
    pub fn new(
        config: MachineConfig,
        policy: Box<dyn SnapPolicy>,
        snapshot: DimensionSnapshot,
    ) -> Self {
        Self {
            config,
            interpreter: GestureInterpreter::new(config.gesture),
            policy,
            mode: TransitionMode::Closed,
            trigger: TriggerKind::Open,
            snapshot,
            snap_points: SnapPointSet::fallback(),
            sequence: Sequence::default(),
            operation: None,
            awaiting: None,
            animation: None,
            committed: SnapPoint::ZERO,
            opening_request: None,
            last_snap: None,
            pending_resize: None,
            shown: false,
            close_velocity: 0.0,
            drag: None,
            terminated: false,
        }
    }

    /// Current leaf mode.
    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    /// Configuration in use.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Latest resolved snap points.
    pub fn snap_points(&self) -> &SnapPointSet {
        &self.snap_points
    }

    /// Dimensions the snap points were resolved from.
    pub fn snapshot(&self) -> &DimensionSnapshot {
        &self.snapshot
    }

    /// The snap point the sheet rests at or is heading to.
    pub fn committed(&self) -> SnapPoint {
        self.committed
    }

    /// The snap point of the last settled open, snap or resize.
    pub fn last_snap(&self) -> Option<SnapPoint> {
        self.last_snap
    }

    /// The operation that will receive the next `Cancel` or `End`.
    pub fn current_operation(&self) -> Option<OperationId> {
        self.operation.as_ref().map(|op| op.id)
    }

    /// Whether a fatal error ended this machine.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Process one trigger.
    ///
    /// # Errors
    /// Any fatal [`SheetError`]. The machine is terminated afterwards and every
    /// later call returns [`SheetError::Terminated`].
    pub fn handle(&mut self, trigger: Trigger) -> Result<Vec<Effect>, SheetError> {
        if self.terminated {
            return Err(SheetError::Terminated);
        }
        let mut out = Vec::new();
        match self.dispatch(trigger, &mut out) {
            Ok(()) => Ok(out),
            Err(err) => {
                error!(mode = %self.mode, trigger = %self.trigger, "Sheet terminated: {}", err);
                self.terminated = true;
                Err(err)
            }
        }
    }

    /// Forget everything tied to this sheet instance and hand back a ticket
    /// for a final, unawaited deactivation.
    pub fn destroy(&mut self) -> Ticket {
        debug!(mode = %self.mode, "Destroying sheet");
        self.operation = None;
        self.awaiting = None;
        self.animation = None;
        self.drag = None;
        self.last_snap = None;
        self.pending_resize = None;
        self.opening_request = None;
        self.mode = TransitionMode::Closed;
        self.terminated = true;
        self.sequence.ticket()
    }

    fn dispatch(&mut self, trigger: Trigger, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        let kind = trigger.kind();
        self.trigger = kind;

        if let Trigger::Drag { frame, .. } = &trigger {
            if frame.from_content && !self.config.gesture.expand_on_content_drag {
                self.reject(Diagnostic::ContentDragDisabled, out);
                return Ok(());
            }
        }

        let route = table::route(self.mode, kind);
        trace!(mode = %self.mode, trigger = %kind, ?route, "Routing trigger");

        match trigger {
            Trigger::Open { source } => match route {
                Route::BeginOpen => self.begin_open(source, out),
                Route::ResumeOpen => self.resume_open(source, out),
                Route::RestartOpen => self.restart_open(source, out),
                other => self.skip(other, out),
            },
            Trigger::Close { source } => match route {
                Route::AbortHiddenOpen => self.abort_hidden_open(source, out),
                Route::CloseWhileFocusing => self.close_while_focusing(source, out),
                Route::CloseWhileAppearing => self.close_while_appearing(source, out),
                Route::BeginClose => self.begin_close(source, 0.0, out),
                other => self.skip(other, out),
            },
            Trigger::Drag {
                frame,
                current_height,
            } => match route {
                Route::BeginDrag => self.begin_drag(frame, current_height, out),
                Route::FollowDrag => self.follow_drag(frame, out),
                Route::ReleaseDrag => self.release_drag(frame, out),
                other => self.skip(other, out),
            },
            Trigger::Snap {
                target,
                velocity,
                source,
            } => match route {
                Route::RetargetOpening => self.retarget_opening(target, out),
                Route::BeginSnap => self.snap_request(target, velocity, source, out),
                other => self.skip(other, out),
            },
            Trigger::Dimensions { snapshot, source } => {
                self.on_dimensions(snapshot, source, route, out)
            }
            Trigger::ActivationSettled { ticket, result } => match route {
                Route::ActivationDone => self.on_activation_settled(ticket, result, out),
                other => self.skip(other, out),
            },
            Trigger::DeactivationSettled { ticket } => match route {
                Route::DeactivationDone => {
                    if self.take_awaited(ticket, AwaitStep::Deactivation) {
                        self.begin_disappear(out);
                    }
                    Ok(())
                }
                other => self.skip(other, out),
            },
            Trigger::FocusSettled { ticket } => match route {
                Route::FocusDone => {
                    if self.take_awaited(ticket, AwaitStep::Autofocus) {
                        self.begin_appear(out)?;
                    }
                    Ok(())
                }
                other => self.skip(other, out),
            },
            Trigger::AnimationRested { ticket } => match route {
                Route::SettleAnimation => self.on_animation_rested(ticket, out),
                other => self.skip(other, out),
            },
            Trigger::TimerFired { ticket } => match route {
                Route::Timeout => self.on_timeout(ticket, out),
                other => self.skip(other, out),
            },
        }
    }

    fn skip(&mut self, route: Route, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        match route {
            Route::Reject(diagnostic) => self.reject(diagnostic, out),
            Route::Stale => {
                debug!(mode = %self.mode, trigger = %self.trigger, "Discarding stale completion")
            }
            _ => debug!(mode = %self.mode, trigger = %self.trigger, "Trigger has no effect"),
        }
        Ok(())
    }

    fn reject(&mut self, diagnostic: Diagnostic, out: &mut Vec<Effect>) {
        warn!(mode = %self.mode, trigger = %self.trigger, "Ignored call: {}", diagnostic);
        out.push(Effect::Diagnostic(diagnostic));
    }

    // ===== Opening =====

    fn begin_open(
        &mut self,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.refresh_snap_points()?;
        self.start_operation(TransitionKind::Open, source, out);
        self.opening_request = None;
        self.pending_resize = None;
        out.push(Effect::ObserveRegions);
        self.set_mode(TransitionMode::Opening(OpeningStep::Preparing));
        self.await_step(AwaitStep::Activation, out);
        Ok(())
    }

    fn resume_open(
        &mut self,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.start_operation(TransitionKind::Open, source, out);
        self.awaiting = None;
        self.opening_request = None;
        let ticket = self.sequence.ticket();
        out.push(Effect::Activate { ticket });
        let target = self.opening_target(out)?;
        self.committed = target;
        self.set_mode(TransitionMode::Opening(OpeningStep::Animating));
        if !self.shown {
            out.push(Effect::Jump { height: 0.0 });
            out.push(Effect::SetVisible(true));
            self.shown = true;
        }
        self.animate(target, 0.0, false, out);
        Ok(())
    }

    fn restart_open(
        &mut self,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.start_operation(TransitionKind::Open, source, out);
        self.animation = None;
        self.opening_request = None;
        self.set_mode(TransitionMode::Opening(OpeningStep::Preparing));
        self.await_step(AwaitStep::Activation, out);
        Ok(())
    }

    fn on_activation_settled(
        &mut self,
        ticket: Ticket,
        result: Result<(), CollaboratorError>,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        if !self.take_awaited(ticket, AwaitStep::Activation) {
            return Ok(());
        }
        if let Err(err) = result {
            warn!(%ticket, "Activation failed, opening anyway: {}", err);
        }
        self.after_activation(out)
    }

    fn after_activation(&mut self, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        if self.snapshot.is_measured() {
            return self.begin_autofocus(out);
        }
        debug!("Activation finished before content was measured, waiting");
        self.await_step(AwaitStep::Dimensions, out);
        Ok(())
    }

    fn begin_autofocus(&mut self, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        let target = self.opening_target(out)?;
        self.committed = target;
        self.shown = false;
        out.push(Effect::RenderHidden {
            height: target.height(),
        });
        self.set_mode(TransitionMode::Opening(OpeningStep::Autofocusing));
        self.await_step(AwaitStep::Autofocus, out);
        Ok(())
    }

    fn begin_appear(&mut self, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        // Autofocus may have moved the viewport (soft keyboard)
        let target = nearest(&self.snap_points, self.committed.height())?;
        self.committed = target;
        self.set_mode(TransitionMode::Opening(OpeningStep::Animating));
        out.push(Effect::Jump { height: 0.0 });
        out.push(Effect::SetVisible(true));
        self.shown = true;
        self.animate(target, 0.0, false, out);
        Ok(())
    }

    /// Snap point an open should head to: a pending request, else the policy's initial point.
    fn opening_target(&mut self, out: &mut Vec<Effect>) -> Result<SnapPoint, SheetError> {
        if let Some(request) = self.opening_request.take() {
            match find_snap(
                &request,
                &self.snapshot,
                &self.snap_points,
                self.last_snap,
                self.committed.height(),
            ) {
                Some(point) => return Ok(point),
                None => self.reject(Diagnostic::NonNumericSnapTarget, out),
            }
        }
        initial_snap(
            &self.snapshot,
            &self.snap_points,
            self.last_snap,
            self.committed.height(),
            self.policy.as_ref(),
        )
    }

    fn retarget_opening(
        &mut self,
        target: SnapTarget,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        if self.mode != TransitionMode::Opening(OpeningStep::Autofocusing) {
            debug!(?target, "Replacing opening target");
            self.opening_request = Some(target);
            return Ok(());
        }
        let Some(point) = find_snap(
            &target,
            &self.snapshot,
            &self.snap_points,
            self.last_snap,
            self.committed.height(),
        ) else {
            self.reject(Diagnostic::NonNumericSnapTarget, out);
            return Ok(());
        };
        if point != self.committed {
            self.committed = point;
            out.push(Effect::RenderHidden {
                height: point.height(),
            });
        }
        Ok(())
    }

    // ===== Closing =====

    fn abort_hidden_open(
        &mut self,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.start_operation(TransitionKind::Close, source, out);
        self.end_operation(out);
        self.awaiting = None;
        let ticket = self.sequence.ticket();
        out.push(Effect::Deactivate { ticket });
        self.enter_closed(out);
        Ok(())
    }

    fn close_while_focusing(
        &mut self,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.start_operation(TransitionKind::Close, source, out);
        self.close_velocity = 0.0;
        self.set_mode(TransitionMode::Closing(ClosingStep::Preparing));
        self.await_step(AwaitStep::Deactivation, out);
        Ok(())
    }

    fn close_while_appearing(
        &mut self,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.start_operation(TransitionKind::Close, source, out);
        self.close_velocity = 0.0;
        let ticket = self.sequence.ticket();
        out.push(Effect::Deactivate { ticket });
        self.begin_disappear(out);
        Ok(())
    }

    fn begin_close(
        &mut self,
        source: TransitionSource,
        velocity: f64,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.drag = None;
        self.animation = None;
        self.close_velocity = velocity;
        self.start_operation(TransitionKind::Close, source, out);
        self.set_mode(TransitionMode::Closing(ClosingStep::Preparing));
        self.await_step(AwaitStep::Deactivation, out);
        Ok(())
    }

    fn begin_disappear(&mut self, out: &mut Vec<Effect>) {
        self.set_mode(TransitionMode::Closing(ClosingStep::Animating));
        if self.shown {
            self.animate(SnapPoint::ZERO, self.close_velocity, false, out);
        } else {
            // Never painted: nothing to animate
            out.push(Effect::Jump { height: 0.0 });
            self.end_operation(out);
            self.enter_closed(out);
        }
    }

    fn enter_closed(&mut self, out: &mut Vec<Effect>) {
        self.set_mode(TransitionMode::Closed);
        if self.shown {
            out.push(Effect::SetVisible(false));
        }
        out.push(Effect::UnobserveRegions);
        self.shown = false;
        self.awaiting = None;
        self.animation = None;
        self.drag = None;
        self.pending_resize = None;
    }

    // ===== Dragging =====

    fn begin_drag(
        &mut self,
        frame: DragFrame,
        current_height: f64,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.cancel_operation(out);
        self.animation = None;
        self.drag = Some(self.interpreter.begin(current_height, frame.from_content));
        self.set_mode(TransitionMode::Open(OpenStep::Dragging));
        out.push(Effect::Jump {
            height: current_height.max(0.0),
        });
        self.follow_drag(frame, out)
    }

    fn follow_drag(&mut self, frame: DragFrame, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        if self.drag.is_none() {
            self.reject(Diagnostic::DragWithoutSession, out);
            return Ok(());
        }
        let interpreter = self.interpreter;
        let Some(session) = self.drag.as_mut() else {
            return Ok(());
        };
        let outcome = interpreter.on_drag_frame(session, &frame, &self.snap_points)?;
        out.push(Effect::Jump {
            height: outcome.target_height,
        });
        Ok(())
    }

    fn release_drag(&mut self, frame: DragFrame, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        let Some(mut session) = self.drag.take() else {
            self.reject(Diagnostic::DragWithoutSession, out);
            return Ok(());
        };
        let outcome = self
            .interpreter
            .on_drag_frame(&mut session, &frame, &self.snap_points)?;

        if outcome.should_dismiss {
            out.push(Effect::Dismiss);
            return self.begin_close(TransitionSource::Dragging, outcome.velocity, out);
        }

        if outcome.should_cancel {
            out.push(Effect::Jump {
                height: session.memo,
            });
            let point = nearest(&self.snap_points, session.memo)?;
            if self.snap_points.contains_height(session.memo) {
                self.committed = point;
                return self.enter_idle(out);
            }
            return self.begin_snap(point, TransitionSource::Dragging, 0.0, out);
        }

        let point = nearest(&self.snap_points, outcome.target_height)?;
        self.begin_snap(point, TransitionSource::Dragging, outcome.velocity, out)
    }

    // ===== Snapping and resizing =====

    fn snap_request(
        &mut self,
        target: SnapTarget,
        velocity: f64,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        let Some(point) = find_snap(
            &target,
            &self.snapshot,
            &self.snap_points,
            self.last_snap,
            self.committed.height(),
        ) else {
            self.reject(Diagnostic::NonNumericSnapTarget, out);
            return Ok(());
        };
        self.begin_snap(point, source, velocity, out)
    }

    fn begin_snap(
        &mut self,
        target: SnapPoint,
        source: TransitionSource,
        velocity: f64,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.start_operation(TransitionKind::Snap, source, out);
        self.committed = target;
        self.set_mode(TransitionMode::Open(OpenStep::Snapping));
        self.animate(target, velocity, false, out);
        Ok(())
    }

    fn on_dimensions(
        &mut self,
        snapshot: DimensionSnapshot,
        source: TransitionSource,
        route: Route,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        self.snapshot = snapshot;
        self.refresh_snap_points()?;

        match route {
            Route::MeasureForOpening => {
                let waiting = matches!(
                    self.awaiting,
                    Some(Awaiting {
                        step: AwaitStep::Dimensions,
                        ..
                    })
                );
                if waiting && self.snapshot.is_measured() {
                    self.awaiting = None;
                    return self.begin_autofocus(out);
                }
                Ok(())
            }
            Route::RetargetHidden => {
                let point = nearest(&self.snap_points, self.committed.height())?;
                if point != self.committed {
                    self.committed = point;
                    out.push(Effect::RenderHidden {
                        height: point.height(),
                    });
                }
                Ok(())
            }
            Route::DeferResize => {
                if !self.snap_points.contains_height(self.committed.height()) {
                    debug!(%source, "Deferring resize until the sheet is idle");
                    self.pending_resize = Some(source);
                }
                Ok(())
            }
            Route::CommitResize => self.reconcile(source, out),
            _ => Ok(()),
        }
    }

    fn reconcile(
        &mut self,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        let target = nearest(&self.snap_points, self.committed.height())?;
        if target == self.committed {
            return Ok(());
        }
        let immediate = source == TransitionSource::Element;
        self.start_operation(TransitionKind::Resize, source, out);
        self.committed = target;
        self.set_mode(TransitionMode::Open(OpenStep::Resizing));
        self.animate(target, 0.0, immediate, out);
        Ok(())
    }

    fn refresh_snap_points(&mut self) -> Result<(), SheetError> {
        self.snap_points = resolve(&self.snapshot, self.committed.height(), self.policy.as_ref())?;
        trace!(snap_points = %self.snap_points, "Resolved snap points");
        Ok(())
    }

    // ===== Settling =====

    fn on_animation_rested(
        &mut self,
        ticket: Ticket,
        out: &mut Vec<Effect>,
    ) -> Result<(), SheetError> {
        if self.animation != Some(ticket) {
            debug!(%ticket, "Discarding rest of an interrupted animation");
            return Ok(());
        }
        self.animation = None;
        match self.mode {
            TransitionMode::Closing(ClosingStep::Animating) => {
                self.end_operation(out);
                self.enter_closed(out);
                Ok(())
            }
            _ => {
                self.end_operation(out);
                self.last_snap = Some(self.committed);
                self.enter_idle(out)
            }
        }
    }

    fn enter_idle(&mut self, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        self.set_mode(TransitionMode::Open(OpenStep::Idle));
        match self.pending_resize.take() {
            Some(source) => self.reconcile(source, out),
            None => Ok(()),
        }
    }

    fn on_timeout(&mut self, ticket: Ticket, out: &mut Vec<Effect>) -> Result<(), SheetError> {
        let Some(awaiting) = self.awaiting.filter(|a| a.ticket == ticket) else {
            debug!(%ticket, "Discarding timeout of a finished step");
            return Ok(());
        };
        self.awaiting = None;
        match awaiting.step {
            AwaitStep::Activation => {
                warn!(timeout = ?self.config.activation_timeout, "Activation timed out, opening anyway");
                self.after_activation(out)
            }
            AwaitStep::Dimensions => {
                let waited = self.config.dimension_timeout;
                error!(?waited, "Content was never measured");
                Err(SheetError::DimensionsUnavailable { waited })
            }
            AwaitStep::Autofocus => {
                debug!("Autofocus did not report, showing the sheet");
                self.begin_appear(out)
            }
            AwaitStep::Deactivation => {
                warn!(timeout = ?self.config.deactivation_timeout, "Deactivation timed out, closing anyway");
                self.begin_disappear(out);
                Ok(())
            }
        }
    }

    // ===== Bookkeeping =====

    fn await_step(&mut self, step: AwaitStep, out: &mut Vec<Effect>) {
        let ticket = self.sequence.ticket();
        let after = match step {
            AwaitStep::Activation => {
                out.push(Effect::Activate { ticket });
                self.config.activation_timeout
            }
            AwaitStep::Dimensions => self.config.dimension_timeout,
            AwaitStep::Autofocus => {
                out.push(Effect::AwaitFocus { ticket });
                self.config.autofocus_timeout
            }
            AwaitStep::Deactivation => {
                out.push(Effect::Deactivate { ticket });
                self.config.deactivation_timeout
            }
        };
        out.push(Effect::ScheduleTimeout { ticket, after });
        self.awaiting = Some(Awaiting { ticket, step });
    }

    fn take_awaited(&mut self, ticket: Ticket, step: AwaitStep) -> bool {
        match self.awaiting {
            Some(awaiting) if awaiting.ticket == ticket && awaiting.step == step => {
                self.awaiting = None;
                true
            }
            _ => {
                debug!(%ticket, ?step, "Discarding stale completion");
                false
            }
        }
    }

    fn animate(
        &mut self,
        target: SnapPoint,
        velocity: f64,
        immediate: bool,
        out: &mut Vec<Effect>,
    ) {
        let ticket = self.sequence.ticket();
        let config = if immediate || self.config.reduced_motion {
            AnimationConfig::immediate()
        } else {
            AnimationConfig::smooth(velocity)
        };
        self.animation = Some(ticket);
        out.push(Effect::Animate {
            ticket,
            target: target.height(),
            config,
        });
    }

    fn start_operation(
        &mut self,
        kind: TransitionKind,
        source: TransitionSource,
        out: &mut Vec<Effect>,
    ) {
        self.cancel_operation(out);
        let operation = Operation {
            id: self.sequence.operation(),
            kind,
            source,
        };
        out.push(notify(Phase::Start, &operation));
        self.operation = Some(operation);
    }

    fn cancel_operation(&mut self, out: &mut Vec<Effect>) {
        if let Some(operation) = self.operation.take() {
            out.push(notify(Phase::Cancel, &operation));
        }
    }

    fn end_operation(&mut self, out: &mut Vec<Effect>) {
        if let Some(operation) = self.operation.take() {
            out.push(notify(Phase::End, &operation));
        }
    }

    fn set_mode(&mut self, to: TransitionMode) {
        if self.mode != to {
            debug!(from = %self.mode, to = %to, trigger = %self.trigger, "Mode change");
        }
        self.mode = to;
    }
}

fn notify(phase: Phase, operation: &Operation) -> Effect {
    Effect::Notify(LifecycleEvent {
        phase,
        kind: operation.kind,
        source: operation.source.clone(),
        operation: operation.id,
    })
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
