//! Deterministic single-threaded host for a [`Sheet`].
//!
//! Time is virtual. Collaborator completions, safety timeouts and observer
//! releases are queued at a future millisecond and delivered in order; the
//! animator is ticked on a fixed 16ms frame, which is also when coalesced
//! dimension changes are handed to the sheet. Events due at the same
//! millisecond are delivered before that millisecond's frame.

use super::transcript::{Entry, Record};
use crate::animation::{SpringAnimator, SpringConfig};
use crate::gesture::DragFrame;
use crate::machine::MachineConfig;
use crate::model::{
    CollaboratorError, Diagnostic, LifecycleEvent, ObservationId, OperationId, Phase, Region,
    SheetError, Ticket, TransitionKind, TransitionSource,
};
use crate::ports::{
    ActivationSet, AnimationConfig, Animator, FocusTrap, Gate, LifecycleObserver, NoopEffect,
    ResizeSource, Scheduler,
};
use crate::sheet::{Ports, Sheet, Viewport};
use crate::snap::SnapPolicy;
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, trace};

/// Length of one animation frame.
pub const FRAME_MS: u64 = 16;

/// A collaborator whose completion can be scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    /// Focus trap activation.
    Activation,
    /// Focus trap deactivation.
    Deactivation,
    /// Autofocus viewport settling.
    Autofocus,
}

/// How the simulated focus trap behaves.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollaboratorScript {
    /// Delay before activation reports.
    #[serde(default)]
    pub activation_ms: u64,
    /// Delay before deactivation reports.
    #[serde(default)]
    pub deactivation_ms: u64,
    /// Delay before autofocus reports.
    #[serde(default)]
    pub autofocus_ms: u64,
    /// Collaborators that never report, leaving the safety timeout to fire.
    #[serde(default)]
    pub stalled: Vec<Collaborator>,
    /// Make activation fail synchronously.
    #[serde(default)]
    pub fail_activation: bool,
}

impl CollaboratorScript {
    fn delay(&self, collaborator: Collaborator) -> Option<u64> {
        if self.stalled.contains(&collaborator) {
            return None;
        }
        Some(match collaborator {
            Collaborator::Activation => self.activation_ms,
            Collaborator::Deactivation => self.deactivation_ms,
            Collaborator::Autofocus => self.autofocus_ms,
        })
    }
}

/// How the simulated observer answers notifications.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverScript {
    /// Hold the `Start` notification of this kind of operation.
    #[serde(default)]
    pub hold: Option<TransitionKind>,
    /// How long a hold lasts before the observer releases it.
    #[serde(default)]
    pub hold_ms: u64,
}

/// Everything needed to build a [`Simulation`].
#[derive(Debug, Clone)]
pub struct SimulationSetup {
    /// Engine configuration.
    pub machine: MachineConfig,
    /// Animator spring.
    pub spring: SpringConfig,
    /// Initial viewport.
    pub viewport: Viewport,
    /// Focus trap behavior.
    pub collaborators: CollaboratorScript,
    /// Observer behavior.
    pub observer: ObserverScript,
}

/// One host action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// `Sheet::open`.
    Open {
        /// Source label; see [`parse_source`].
        #[serde(default)]
        source: Option<String>,
    },
    /// `Sheet::close`.
    Close {
        /// Source label.
        #[serde(default)]
        source: Option<String>,
    },
    /// `Sheet::request_snap` with a literal height.
    Snap {
        /// Requested height.
        height: f64,
        /// Initial velocity (px/ms).
        #[serde(default)]
        velocity: f64,
        /// Source label.
        #[serde(default)]
        source: Option<String>,
    },
    /// Region measurements. Omitted regions are unchanged.
    Measure {
        /// Header height.
        #[serde(default)]
        header: Option<f64>,
        /// Content height.
        #[serde(default)]
        content: Option<f64>,
        /// Footer height.
        #[serde(default)]
        footer: Option<f64>,
    },
    /// The viewport resized.
    Viewport {
        /// New viewport height.
        height: f64,
    },
    /// Set or clear the max height override.
    MaxHeight {
        /// New override.
        #[serde(default)]
        height: Option<f64>,
    },
    /// One pointer frame.
    Drag(DragFrame),
    /// Let a held notification proceed now.
    Release,
    /// `Sheet::destroy`.
    Destroy,
}

/// Map a scenario source label to a [`TransitionSource`].
///
/// `None` and `"custom"` are [`TransitionSource::Custom`]; the built-in source
/// names map to their variants; anything else is a named custom source.
pub fn parse_source(label: Option<&str>) -> TransitionSource {
    match label {
        None | Some("custom") => TransitionSource::Custom,
        Some("dragging") => TransitionSource::Dragging,
        Some("window") => TransitionSource::Window,
        Some("maxheight") => TransitionSource::MaxHeight,
        Some("element") => TransitionSource::Element,
        Some(other) => TransitionSource::Named(other.to_string()),
    }
}

// ===== Event queue =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    ActivationSettled(Ticket),
    DeactivationSettled(Ticket),
    FocusSettled(Ticket),
    TimerFired(Ticket),
    Release(OperationId),
}

#[derive(Debug)]
struct Scheduled {
    at: u64,
    seq: u64,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

/// State shared between the runtime and the simulated collaborators.
#[derive(Debug, Default)]
struct World {
    now: Cell<u64>,
    seq: Cell<u64>,
    queue: RefCell<BinaryHeap<Reverse<Scheduled>>>,
    held: Cell<Option<OperationId>>,
    entries: RefCell<Vec<Entry>>,
}

impl World {
    fn after(&self, delay_ms: u64, event: Event) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        let at = self.now.get().saturating_add(delay_ms);
        trace!(at, ?event, "Queued");
        self.queue
            .borrow_mut()
            .push(Reverse(Scheduled { at, seq, event }));
    }

    fn next_due(&self) -> Option<u64> {
        self.queue.borrow().peek().map(|Reverse(s)| s.at)
    }

    fn pop(&self) -> Option<Event> {
        self.queue.borrow_mut().pop().map(|Reverse(s)| s.event)
    }

    fn record(&self, record: Record) {
        self.entries.borrow_mut().push(Entry {
            at_ms: self.now.get(),
            record,
        });
    }
}

// ===== Collaborators =====

struct ScriptedFocusTrap {
    world: Rc<World>,
    script: CollaboratorScript,
}

impl ScriptedFocusTrap {
    fn report(&self, collaborator: Collaborator, event: Event) {
        match self.script.delay(collaborator) {
            Some(delay) => self.world.after(delay, event),
            None => debug!(?collaborator, "Collaborator stalled"),
        }
    }
}

impl FocusTrap for ScriptedFocusTrap {
    fn activate(&mut self, ticket: Ticket) -> Result<(), CollaboratorError> {
        if self.script.fail_activation {
            return Err(CollaboratorError::new("focus trap", "scripted failure"));
        }
        self.report(Collaborator::Activation, Event::ActivationSettled(ticket));
        Ok(())
    }

    fn deactivate(&mut self, ticket: Ticket) -> Result<(), CollaboratorError> {
        self.report(Collaborator::Deactivation, Event::DeactivationSettled(ticket));
        Ok(())
    }

    fn autofocus(&mut self, ticket: Ticket) {
        self.report(Collaborator::Autofocus, Event::FocusSettled(ticket));
    }
}

struct QueueScheduler(Rc<World>);

impl Scheduler for QueueScheduler {
    fn schedule(&mut self, ticket: Ticket, after: Duration) {
        let ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
        self.0.after(ms, Event::TimerFired(ticket));
    }
}

#[derive(Default)]
struct CountingResizeSource {
    next: u64,
}

impl ResizeSource for CountingResizeSource {
    fn observe(&mut self, region: Region) -> ObservationId {
        self.next += 1;
        trace!(?region, id = self.next, "Observe");
        ObservationId::new(self.next)
    }

    fn unobserve(&mut self, id: ObservationId) {
        trace!(id = id.get(), "Unobserve");
    }
}

/// Lets the runtime tick the same animator the sheet drives.
struct SharedAnimator(Rc<RefCell<SpringAnimator>>);

impl Animator for SharedAnimator {
    fn value(&self) -> f64 {
        self.0.borrow().value()
    }

    fn jump_to(&mut self, value: f64) {
        self.0.borrow_mut().jump_to(value);
    }

    fn animate_to(&mut self, ticket: Ticket, target: f64, config: AnimationConfig) {
        self.0.borrow_mut().animate_to(ticket, target, config);
    }

    fn set_visible(&mut self, visible: bool) {
        self.0.borrow_mut().set_visible(visible);
    }
}

struct RecordingObserver {
    world: Rc<World>,
    script: ObserverScript,
}

impl LifecycleObserver for RecordingObserver {
    fn on_transition(&mut self, event: &LifecycleEvent) -> Gate {
        self.world.record(Record::Lifecycle(event.clone()));
        if event.phase == Phase::Start && self.script.hold == Some(event.kind) {
            self.world.held.set(Some(event.operation));
            self.world
                .after(self.script.hold_ms, Event::Release(event.operation));
            return Gate::Hold;
        }
        Gate::Proceed
    }

    fn on_dismiss(&mut self) {
        self.world.record(Record::Dismiss);
    }

    fn on_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.world.record(Record::Diagnostic {
            diagnostic: diagnostic.clone(),
        });
    }
}

// ===== Runtime =====

/// A sheet wired to simulated collaborators on a virtual clock.
pub struct Simulation {
    sheet: Sheet,
    world: Rc<World>,
    animator: Rc<RefCell<SpringAnimator>>,
    next_frame: u64,
}

impl Simulation {
    /// Build the sheet and its collaborators at time zero.
    pub fn new(setup: SimulationSetup, policy: Box<dyn SnapPolicy>) -> Self {
        let world = Rc::new(World::default());
        let animator = Rc::new(RefCell::new(SpringAnimator::new(setup.spring)));
        let ports = Ports {
            animator: Box::new(SharedAnimator(Rc::clone(&animator))),
            activation: ActivationSet::new(
                Box::new(ScriptedFocusTrap {
                    world: Rc::clone(&world),
                    script: setup.collaborators,
                }),
                Box::new(NoopEffect("scroll lock")),
                Box::new(NoopEffect("aria hider")),
            ),
            scheduler: Box::new(QueueScheduler(Rc::clone(&world))),
            resize_source: Box::new(CountingResizeSource::default()),
            observer: Box::new(RecordingObserver {
                world: Rc::clone(&world),
                script: setup.observer,
            }),
        };
        Self {
            sheet: Sheet::new(setup.machine, policy, setup.viewport, ports),
            world,
            animator,
            next_frame: FRAME_MS,
        }
    }

    /// Virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.world.now.get()
    }

    /// The simulated sheet.
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Height the animator displays.
    pub fn height(&self) -> f64 {
        self.animator.borrow().value()
    }

    /// Whether the animator paints the sheet.
    pub fn is_visible(&self) -> bool {
        self.animator.borrow().is_visible()
    }

    /// Everything observed so far.
    pub fn entries(&self) -> Vec<Entry> {
        self.world.entries.borrow().clone()
    }

    /// Record a fatal error in the transcript.
    pub fn record_fatal(&self, error: &SheetError) {
        self.world.record(Record::Fatal {
            error: error.to_string(),
        });
    }

    /// Perform `action` at the current virtual time.
    ///
    /// # Errors
    /// A fatal [`SheetError`] from the sheet.
    pub fn apply(&mut self, action: &Action) -> Result<(), SheetError> {
        debug!(at = self.now(), ?action, "Action");
        match action {
            Action::Open { source } => self.sheet.open(parse_source(source.as_deref())),
            Action::Close { source } => self.sheet.close(parse_source(source.as_deref())),
            Action::Snap {
                height,
                velocity,
                source,
            } => self.sheet.request_snap(
                crate::snap::SnapTarget::Height(*height),
                *velocity,
                parse_source(source.as_deref()),
            ),
            Action::Measure {
                header,
                content,
                footer,
            } => {
                let regions = [
                    (Region::Header, header),
                    (Region::Content, content),
                    (Region::Footer, footer),
                ];
                for (region, height) in regions {
                    if let Some(height) = height {
                        self.sheet.region_resized(region, *height);
                    }
                }
                Ok(())
            }
            Action::Viewport { height } => {
                self.sheet.viewport_resized(*height);
                Ok(())
            }
            Action::MaxHeight { height } => {
                self.sheet.set_max_height(*height);
                Ok(())
            }
            Action::Drag(frame) => self.sheet.drag_frame(*frame),
            Action::Release => match self.world.held.take() {
                Some(operation) => self.sheet.release(operation),
                None => Ok(()),
            },
            Action::Destroy => {
                self.sheet.destroy();
                Ok(())
            }
        }
    }

    /// Deliver every event and frame due up to and including `until_ms`.
    ///
    /// # Errors
    /// A fatal [`SheetError`] from the sheet; time stops at that event.
    pub fn run_until(&mut self, until_ms: u64) -> Result<(), SheetError> {
        loop {
            let due = self.world.next_due().filter(|&at| at <= until_ms);
            match due {
                Some(at) if at <= self.next_frame => {
                    self.world.now.set(at.max(self.now()));
                    if let Some(event) = self.world.pop() {
                        self.deliver(event)?;
                    }
                }
                _ if self.next_frame <= until_ms => {
                    self.world.now.set(self.next_frame);
                    self.next_frame += FRAME_MS;
                    self.frame()?;
                }
                _ => break,
            }
        }
        self.world.now.set(until_ms.max(self.now()));
        Ok(())
    }

    /// [`run_until`](Self::run_until) `ms` from now.
    ///
    /// # Errors
    /// A fatal [`SheetError`] from the sheet.
    pub fn run_for(&mut self, ms: u64) -> Result<(), SheetError> {
        self.run_until(self.now().saturating_add(ms))
    }

    fn deliver(&mut self, event: Event) -> Result<(), SheetError> {
        trace!(at = self.now(), ?event, "Deliver");
        match event {
            Event::ActivationSettled(ticket) => self.sheet.activation_settled(ticket, Ok(())),
            Event::DeactivationSettled(ticket) => self.sheet.deactivation_settled(ticket),
            Event::FocusSettled(ticket) => self.sheet.focus_settled(ticket),
            Event::TimerFired(ticket) => self.sheet.timer_fired(ticket),
            Event::Release(operation) => {
                if self.world.held.get() == Some(operation) {
                    self.world.held.set(None);
                }
                self.sheet.release(operation)
            }
        }
    }

    fn frame(&mut self) -> Result<(), SheetError> {
        let rested = self
            .animator
            .borrow_mut()
            .tick(Duration::from_millis(FRAME_MS));
        if let Some(ticket) = rested {
            self.world.record(Record::Rest {
                height: self.height(),
            });
            self.sheet.animation_rested(ticket)?;
        }
        self.sheet.animation_frame()
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
