//! Idempotent activation of the open-state side effects.
//!
//! While the sheet is open three things hold: focus is trapped inside it, body
//! scroll is locked, and the rest of the document is hidden from assistive
//! technology. [`ActivationSet`] groups them so that repeated `activate` calls
//! before a `deactivate` (and vice versa) are no-ops.
//!
//! Scroll lock and aria hiding are document-wide. [`RefCounted`] shares one
//! such effect between several sheets: it is applied when the first holder
//! activates and removed when the last holder deactivates.

use super::{DocumentEffect, FocusTrap};
use crate::model::{CollaboratorError, Ticket};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Result of starting activation or deactivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationStart {
    /// The focus trap will report completion with the ticket.
    Pending,
    /// Nothing to wait for: the set was already in the requested state.
    Settled,
    /// The focus trap failed synchronously. The set is still considered
    /// switched; the caller proceeds without waiting.
    Failed(CollaboratorError),
}

/// Focus trap, scroll lock and aria hider switched as one unit.
pub struct ActivationSet {
    focus_trap: Box<dyn FocusTrap>,
    scroll_lock: Box<dyn DocumentEffect>,
    aria_hider: Box<dyn DocumentEffect>,
    active: bool,
}

impl ActivationSet {
    /// Group the three primitives. Starts inactive.
    pub fn new(
        focus_trap: Box<dyn FocusTrap>,
        scroll_lock: Box<dyn DocumentEffect>,
        aria_hider: Box<dyn DocumentEffect>,
    ) -> Self {
        Self {
            focus_trap,
            scroll_lock,
            aria_hider,
            active: false,
        }
    }

    /// Whether the side effects are currently applied.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply all three effects. A no-op returning `Settled` if already active.
    pub fn activate(&mut self, ticket: Ticket) -> ActivationStart {
        if self.active {
            debug!(%ticket, "Activation requested while already active");
            return ActivationStart::Settled;
        }
        self.active = true;
        apply(self.scroll_lock.as_mut());
        apply(self.aria_hider.as_mut());
        match self.focus_trap.activate(ticket) {
            Ok(()) => ActivationStart::Pending,
            Err(err) => {
                warn!(%ticket, "Focus trap activation failed, proceeding: {}", err);
                ActivationStart::Failed(err)
            }
        }
    }

    /// Remove all three effects. A no-op returning `Settled` if already inactive.
    pub fn deactivate(&mut self, ticket: Ticket) -> ActivationStart {
        if !self.active {
            debug!(%ticket, "Deactivation requested while already inactive");
            return ActivationStart::Settled;
        }
        self.active = false;
        release(self.scroll_lock.as_mut());
        release(self.aria_hider.as_mut());
        match self.focus_trap.deactivate(ticket) {
            Ok(()) => ActivationStart::Pending,
            Err(err) => {
                warn!(%ticket, "Focus trap deactivation failed, proceeding: {}", err);
                ActivationStart::Failed(err)
            }
        }
    }

    /// Ask the focus trap to move focus and report when the viewport settled.
    pub fn autofocus(&mut self, ticket: Ticket) {
        self.focus_trap.autofocus(ticket);
    }
}

fn apply(effect: &mut dyn DocumentEffect) {
    if let Err(err) = effect.activate() {
        warn!(effect = effect.name(), "Activation failed, proceeding: {}", err);
    }
}

fn release(effect: &mut dyn DocumentEffect) {
    if let Err(err) = effect.deactivate() {
        warn!(effect = effect.name(), "Deactivation failed, proceeding: {}", err);
    }
}

struct Shared<E> {
    effect: E,
    holders: usize,
}

/// A document-wide effect shared by several sheets.
///
/// Single-threaded by construction (`Rc<RefCell<_>>`); sheets live on the UI
/// thread.
pub struct RefCounted<E> {
    inner: Rc<RefCell<Shared<E>>>,
}

impl<E: DocumentEffect> RefCounted<E> {
    /// Wrap `effect`. Nobody holds it yet.
    pub fn new(effect: E) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Shared { effect, holders: 0 })),
        }
    }

    /// A per-sheet handle. Each handle counts at most once.
    pub fn handle(&self) -> SharedEffect<E> {
        SharedEffect {
            inner: Rc::clone(&self.inner),
            held: false,
        }
    }

    /// Number of handles currently holding the effect.
    pub fn holders(&self) -> usize {
        self.inner.borrow().holders
    }

    /// Run `f` against the wrapped effect.
    pub fn with_effect<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.inner.borrow().effect)
    }
}

/// One sheet's handle on a [`RefCounted`] effect.
///
/// Dropping a holding handle releases it.
pub struct SharedEffect<E: DocumentEffect> {
    inner: Rc<RefCell<Shared<E>>>,
    held: bool,
}

impl<E: DocumentEffect> DocumentEffect for SharedEffect<E> {
    fn name(&self) -> &'static str {
        self.inner.borrow().effect.name()
    }

    fn activate(&mut self) -> Result<(), CollaboratorError> {
        if self.held {
            return Ok(());
        }
        self.held = true;
        let mut shared = self.inner.borrow_mut();
        shared.holders += 1;
        if shared.holders == 1 {
            shared.effect.activate()
        } else {
            Ok(())
        }
    }

    fn deactivate(&mut self) -> Result<(), CollaboratorError> {
        if !self.held {
            return Ok(());
        }
        self.held = false;
        let mut shared = self.inner.borrow_mut();
        shared.holders = shared.holders.saturating_sub(1);
        if shared.holders == 0 {
            shared.effect.deactivate()
        } else {
            Ok(())
        }
    }
}

impl<E: DocumentEffect> Drop for SharedEffect<E> {
    fn drop(&mut self) {
        if self.held {
            if let Err(err) = self.deactivate() {
                warn!("Releasing shared effect on drop failed: {}", err);
            }
        }
    }
}
