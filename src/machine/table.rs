//! The transition table.
//!
//! One exhaustive `match` over `(mode, trigger kind)`. Adding a mode or a
//! trigger without deciding every cell is a compile error.

use super::trigger::TriggerKind;
use crate::model::{ClosingStep, Diagnostic, OpenStep, OpeningStep, TransitionMode};

/// What the coordinator does with a trigger in a given mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Nothing to do: the request is already satisfied.
    Ignore,
    /// Invalid call: report a diagnostic and do nothing else.
    Reject(Diagnostic),
    /// A completion nobody in this mode waits for.
    Stale,

    /// `Closed -> Opening.Preparing`.
    BeginOpen,
    /// Closing before deactivation finished: reactivate without waiting, animate back up.
    ResumeOpen,
    /// Closing animation running: start a full open again.
    RestartOpen,

    /// Close before anything was shown: straight to `Closed`.
    AbortHiddenOpen,
    /// Close while autofocusing: wait for deactivation.
    CloseWhileFocusing,
    /// Close during the open animation: deactivate without waiting, animate down.
    CloseWhileAppearing,
    /// Close from any open substate.
    BeginClose,

    /// Pointer down.
    BeginDrag,
    /// Pointer moved.
    FollowDrag,
    /// Pointer released.
    ReleaseDrag,

    /// Replace the target of an open that has not started animating.
    RetargetOpening,
    /// Animate to a requested snap point.
    BeginSnap,

    /// Keep the new dimensions; nothing to reconcile.
    StoreDimensions,
    /// Opening is waiting for content to be measured.
    MeasureForOpening,
    /// Re-render the hidden sheet at the nearest valid height.
    RetargetHidden,
    /// Remember to reconcile once `Open.Idle` is entered.
    DeferResize,
    /// Reconcile now.
    CommitResize,

    /// Activation finished while opening.
    ActivationDone,
    /// Autofocus finished.
    FocusDone,
    /// Deactivation finished while closing.
    DeactivationDone,
    /// The running animation came to rest.
    SettleAnimation,
    /// A guarded step timed out.
    Timeout,
}

/// Look up the route for `kind` in `mode`.
pub fn route(mode: TransitionMode, kind: TriggerKind) -> Route {
    use ClosingStep as C;
    use OpenStep as O;
    use OpeningStep as P;
    use TransitionMode::{Closed, Closing, Open, Opening};

    match (mode, kind) {
        (Closed, TriggerKind::Open) => Route::BeginOpen,
        (Opening(_) | Open(_), TriggerKind::Open) => Route::Ignore,
        (Closing(C::Preparing), TriggerKind::Open) => Route::ResumeOpen,
        (Closing(C::Animating), TriggerKind::Open) => Route::RestartOpen,

        (Closed | Closing(_), TriggerKind::Close) => Route::Ignore,
        (Opening(P::Preparing), TriggerKind::Close) => Route::AbortHiddenOpen,
        (Opening(P::Autofocusing), TriggerKind::Close) => Route::CloseWhileFocusing,
        (Opening(P::Animating), TriggerKind::Close) => Route::CloseWhileAppearing,
        (Open(_), TriggerKind::Close) => Route::BeginClose,

        (Opening(P::Animating) | Open(_), TriggerKind::DragStart) => Route::BeginDrag,
        (
            Closed | Closing(_) | Opening(P::Preparing | P::Autofocusing),
            TriggerKind::DragStart,
        ) => Route::Reject(Diagnostic::DragWhileInactive),
        (Open(O::Dragging), TriggerKind::DragMove) => Route::FollowDrag,
        (Open(O::Dragging), TriggerKind::DragEnd) => Route::ReleaseDrag,
        (_, TriggerKind::DragMove | TriggerKind::DragEnd) => {
            Route::Reject(Diagnostic::DragWithoutSession)
        }

        (Opening(P::Preparing | P::Autofocusing), TriggerKind::Snap) => Route::RetargetOpening,
        (
            Opening(P::Animating) | Open(O::Idle | O::Resizing | O::Snapping),
            TriggerKind::Snap,
        ) => Route::BeginSnap,
        (Open(O::Dragging), TriggerKind::Snap) => Route::Reject(Diagnostic::SnapWhileDragging),
        (Closed | Closing(_), TriggerKind::Snap) => Route::Reject(Diagnostic::SnapWhileInactive),

        (Closed | Closing(_), TriggerKind::Dimensions) => Route::StoreDimensions,
        (Opening(P::Preparing), TriggerKind::Dimensions) => Route::MeasureForOpening,
        (Opening(P::Autofocusing), TriggerKind::Dimensions) => Route::RetargetHidden,
        (Opening(P::Animating) | Open(O::Dragging), TriggerKind::Dimensions) => {
            Route::DeferResize
        }
        (Open(O::Idle | O::Resizing | O::Snapping), TriggerKind::Dimensions) => {
            Route::CommitResize
        }

        (Opening(P::Preparing), TriggerKind::ActivationSettled) => Route::ActivationDone,
        (Opening(P::Autofocusing), TriggerKind::FocusSettled) => Route::FocusDone,
        (Closing(C::Preparing), TriggerKind::DeactivationSettled) => Route::DeactivationDone,
        (
            Opening(P::Animating) | Open(O::Resizing | O::Snapping) | Closing(C::Animating),
            TriggerKind::AnimationRested,
        ) => Route::SettleAnimation,
        (
            Opening(P::Preparing | P::Autofocusing) | Closing(C::Preparing),
            TriggerKind::TimerFired,
        ) => Route::Timeout,
        (
            _,
            TriggerKind::ActivationSettled
            | TriggerKind::DeactivationSettled
            | TriggerKind::FocusSettled
            | TriggerKind::AnimationRested
            | TriggerKind::TimerFired,
        ) => Route::Stale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes_for(kind: TriggerKind) -> Vec<(TransitionMode, Route)> {
        TransitionMode::ALL
            .iter()
            .map(|&mode| (mode, route(mode, kind)))
            .collect()
    }

    #[test]
    fn open_only_starts_from_closed_or_closing() {
        for (mode, r) in routes_for(TriggerKind::Open) {
            match mode {
                TransitionMode::Closed => assert_eq!(r, Route::BeginOpen),
                TransitionMode::Closing(_) => {
                    assert!(matches!(r, Route::ResumeOpen | Route::RestartOpen))
                }
                _ => assert_eq!(r, Route::Ignore, "{mode}"),
            }
        }
    }

    #[test]
    fn close_is_ignored_when_already_closed_or_closing() {
        for (mode, r) in routes_for(TriggerKind::Close) {
            if mode.is_closed_or_closing() {
                assert_eq!(r, Route::Ignore, "{mode}");
            } else {
                assert_ne!(r, Route::Ignore, "{mode}");
            }
        }
    }

    #[test]
    fn drag_start_requires_a_visible_sheet() {
        for (mode, r) in routes_for(TriggerKind::DragStart) {
            if mode.is_visible() && !mode.is_closed_or_closing() {
                assert_eq!(r, Route::BeginDrag, "{mode}");
            } else {
                assert_eq!(r, Route::Reject(Diagnostic::DragWhileInactive), "{mode}");
            }
        }
    }

    #[test]
    fn drag_frames_outside_a_session_are_rejected() {
        let dragging = TransitionMode::Open(OpenStep::Dragging);
        for kind in [TriggerKind::DragMove, TriggerKind::DragEnd] {
            for (mode, r) in routes_for(kind) {
                if mode == dragging {
                    assert!(matches!(r, Route::FollowDrag | Route::ReleaseDrag));
                } else {
                    assert_eq!(r, Route::Reject(Diagnostic::DragWithoutSession), "{mode}");
                }
            }
        }
    }

    #[test]
    fn snap_during_drag_is_rejected() {
        assert_eq!(
            route(TransitionMode::Open(OpenStep::Dragging), TriggerKind::Snap),
            Route::Reject(Diagnostic::SnapWhileDragging)
        );
        assert_eq!(
            route(TransitionMode::Closed, TriggerKind::Snap),
            Route::Reject(Diagnostic::SnapWhileInactive)
        );
    }

    #[test]
    fn resizes_commit_only_where_the_mode_allows() {
        for (mode, r) in routes_for(TriggerKind::Dimensions) {
            assert_eq!(r == Route::CommitResize, mode.commits_resize(), "{mode}");
        }
    }

    #[test]
    fn completions_never_start_transitions_from_rest() {
        for kind in TriggerKind::ALL.iter().filter(|k| k.is_completion()) {
            assert_eq!(route(TransitionMode::Closed, *kind), Route::Stale);
            assert_eq!(
                route(TransitionMode::Open(OpenStep::Idle), *kind),
                Route::Stale
            );
        }
    }

    #[test]
    fn every_cell_is_decided() {
        for mode in TransitionMode::ALL {
            for kind in TriggerKind::ALL {
                // Exhaustiveness is enforced by the compiler; this pins the table size.
                let _ = route(mode, kind);
            }
        }
        assert_eq!(TransitionMode::ALL.len() * TriggerKind::ALL.len(), 120);
    }
}
