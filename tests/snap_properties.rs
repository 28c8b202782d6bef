//! Property-based tests for snap resolution, gestures and the transition machine.
//!
//! Tests validate:
//! 1. Resolved snap sets are non-empty, ascending, unique and within [0, max_height]
//! 2. nearest() picks a minimal-distance member, smaller on ties
//! 3. Rubber-band overshoot is non-negative and smaller than the gap between bounds
//! 4. Lifecycle notifications pair up per operation under arbitrary trigger sequences
//! 5. A released drag always commits to a member of the snap set

use proptest::prelude::*;
use snapsheet::gesture::{rubber_band, rubber_band_if_out_of_bounds, DragFrame, DragPhase};
use snapsheet::machine::{Effect, TransitionMachine, Trigger};
use snapsheet::model::{
    DimensionSnapshot, OpenStep, OperationId, Phase, SnapPoint, SnapPointSet, Ticket,
    TransitionMode, TransitionSource,
};
use snapsheet::snap::{
    nearest, resolve, FixedPolicy, FnPolicy, PolicyOutput, SelectionContext, SnapContext,
    SnapTarget,
};
use snapsheet::MachineConfig;
use std::collections::HashMap;

fn heights(set: &SnapPointSet) -> Vec<f64> {
    set.iter().map(|p| p.height()).collect()
}

// ===== Property 1: Resolution =====

proptest! {
    #[test]
    fn resolved_sets_are_sorted_unique_and_clamped(
        raw in prop::collection::vec(-500.0f64..3000.0, 1..12),
        viewport in 100.0f64..2000.0,
        current in 0.0f64..2000.0,
    ) {
        let points = raw.clone();
        let policy = FnPolicy::new(
            move |_: &SnapContext| PolicyOutput::Many(points.clone()),
            |_: &SelectionContext<'_>| 0.0,
        );
        let snapshot = DimensionSnapshot::new(viewport, 40.0, 300.0, 60.0);

        let set = resolve(&snapshot, current, &policy).unwrap();
        let resolved = heights(&set);

        prop_assert!(!resolved.is_empty());
        prop_assert!(resolved.windows(2).all(|w| w[0] < w[1]), "not strictly ascending: {:?}", resolved);
        prop_assert!(resolved.iter().all(|&h| (0.0..=snapshot.max_height.round()).contains(&h)));
        prop_assert!(resolved.iter().all(|h| h.fract() == 0.0));
    }

    #[test]
    fn unmeasured_content_always_resolves_to_zero(
        raw in prop::collection::vec(0.0f64..3000.0, 1..6),
        viewport in 100.0f64..2000.0,
    ) {
        let policy = FixedPolicy::new(raw);
        let snapshot = DimensionSnapshot::new(viewport, 40.0, 0.0, 60.0);

        let set = resolve(&snapshot, 0.0, &policy).unwrap();

        prop_assert_eq!(heights(&set), vec![0.0]);
    }
}

// ===== Property 2: Nearest =====

proptest! {
    #[test]
    fn nearest_is_minimal_and_prefers_the_smaller_point(
        raw in prop::collection::vec(0u32..2000, 1..10),
        target in -200.0f64..2400.0,
    ) {
        let set = SnapPointSet::from_points(raw.into_iter().map(SnapPoint::from)).unwrap();

        let chosen = nearest(&set, target).unwrap().height();

        let query = target.round();
        let best = set
            .iter()
            .map(|p| (p.height() - query).abs())
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!((chosen - query).abs(), best);
        let smallest_at_best = set
            .iter()
            .map(|p| p.height())
            .find(|h| (h - query).abs() == best)
            .unwrap();
        prop_assert_eq!(chosen, smallest_at_best);
    }
}

// ===== Property 3: Rubber band =====

proptest! {
    #[test]
    fn overshoot_is_non_negative_and_below_the_gap(
        distance in -100.0f64..5000.0,
        dimension in 1.0f64..2000.0,
        constant in 0.01f64..2.0,
    ) {
        let overshoot = rubber_band(distance, dimension, constant);

        prop_assert!(overshoot >= 0.0, "negative overshoot: {}", overshoot);
        prop_assert!(overshoot < dimension, "overshoot {} reached the gap {}", overshoot, dimension);
    }

    #[test]
    fn banding_is_identity_inside_the_bounds(
        position in -5000.0f64..5000.0,
        max in 1.0f64..2000.0,
        constant in 0.01f64..2.0,
    ) {
        let banded = rubber_band_if_out_of_bounds(position, 0.0, max, constant);

        prop_assert!(banded > -max && banded < 2.0 * max, "banded {} escaped", banded);
        if (0.0..=max).contains(&position) {
            prop_assert_eq!(banded, position);
        }
    }

    #[test]
    fn rubber_band_preserves_the_side_of_the_bound(
        distance in 0.001f64..5000.0,
        min in 0.0f64..500.0,
        gap in 1.0f64..1500.0,
    ) {
        let max = min + gap;

        prop_assert!(rubber_band_if_out_of_bounds(max + distance, min, max, 0.55) > max);
        prop_assert!(rubber_band_if_out_of_bounds(min - distance, min, max, 0.55) < min);
    }
}

// ===== Property 4 and 5: Transition machine =====

#[derive(Debug, Clone)]
enum Op {
    Open,
    Close,
    Snap(f64),
    DragStart,
    DragMove(f64, f64),
    DragEnd(f64, f64),
    Viewport(f64),
    Activation(usize),
    Deactivation(usize),
    Focus(usize),
    Rested(usize),
    Timer(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Open),
        Just(Op::Close),
        (0.0f64..900.0).prop_map(Op::Snap),
        Just(Op::DragStart),
        (-400.0f64..400.0, 0.0f64..2.0).prop_map(|(d, v)| Op::DragMove(d, v)),
        (-400.0f64..400.0, 0.0f64..2.0).prop_map(|(d, v)| Op::DragEnd(d, v)),
        (300.0f64..1000.0).prop_map(Op::Viewport),
        any::<usize>().prop_map(Op::Activation),
        any::<usize>().prop_map(Op::Deactivation),
        any::<usize>().prop_map(Op::Focus),
        any::<usize>().prop_map(Op::Rested),
        any::<usize>().prop_map(Op::Timer),
    ]
}

/// Host stand-in: remembers issued tickets and the displayed height.
#[derive(Default)]
struct Host {
    issued: Vec<Ticket>,
    height: f64,
}

impl Host {
    fn ticket(&self, pick: usize) -> Ticket {
        if self.issued.is_empty() {
            Ticket::new(pick as u64)
        } else {
            self.issued[pick % self.issued.len()]
        }
    }

    fn observe(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Activate { ticket }
                | Effect::Deactivate { ticket }
                | Effect::AwaitFocus { ticket }
                | Effect::ScheduleTimeout { ticket, .. } => self.issued.push(*ticket),
                Effect::Animate { ticket, target, .. } => {
                    self.issued.push(*ticket);
                    self.height = *target;
                }
                Effect::Jump { height } | Effect::RenderHidden { height } => self.height = *height,
                _ => {}
            }
        }
    }

    fn trigger(&self, op: &Op) -> Trigger {
        let drag = |phase, delta, velocity| Trigger::Drag {
            frame: DragFrame::new(phase, delta, velocity),
            current_height: self.height,
        };
        match *op {
            Op::Open => Trigger::Open {
                source: TransitionSource::Custom,
            },
            Op::Close => Trigger::Close {
                source: TransitionSource::Custom,
            },
            Op::Snap(height) => Trigger::Snap {
                target: SnapTarget::Height(height),
                velocity: 0.0,
                source: TransitionSource::Custom,
            },
            Op::DragStart => drag(DragPhase::Start, 0.0, 0.0),
            Op::DragMove(delta, velocity) => drag(DragPhase::Move, delta, velocity),
            Op::DragEnd(delta, velocity) => drag(DragPhase::End, delta, velocity),
            Op::Viewport(height) => Trigger::Dimensions {
                snapshot: DimensionSnapshot::new(height, 40.0, 300.0, 60.0),
                source: TransitionSource::Window,
            },
            Op::Activation(pick) => Trigger::ActivationSettled {
                ticket: self.ticket(pick),
                result: Ok(()),
            },
            Op::Deactivation(pick) => Trigger::DeactivationSettled {
                ticket: self.ticket(pick),
            },
            Op::Focus(pick) => Trigger::FocusSettled {
                ticket: self.ticket(pick),
            },
            Op::Rested(pick) => Trigger::AnimationRested {
                ticket: self.ticket(pick),
            },
            Op::Timer(pick) => Trigger::TimerFired {
                ticket: self.ticket(pick),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum OpState {
    Running,
    Finished,
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn lifecycle_phases_pair_up_per_operation(ops in prop::collection::vec(op(), 1..60)) {
        let mut machine = TransitionMachine::new(
            MachineConfig::default(),
            Box::new(FixedPolicy::new(vec![200.0, 500.0])),
            DimensionSnapshot::new(800.0, 40.0, 300.0, 60.0),
        );
        let mut host = Host::default();
        let mut operations: HashMap<OperationId, OpState> = HashMap::new();

        for op in &ops {
            let effects = machine.handle(host.trigger(op)).unwrap();
            host.observe(&effects);

            for event in effects.iter().filter_map(Effect::as_event) {
                match event.phase {
                    Phase::Start => {
                        prop_assert!(!operations.contains_key(&event.operation), "restarted {}", event.operation);
                        prop_assert!(
                            operations.values().all(|s| *s == OpState::Finished),
                            "{} started while another operation was running", event.operation
                        );
                        operations.insert(event.operation, OpState::Running);
                    }
                    Phase::Cancel | Phase::End => {
                        let state = operations.get(&event.operation).copied();
                        prop_assert_eq!(state, Some(OpState::Running), "{} finished twice or never started", event.operation);
                        operations.insert(event.operation, OpState::Finished);
                    }
                }
            }
        }
    }

    #[test]
    fn released_drags_commit_to_a_snap_point(ops in prop::collection::vec(op(), 1..60)) {
        let mut machine = TransitionMachine::new(
            MachineConfig::default(),
            Box::new(FixedPolicy::new(vec![150.0, 400.0, 700.0])),
            DimensionSnapshot::new(800.0, 40.0, 300.0, 60.0),
        );
        let mut host = Host::default();

        for op in &ops {
            let dragging = machine.mode() == TransitionMode::Open(OpenStep::Dragging);
            let effects = machine.handle(host.trigger(op)).unwrap();
            host.observe(&effects);

            let settled = matches!(
                machine.mode(),
                TransitionMode::Open(OpenStep::Idle | OpenStep::Snapping)
            );
            if dragging && matches!(op, Op::DragEnd(..)) && settled {
                let committed = machine.committed();
                prop_assert!(
                    machine.snap_points().contains_height(committed.height()),
                    "committed {} outside {}", committed, machine.snap_points()
                );
            }
        }
    }
}
