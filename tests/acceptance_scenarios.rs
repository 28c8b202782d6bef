//! Acceptance tests for the end-to-end sheet scenarios.
//!
//! Each test drives a sheet on the virtual clock through
//! [`snapsheet::simulation::Simulation`] and checks what a host would see:
//! lifecycle notifications, the displayed height, and the final mode.

use snapsheet::animation::SpringConfig;
use snapsheet::gesture::{DragFrame, DragPhase};
use snapsheet::model::{OpenStep, TransitionMode};
use snapsheet::simulation::{
    Action, CollaboratorScript, ObserverScript, Record, Simulation, SimulationSetup,
};
use snapsheet::snap::FixedPolicy;
use snapsheet::{MachineConfig, Viewport};

// ===== Helpers =====

fn setup(viewport_height: f64) -> SimulationSetup {
    SimulationSetup {
        machine: MachineConfig::default(),
        spring: SpringConfig::default(),
        viewport: Viewport {
            height: viewport_height,
            max_height: None,
        },
        collaborators: CollaboratorScript::default(),
        observer: ObserverScript::default(),
    }
}

fn measure(sim: &mut Simulation) {
    sim.apply(&Action::Measure {
        header: Some(40.0),
        content: Some(300.0),
        footer: Some(60.0),
    })
    .unwrap();
}

fn lifecycle(sim: &Simulation) -> Vec<String> {
    sim.entries()
        .into_iter()
        .filter_map(|entry| match entry.record {
            Record::Lifecycle(event) => Some(event.to_string()),
            _ => None,
        })
        .collect()
}

fn open() -> Action {
    Action::Open { source: None }
}

fn close() -> Action {
    Action::Close { source: None }
}

fn drag(phase: DragPhase, delta: f64, velocity: f64) -> Action {
    Action::Drag(DragFrame::new(phase, delta, velocity))
}

// ===== Basic open and close =====

#[test]
fn test_basic_open_then_close() {
    // GIVEN: A closed sheet with a single snap point at 300 in a 600px viewport
    let mut sim = Simulation::new(setup(600.0), Box::new(FixedPolicy::new(vec![300.0])));
    measure(&mut sim);

    // WHEN: The host opens it and waits
    sim.apply(&open()).unwrap();
    sim.run_for(1500).unwrap();

    // THEN: The sheet is visible, idle, and at 300
    assert_eq!(sim.sheet().mode(), TransitionMode::Open(OpenStep::Idle));
    assert_eq!(sim.height(), 300.0);
    assert!(sim.is_visible());

    // WHEN: The host closes it
    sim.apply(&close()).unwrap();
    sim.run_for(1500).unwrap();

    // THEN: It animates to 0 and each operation ended exactly once
    assert_eq!(sim.sheet().mode(), TransitionMode::Closed);
    assert_eq!(sim.height(), 0.0);
    assert!(!sim.is_visible());
    assert_eq!(
        lifecycle(&sim),
        [
            "start open (custom)",
            "end open (custom)",
            "start close (custom)",
            "end close (custom)",
        ]
    );
}

// ===== Resize reclamp =====

#[test]
fn test_viewport_shrink_reclamps_to_the_new_max_height() {
    // GIVEN: A sheet open at 500 with snap points [200, 500]
    let policy = FixedPolicy::new(vec![200.0, 500.0]).with_initial(500.0);
    let mut sim = Simulation::new(setup(800.0), Box::new(policy));
    measure(&mut sim);
    sim.apply(&open()).unwrap();
    sim.run_for(1500).unwrap();
    assert_eq!(sim.height(), 500.0);

    // WHEN: The viewport shrinks so the max height becomes 400
    sim.apply(&Action::Viewport { height: 400.0 }).unwrap();
    sim.run_for(1500).unwrap();

    // THEN: The snap points clamp and the sheet resizes to 400
    let heights: Vec<f64> = sim.sheet().snap_points().iter().map(|p| p.height()).collect();
    assert_eq!(heights, [200.0, 400.0]);
    assert_eq!(sim.height(), 400.0);
    assert_eq!(sim.sheet().mode(), TransitionMode::Open(OpenStep::Idle));
    assert_eq!(
        lifecycle(&sim)[2..],
        ["start resize (window)", "end resize (window)"]
    );
}

#[test]
fn test_max_height_override_reclamps_with_its_own_source() {
    // GIVEN: A sheet open at 500
    let policy = FixedPolicy::new(vec![200.0, 500.0]).with_initial(500.0);
    let mut sim = Simulation::new(setup(800.0), Box::new(policy));
    measure(&mut sim);
    sim.apply(&open()).unwrap();
    sim.run_for(1500).unwrap();

    // WHEN: The host lowers the max height override
    sim.apply(&Action::MaxHeight { height: Some(450.0) }).unwrap();
    sim.run_for(1500).unwrap();

    // THEN: The resize is attributed to the override
    assert_eq!(sim.height(), 450.0);
    assert_eq!(
        lifecycle(&sim)[2..],
        ["start resize (maxheight)", "end resize (maxheight)"]
    );
}

// ===== Drag to dismiss =====

#[test]
fn test_fast_downward_drag_dismisses_instead_of_snapping() {
    // GIVEN: A dismissible sheet resting on its lowest snap point (100)
    let mut sim = Simulation::new(
        setup(800.0),
        Box::new(FixedPolicy::new(vec![100.0, 400.0])),
    );
    measure(&mut sim);
    sim.apply(&open()).unwrap();
    sim.run_for(1500).unwrap();
    assert_eq!(sim.height(), 100.0);

    // WHEN: The user drags down 80px and releases at 0.5 px/ms
    sim.apply(&drag(DragPhase::Start, 0.0, 0.0)).unwrap();
    sim.apply(&drag(DragPhase::Move, -60.0, 0.5)).unwrap();
    sim.apply(&drag(DragPhase::End, -80.0, 0.5)).unwrap();
    sim.run_for(1500).unwrap();

    // THEN: The host is asked to dismiss and the sheet closes without snapping back
    let entries = sim.entries();
    let dismiss = entries
        .iter()
        .position(|entry| entry.record == Record::Dismiss)
        .expect("dismiss should be reported");
    let close_start = entries
        .iter()
        .position(|entry| {
            matches!(&entry.record, Record::Lifecycle(event)
                if event.to_string() == "start close (dragging)")
        })
        .expect("close should start");
    assert!(dismiss < close_start);
    assert!(!lifecycle(&sim).iter().any(|line| line.contains("snap")));
    assert_eq!(sim.sheet().mode(), TransitionMode::Closed);
}

#[test]
fn test_slow_short_drag_settles_on_the_nearest_snap_point() {
    // GIVEN: A sheet resting at 100 with snap points [100, 400]
    let mut sim = Simulation::new(
        setup(800.0),
        Box::new(FixedPolicy::new(vec![100.0, 400.0])),
    );
    measure(&mut sim);
    sim.apply(&open()).unwrap();
    sim.run_for(1500).unwrap();

    // WHEN: The user drags up 200px slowly
    sim.apply(&drag(DragPhase::Start, 0.0, 0.0)).unwrap();
    sim.apply(&drag(DragPhase::Move, 150.0, 0.1)).unwrap();
    sim.apply(&drag(DragPhase::End, 200.0, 0.1)).unwrap();
    sim.run_for(1500).unwrap();

    // THEN: It snaps to 400 under the dragging source
    assert_eq!(sim.height(), 400.0);
    assert_eq!(sim.sheet().last_snap().map(|p| p.height()), Some(400.0));
    assert_eq!(
        lifecycle(&sim)[2..],
        ["start snap (dragging)", "end snap (dragging)"]
    );
}

// ===== Interrupted close =====

#[test]
fn test_open_during_close_animation_cancels_the_close() {
    // GIVEN: An open sheet that has started animating closed
    let mut sim = Simulation::new(
        setup(800.0),
        Box::new(FixedPolicy::new(vec![200.0, 500.0])),
    );
    measure(&mut sim);
    sim.apply(&open()).unwrap();
    sim.run_for(1500).unwrap();
    sim.apply(&close()).unwrap();
    sim.run_for(100).unwrap();
    assert!(sim.height() > 0.0 && sim.height() < 200.0);

    // WHEN: The host opens it again mid-animation
    sim.apply(&open()).unwrap();
    sim.run_for(1500).unwrap();

    // THEN: The close is cancelled before the new open starts, and the sheet ends open
    assert_eq!(
        lifecycle(&sim),
        [
            "start open (custom)",
            "end open (custom)",
            "start close (custom)",
            "cancel close (custom)",
            "start open (custom)",
            "end open (custom)",
        ]
    );
    assert_eq!(sim.sheet().mode(), TransitionMode::Open(OpenStep::Idle));
    assert_eq!(sim.height(), 200.0);
    assert!(sim.is_visible());
}
