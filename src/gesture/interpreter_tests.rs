//! Tests for drag gesture interpretation.

use super::*;
use crate::model::SnapPoint;

fn snaps(points: &[u32]) -> SnapPointSet {
    SnapPointSet::from_points(points.iter().copied().map(SnapPoint::from)).unwrap()
}

fn interpreter(dismissible: bool) -> GestureInterpreter {
    GestureInterpreter::new(GestureConfig {
        dismissible,
        ..GestureConfig::default()
    })
}

fn frame(phase: DragPhase, delta: f64, velocity: f64) -> DragFrame {
    DragFrame::new(phase, delta, velocity)
}

// ===== While dragging =====

#[test]
fn move_follows_finger_inside_bounds() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(300.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::Move, 50.0, 0.2), &set)
        .unwrap();

    assert_eq!(out.target_height, 350.0);
    assert!(!out.should_dismiss);
    assert!(!out.should_cancel);
}

#[test]
fn move_above_max_snap_is_rubber_banded() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(400.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::Move, 200.0, 0.2), &set)
        .unwrap();

    assert!(out.target_height > 400.0);
    assert!(out.target_height < 600.0);
}

#[test]
fn move_below_min_snap_without_dismiss_is_rubber_banded() {
    let gi = interpreter(false);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(100.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::Move, -80.0, 0.2), &set)
        .unwrap();

    assert!(out.target_height < 100.0);
    assert!(out.target_height > 20.0, "resistance should hold it above raw");
}

#[test]
fn move_below_zero_is_never_negative() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(100.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::Move, -5_000.0, 3.0), &set)
        .unwrap();

    assert!(out.target_height >= 0.0);
}

#[test]
fn single_snap_point_without_dismiss_still_resists_both_ways() {
    let gi = interpreter(false);
    let set = snaps(&[300]);

    let mut up = gi.begin(300.0, false);
    let pulled_up = gi
        .on_drag_frame(&mut up, &frame(DragPhase::Move, 100.0, 0.1), &set)
        .unwrap()
        .target_height;

    let mut down = gi.begin(300.0, false);
    let pulled_down = gi
        .on_drag_frame(&mut down, &frame(DragPhase::Move, -100.0, 0.1), &set)
        .unwrap()
        .target_height;

    assert!(pulled_up > 300.0);
    assert!(pulled_up < 400.0);
    assert!(pulled_down < 300.0);
    assert!(pulled_down > 200.0);
}

#[test]
fn content_drag_stops_at_max_snap() {
    let gi = GestureInterpreter::new(GestureConfig {
        expand_on_content_drag: true,
        ..GestureConfig::default()
    });
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(380.0, true);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::Move, 100.0, 0.2), &set)
        .unwrap();

    assert_eq!(out.target_height, 400.0);
}

#[test]
fn session_tracks_dismiss_intent_while_dragging() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(100.0, false);

    gi.on_drag_frame(&mut session, &frame(DragPhase::Move, -80.0, 0.5), &set)
        .unwrap();

    assert!(session.will_dismiss);
}

// ===== On release =====

#[test]
fn release_snaps_to_nearest_of_predicted_height() {
    let gi = interpreter(true);
    let set = snaps(&[100, 250, 400]);
    let mut session = gi.begin(250.0, false);

    // raw 280, predicted 280 + 30 * 0.5 * 2 = 310 -> nearest 250
    let slow = gi
        .on_drag_frame(&mut session, &frame(DragPhase::End, 30.0, 0.5), &set)
        .unwrap();
    assert_eq!(slow.target_height, 250.0);

    // raw 280, predicted 280 + 30 * 2 * 2 = 400 -> 400
    let mut session = gi.begin(250.0, false);
    let fling = gi
        .on_drag_frame(&mut session, &frame(DragPhase::End, 30.0, 2.0), &set)
        .unwrap();
    assert_eq!(fling.target_height, 400.0);
    assert_eq!(fling.velocity, 2.0);
}

#[test]
fn release_prediction_is_clamped_to_snap_bounds() {
    let gi = interpreter(false);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(400.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::End, 200.0, 5.0), &set)
        .unwrap();

    assert_eq!(out.target_height, 400.0);
}

#[test]
fn release_negligible_velocity_uses_floor() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(300.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::End, 50.0, 0.01), &set)
        .unwrap();

    assert_eq!(out.velocity, 1.0);
}

#[test]
fn release_far_below_min_dismisses() {
    // minSnap 100, raw 20, predicted distance pushes below 50
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(100.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::End, -80.0, 0.5), &set)
        .unwrap();

    assert!(out.should_dismiss);
    assert!(!out.should_cancel);
}

#[test]
fn release_below_min_without_dismiss_snaps_back() {
    let gi = interpreter(false);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(100.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::End, -80.0, 0.5), &set)
        .unwrap();

    assert!(!out.should_dismiss);
    assert_eq!(out.target_height, 100.0);
}

#[test]
fn release_moving_up_never_dismisses() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(100.0, false);

    let f = frame(DragPhase::End, -80.0, 0.5).with_direction(DragDirection::Up);
    let out = gi.on_drag_frame(&mut session, &f, &set).unwrap();

    assert!(!out.should_dismiss);
}

#[test]
fn micro_drag_release_is_cancelled() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(400.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::End, -2.0, 0.0), &set)
        .unwrap();

    assert!(out.should_cancel);
    assert!(!out.should_dismiss);
    assert_eq!(out.target_height, 400.0);
}

#[test]
fn backdrop_tap_dismisses_when_dismissible() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(400.0, false);

    let f = frame(DragPhase::End, 0.0, 0.0).closing_tap();
    let out = gi.on_drag_frame(&mut session, &f, &set).unwrap();

    assert!(out.should_dismiss);
    assert!(!out.should_cancel);
}

#[test]
fn backdrop_tap_is_cancel_when_not_dismissible() {
    let gi = interpreter(false);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(400.0, false);

    let f = frame(DragPhase::End, 0.0, 0.0).closing_tap();
    let out = gi.on_drag_frame(&mut session, &f, &set).unwrap();

    assert!(out.should_cancel);
}

#[test]
fn non_finite_frame_values_are_ignored() {
    let gi = interpreter(true);
    let set = snaps(&[100, 400]);
    let mut session = gi.begin(300.0, false);

    let out = gi
        .on_drag_frame(&mut session, &frame(DragPhase::Move, f64::NAN, f64::INFINITY), &set)
        .unwrap();

    assert_eq!(out.target_height, 300.0);
}
