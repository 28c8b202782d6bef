//! Drag frames and the per-gesture session.

use serde::{Deserialize, Serialize};

/// Position of a frame within one drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    /// Pointer went down; first frame of the gesture.
    Start,
    /// Pointer moved while down.
    Move,
    /// Pointer released; last frame of the gesture.
    End,
}

/// Vertical direction of the most recent pointer movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DragDirection {
    /// Toward the top of the viewport (height grows).
    Up,
    /// Toward the bottom of the viewport (height shrinks).
    Down,
    /// No vertical movement.
    #[default]
    Still,
}

/// One pointer frame, already converted to deltas by the gesture library.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragFrame {
    /// Accumulated vertical movement since the gesture started, in height
    /// space: positive when dragging up.
    pub delta: f64,
    /// Pointer speed (magnitude) in px/ms.
    pub velocity: f64,
    /// Direction of the latest movement.
    #[serde(default)]
    pub direction: DragDirection,
    /// Lifecycle position.
    pub phase: DragPhase,
    /// The gesture library flagged this press-and-release as a tap.
    #[serde(default)]
    pub tap: bool,
    /// A tap on this target should dismiss (e.g. the backdrop).
    #[serde(default)]
    pub close_on_tap: bool,
    /// The drag started on the content region rather than the header/handle.
    #[serde(default)]
    pub from_content: bool,
}

impl DragFrame {
    /// Frame with the given phase and movement, no tap flags.
    pub fn new(phase: DragPhase, delta: f64, velocity: f64) -> Self {
        let direction = if delta > 0.0 {
            DragDirection::Up
        } else if delta < 0.0 {
            DragDirection::Down
        } else {
            DragDirection::Still
        };
        Self {
            delta,
            velocity,
            direction,
            phase,
            tap: false,
            close_on_tap: false,
            from_content: false,
        }
    }

    /// Override the direction.
    pub fn with_direction(mut self, direction: DragDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Mark as a tap on a dismissing target.
    pub fn closing_tap(mut self) -> Self {
        self.tap = true;
        self.close_on_tap = true;
        self
    }

    /// Mark as originating on the content region.
    pub fn from_content(mut self) -> Self {
        self.from_content = true;
        self
    }
}

/// State of one drag gesture. Exists only while the sheet is `Open.Dragging`.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Height when the pointer went down.
    pub memo: f64,
    /// Latest accumulated movement (height space).
    pub delta: f64,
    /// Latest pointer speed.
    pub velocity: f64,
    /// Whether releasing now would dismiss the sheet.
    pub will_dismiss: bool,
    /// The gesture started on the content region.
    pub from_content: bool,
}

impl DragSession {
    /// Session anchored at `memo`.
    pub fn new(memo: f64, from_content: bool) -> Self {
        Self {
            memo,
            delta: 0.0,
            velocity: 0.0,
            will_dismiss: false,
            from_content,
        }
    }

    /// Height directly under the finger, before any resistance.
    pub fn raw_height(&self) -> f64 {
        self.memo + self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_derives_direction_from_delta() {
        assert_eq!(
            DragFrame::new(DragPhase::Move, 10.0, 0.1).direction,
            DragDirection::Up
        );
        assert_eq!(
            DragFrame::new(DragPhase::Move, -10.0, 0.1).direction,
            DragDirection::Down
        );
        assert_eq!(
            DragFrame::new(DragPhase::Move, 0.0, 0.0).direction,
            DragDirection::Still
        );
    }

    #[test]
    fn raw_height_adds_delta_to_memo() {
        let mut session = DragSession::new(300.0, false);
        session.delta = -40.0;
        assert_eq!(session.raw_height(), 260.0);
    }
}
