//! Lifecycle notifications emitted to the host.

use super::identifiers::OperationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of logical operation a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Opening the sheet.
    Open,
    /// Closing the sheet.
    Close,
    /// Animating to an explicitly requested or drag-selected height.
    Snap,
    /// Animating to a new valid height after a dimension change.
    Resize,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionKind::Open => "open",
            TransitionKind::Close => "close",
            TransitionKind::Snap => "snap",
            TransitionKind::Resize => "resize",
        };
        f.write_str(s)
    }
}

/// What caused an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionSource {
    /// Imperative call from the host without a named source.
    Custom,
    /// Imperative call from the host with a caller-chosen label.
    Named(String),
    /// The end of a user drag.
    Dragging,
    /// The viewport resized.
    Window,
    /// The controlled `max_height` override changed.
    MaxHeight,
    /// A measured region (header, content, footer) resized.
    Element,
}

impl fmt::Display for TransitionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionSource::Custom => f.write_str("custom"),
            TransitionSource::Named(name) => f.write_str(name),
            TransitionSource::Dragging => f.write_str("dragging"),
            TransitionSource::Window => f.write_str("window"),
            TransitionSource::MaxHeight => f.write_str("maxheight"),
            TransitionSource::Element => f.write_str("element"),
        }
    }
}

/// Position of a notification in an operation's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The operation began.
    Start,
    /// The operation was superseded before completing.
    Cancel,
    /// The operation completed.
    End,
}

/// One lifecycle notification.
///
/// For a given `operation` the phases arrive as `Start` followed by exactly one
/// of `Cancel` or `End`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleEvent {
    /// Lifecycle position.
    pub phase: Phase,
    /// Operation kind.
    pub kind: TransitionKind,
    /// What triggered the operation.
    pub source: TransitionSource,
    /// Identity of the operation.
    pub operation: OperationId,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            Phase::Start => "start",
            Phase::Cancel => "cancel",
            Phase::End => "end",
        };
        write!(f, "{phase} {} ({})", self.kind, self.source)
    }
}
