//! Drag gesture interpretation (pure).

pub mod interpreter;
pub mod rubber_band;
pub mod session;

pub use interpreter::{DragOutcome, GestureConfig, GestureInterpreter};
pub use rubber_band::{rubber_band, rubber_band_if_out_of_bounds};
pub use session::{DragDirection, DragFrame, DragPhase, DragSession};
