//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod dimensions;
pub mod error;
pub mod identifiers;
pub mod lifecycle;
pub mod mode;
pub mod snap_point;

// Re-export for convenience
pub use dimensions::{DimensionSnapshot, Region};
pub use error::{CollaboratorError, Diagnostic, InvalidHeight, SheetError};
pub use identifiers::{ObservationId, OperationId, Sequence, Ticket};
pub use lifecycle::{LifecycleEvent, Phase, TransitionKind, TransitionSource};
pub use mode::{ClosingStep, OpenStep, OpeningStep, TransitionMode};
pub use snap_point::{round_height, SnapPoint, SnapPointSet};
