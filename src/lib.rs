//! snapsheet
//!
//! Snap-point resolution and transition coordination for draggable bottom
//! sheets.
//!
//! The crate follows a Pure Core / Impure Shell layout. [`model`], [`snap`],
//! [`gesture`] and [`machine`] are pure: the [`machine::TransitionMachine`]
//! turns triggers into effects without touching the platform. [`sheet::Sheet`]
//! is the shell that executes those effects against the collaborator traits in
//! [`ports`]. [`simulation`] hosts a sheet on a virtual clock.

pub mod animation;
pub mod config;
pub mod dimensions;
pub mod gesture;
pub mod logging;
pub mod machine;
pub mod model;
pub mod ports;
pub mod sheet;
pub mod simulation;
pub mod snap;

pub use machine::MachineConfig;
pub use model::{SheetError, TransitionMode, TransitionSource};
pub use sheet::{Ports, Sheet, Viewport};
