//! Deterministic simulation of a host driving a sheet.
//!
//! Used by the `snapsheet` binary to replay scenario files and by the
//! integration tests to exercise the engine end to end without a UI.

pub mod runtime;
pub mod scenario;
pub mod transcript;

pub use runtime::{
    parse_source, Action, Collaborator, CollaboratorScript, ObserverScript, Simulation,
    SimulationSetup, FRAME_MS,
};
pub use scenario::{Scenario, ScenarioError, Step};
pub use transcript::{Entry, Record, Transcript};
