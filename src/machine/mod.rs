//! Transition coordination (pure).
//!
//! Triggers in, effects out. The [`TransitionMachine`] never performs I/O;
//! [`crate::sheet::Sheet`] executes what it returns.

pub mod coordinator;
pub mod effect;
pub mod table;
pub mod trigger;

pub use coordinator::{MachineConfig, TransitionMachine};
pub use effect::Effect;
pub use table::{route, Route};
pub use trigger::{Trigger, TriggerKind};
