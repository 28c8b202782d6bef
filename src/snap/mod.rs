//! Snap-point resolution (pure).

pub mod policy;
pub mod resolver;

pub use policy::{
    FitContent, FixedPolicy, FnPolicy, PolicyOutput, SelectionContext, SnapContext, SnapPolicy,
};
pub use resolver::{find_snap, initial_snap, nearest, resolve, SnapTarget, SnapTargetFn};
