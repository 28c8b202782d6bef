//! Height animation: a damped spring and the animator built on it.

pub mod driver;
pub mod spring;

pub use driver::SpringAnimator;
pub use spring::{Spring, SpringConfig};
