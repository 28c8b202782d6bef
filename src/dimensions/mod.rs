//! Dimension tracking.
//!
//! Collects region measurements, viewport changes and the max-height override,
//! and hands the machine at most one coalesced snapshot per frame.

pub mod tracker;

pub use tracker::DimensionTracker;
