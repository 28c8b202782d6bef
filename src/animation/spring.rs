//! Damped harmonic oscillator (spring) integrator.
//!
//! ```text
//! F = -stiffness * (position - target) - damping * velocity
//! ```
//!
//! Positions are in layout pixels and velocities in px/s. Uses semi-implicit
//! Euler integration; large time steps are subdivided for stability.
//!
//! # Invariants
//!
//! 1. A spring at rest stays at rest until `set_target`, `jump_to` or `impulse`.
//! 2. On coming to rest the position snaps exactly to the target.
//! 3. Stiffness is always positive and damping never negative.

use std::time::Duration;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta (px) below which the spring may rest.
const DEFAULT_REST_THRESHOLD: f64 = 0.5;

/// Velocity (px/s) below which the spring may rest.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 5.0;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Stiffness and damping pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    /// Restoring force strength.
    pub stiffness: f64,
    /// Velocity drag.
    pub damping: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        // Critically damped for k = 170
        Self {
            stiffness: 170.0,
            damping: 26.0,
        }
    }
}

/// A damped spring moving a scalar toward a target.
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Spring resting at `position`.
    pub fn new(position: f64, config: SpringConfig) -> Self {
        Self {
            position,
            velocity: 0.0,
            target: position,
            stiffness: config.stiffness.max(MIN_STIFFNESS),
            damping: config.damping.max(0.0),
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: true,
        }
    }

    /// Current position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity (px/s).
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether the spring has settled at its target.
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Retarget. Wakes the spring unless it is already resting on `target`.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
        if (self.position - target).abs() >= self.rest_threshold
            || self.velocity.abs() >= self.velocity_threshold
        {
            self.at_rest = false;
        } else {
            self.position = target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }

    /// Teleport to `position` and rest there.
    pub fn jump_to(&mut self, position: f64) {
        self.position = position;
        self.target = position;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    /// Add to the velocity. Wakes the spring.
    pub fn impulse(&mut self, velocity_delta: f64) {
        if velocity_delta != 0.0 {
            self.velocity += velocity_delta;
            self.at_rest = false;
        }
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }
        let pos_delta = (self.position - self.target).abs();
        if pos_delta < self.rest_threshold && self.velocity.abs() < self.velocity_threshold {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}
