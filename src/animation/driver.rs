//! Spring-backed implementation of the [`Animator`] port.

use super::spring::{Spring, SpringConfig};
use crate::model::Ticket;
use crate::ports::{AnimationConfig, Animator};
use std::time::Duration;
use tracing::trace;

/// Gesture velocities arrive in px/ms; the spring integrates in px/s.
const MS_PER_SECOND: f64 = 1000.0;

/// Drives the sheet height with a [`Spring`] and reports rest by ticket.
///
/// The host ticks it once per frame and forwards any returned ticket to
/// `Sheet::animation_rested`.
#[derive(Debug, Clone)]
pub struct SpringAnimator {
    spring: Spring,
    config: SpringConfig,
    pending: Option<Ticket>,
    visible: bool,
}

impl SpringAnimator {
    /// Hidden animator resting at zero.
    pub fn new(config: SpringConfig) -> Self {
        Self {
            spring: Spring::new(0.0, config),
            config,
            pending: None,
            visible: false,
        }
    }

    /// Spring constants in use.
    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Whether the sheet is currently painted.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether an animation is waiting to report rest.
    pub fn is_animating(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance one frame. Returns the ticket of an animation that came to rest.
    ///
    /// Immediate animations report on the first tick after they were issued.
    pub fn tick(&mut self, dt: Duration) -> Option<Ticket> {
        self.pending?;
        self.spring.advance(dt);
        trace!(position = self.spring.position(), "Spring frame");
        if self.spring.is_at_rest() {
            self.pending.take()
        } else {
            None
        }
    }
}

impl Animator for SpringAnimator {
    fn value(&self) -> f64 {
        self.spring.position()
    }

    fn jump_to(&mut self, value: f64) {
        self.pending = None;
        self.spring.jump_to(value);
    }

    fn animate_to(&mut self, ticket: Ticket, target: f64, config: AnimationConfig) {
        self.pending = Some(ticket);
        if config.immediate {
            self.spring.jump_to(target);
            return;
        }
        let was_resting = self.spring.is_at_rest();
        self.spring.set_target(target);
        if was_resting && !self.spring.is_at_rest() {
            let direction = (target - self.spring.position()).signum();
            self.spring
                .impulse(direction * config.velocity.abs() * MS_PER_SECOND);
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn run(animator: &mut SpringAnimator, frames: usize) -> Option<Ticket> {
        (0..frames).find_map(|_| animator.tick(FRAME))
    }

    #[test]
    fn smooth_animation_reports_rest_with_its_ticket() {
        let mut animator = SpringAnimator::new(SpringConfig::default());
        animator.animate_to(Ticket::new(4), 300.0, AnimationConfig::smooth(0.0));

        assert_eq!(animator.tick(FRAME), None);
        assert_eq!(run(&mut animator, 600), Some(Ticket::new(4)));
        assert_eq!(animator.value(), 300.0);
        assert!(!animator.is_animating());
    }

    #[test]
    fn immediate_animation_reports_on_next_tick() {
        let mut animator = SpringAnimator::new(SpringConfig::default());
        animator.animate_to(Ticket::new(2), 250.0, AnimationConfig::immediate());

        assert_eq!(animator.value(), 250.0);
        assert_eq!(animator.tick(FRAME), Some(Ticket::new(2)));
    }

    #[test]
    fn retarget_replaces_pending_ticket() {
        let mut animator = SpringAnimator::new(SpringConfig::default());
        animator.animate_to(Ticket::new(1), 300.0, AnimationConfig::smooth(0.0));
        animator.tick(FRAME);
        animator.animate_to(Ticket::new(2), 100.0, AnimationConfig::smooth(0.0));

        assert_eq!(run(&mut animator, 600), Some(Ticket::new(2)));
        assert_eq!(animator.value(), 100.0);
    }

    #[test]
    fn jump_interrupts_without_reporting() {
        let mut animator = SpringAnimator::new(SpringConfig::default());
        animator.animate_to(Ticket::new(1), 300.0, AnimationConfig::smooth(0.0));
        animator.jump_to(80.0);

        assert_eq!(run(&mut animator, 10), None);
        assert_eq!(animator.value(), 80.0);
    }

    #[test]
    fn idle_tick_reports_nothing() {
        let mut animator = SpringAnimator::new(SpringConfig::default());
        assert_eq!(animator.tick(FRAME), None);
    }
}
