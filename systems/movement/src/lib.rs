#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement clock that converts snake speed into discrete step commands.
//!
//! Speed is measured in cells per second, so the step interval is `1 / speed`.
//! Elapsed simulated time accumulates across frames and a step is issued only
//! once a full interval has passed since the previous step. Frame rate and
//! simulation rate stay decoupled and a speed change takes effect on the very
//! next interval.

use std::time::Duration;

use dark_snake_core::{Command, Event, GameMode, MIN_SPEED};

/// Pure system that reacts to elapsed time and emits [`Command::StepSnakes`].
#[derive(Debug, Default)]
pub struct Movement {
    accumulator: Duration,
}

impl Movement {
    /// Consumes world events and the current speed to emit at most one step per frame.
    pub fn handle(&mut self, events: &[Event], mode: GameMode, speed: f32, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::GameStarted { .. } => self.accumulator = Duration::ZERO,
                Event::TimeAdvanced { dt, .. } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }

        if !mode.is_active() || elapsed.is_zero() {
            return;
        }

        let interval = step_interval(speed);
        self.accumulator = self.accumulator.saturating_add(elapsed);
        if self.accumulator < interval {
            return;
        }

        // The clock restarts at every step, so consecutive steps are always
        // at least one interval apart.
        self.accumulator = Duration::ZERO;
        out.push(Command::StepSnakes);
    }
}

/// Time between movement steps at `speed` cells per second.
#[must_use]
pub fn step_interval(speed: f32) -> Duration {
    let speed = if speed.is_finite() {
        speed.max(MIN_SPEED)
    } else {
        MIN_SPEED
    };
    Duration::from_secs_f32(1.0 / speed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_the_reciprocal_of_speed() {
        assert_eq!(step_interval(8.0), Duration::from_millis(125));
        assert_eq!(step_interval(0.0), Duration::from_secs(1));
        assert_eq!(step_interval(f32::NAN), Duration::from_secs(1));
    }

    fn tick(dt: Duration) -> [Event; 1] {
        [Event::TimeAdvanced { dt, now: dt }]
    }

    #[test]
    fn long_frame_does_not_shorten_the_next_interval() {
        let mut movement = Movement::default();
        let mut commands = Vec::new();
        movement.handle(
            &tick(Duration::from_secs(5)),
            GameMode::Playing,
            8.0,
            &mut commands,
        );
        assert_eq!(commands, vec![Command::StepSnakes]);

        commands.clear();
        movement.handle(
            &tick(Duration::from_millis(16)),
            GameMode::Playing,
            8.0,
            &mut commands,
        );
        assert!(commands.is_empty());
        assert_eq!(movement.accumulator, Duration::from_millis(16));
    }

    #[test]
    fn steps_are_spaced_by_at_least_one_interval() {
        let mut movement = Movement::default();
        let frames = [40_u64, 200, 10, 60, 60, 5, 300, 16, 16, 16, 16, 16, 16, 16, 16];
        let mut since_step = Duration::ZERO;
        let mut steps = 0;
        for millis in frames {
            let dt = Duration::from_millis(millis);
            since_step += dt;
            let mut commands = Vec::new();
            movement.handle(&tick(dt), GameMode::Playing, 8.0, &mut commands);
            if !commands.is_empty() {
                assert!(since_step >= step_interval(8.0), "stepped after {since_step:?}");
                since_step = Duration::ZERO;
                steps += 1;
            }
        }
        assert_eq!(steps, 4);
    }
}
