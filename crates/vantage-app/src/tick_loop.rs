//! Fixed-timestep tick loop.
//!
//! Wall-clock time is accumulated and consumed in whole ticks of
//! `1 / tick_rate` seconds, so the session advances at a steady rate no
//! matter how irregularly the host thread wakes up.

use std::time::{Duration, Instant};
use tracing::warn;

/// Maximum frame time clamp to prevent spiral of death.
/// A stall longer than this is accepted as slowdown instead of being
/// replayed as a burst of ticks.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Fixed-timestep tick loop state.
pub struct TickLoop {
    tick_dt: f64,
    previous_time: Instant,
    accumulator: f64,
    tick_count: u64,
}

impl TickLoop {
    /// Creates a loop running `tick_rate` ticks per second (at least one).
    pub fn new(tick_rate: u32) -> Self {
        Self {
            tick_dt: 1.0 / f64::from(tick_rate.max(1)),
            previous_time: Instant::now(),
            accumulator: 0.0,
            tick_count: 0,
        }
    }

    /// Seconds per tick.
    pub fn tick_dt(&self) -> f64 {
        self.tick_dt
    }

    /// Ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time until the next tick is due.
    pub fn time_to_next_tick(&self) -> Duration {
        Duration::from_secs_f64((self.tick_dt - self.accumulator).max(0.0))
    }

    /// Measures elapsed wall-clock time and runs every tick that is due.
    /// `update_fn` receives the tick number. Returns the number of ticks run.
    pub fn advance(&mut self, update_fn: impl FnMut(u64)) -> u32 {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;
        self.advance_by(frame_time, update_fn)
    }

    /// Like [`advance`](Self::advance) with an explicit elapsed time.
    pub fn advance_by(&mut self, frame_time: f64, mut update_fn: impl FnMut(u64)) -> u32 {
        let mut frame_time = frame_time;
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= self.tick_dt {
            update_fn(self.tick_count);
            self.tick_count += 1;
            self.accumulator -= self.tick_dt;
            steps += 1;
        }
        steps
    }
}
