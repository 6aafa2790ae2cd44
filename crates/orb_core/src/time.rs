//! Fixed-timestep frame clock.
//!
//! The simulation advances in fixed 60 Hz slices regardless of display rate:
//! each frame measures the wall-clock delta, feeds an accumulator, and the
//! main loop drains it with `while clock.should_step()`. Physics constants are
//! expressed per fixed step, so slower or faster displays change how many
//! steps run per frame, never how far one step moves the world.

use std::time::Instant;

pub const FIXED_DT: f64 = 1.0 / 60.0;
pub const FIXED_DT_US: u64 = 16_667;

/// Cap on a single frame's measured delta. A stall longer than this (debugger
/// pause, window drag) would otherwise queue a burst of catch-up steps.
const MAX_FRAME_DELTA: f64 = 0.25;

/// Smoothing factor for the fps estimate shown in the debug overlay.
const FPS_EMA_ALPHA: f64 = 0.05;

pub struct FrameClock {
    accumulator: f64,
    last_instant: Instant,
    pub real_dt: f64,
    pub total_time: f64,
    pub frame_count: u64,
    pub fixed_step_count: u64,
    pub steps_this_frame: u32,
    pub smoothed_fps: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            last_instant: Instant::now(),
            real_dt: 0.0,
            total_time: 0.0,
            frame_count: 0,
            fixed_step_count: 0,
            steps_this_frame: 0,
            smoothed_fps: 60.0,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        self.real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

        if self.real_dt > MAX_FRAME_DELTA {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {:.0}ms",
                self.real_dt * 1000.0,
                MAX_FRAME_DELTA * 1000.0
            );
            self.real_dt = MAX_FRAME_DELTA;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        if self.real_dt > 0.0 {
            let instant_fps = 1.0 / self.real_dt;
            self.smoothed_fps += FPS_EMA_ALPHA * (instant_fps - self.smoothed_fps);
        }
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= FIXED_DT {
            self.accumulator -= FIXED_DT;
            self.total_time += FIXED_DT;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulated_time_drains_in_fixed_slices() {
        let mut clock = FrameClock::new();
        clock.accumulator = FIXED_DT * 3.5;
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert!(clock.accumulator < FIXED_DT);
        assert_eq!(clock.steps_this_frame, 3);
    }

    #[test]
    fn no_step_below_one_slice() {
        let mut clock = FrameClock::new();
        clock.accumulator = FIXED_DT * 0.9;
        assert!(!clock.should_step());
        assert_eq!(clock.fixed_step_count, 0);
    }

    #[test]
    fn total_time_tracks_consumed_steps() {
        let mut clock = FrameClock::new();
        clock.accumulator = FIXED_DT * 2.0;
        while clock.should_step() {}
        assert!((clock.total_time - FIXED_DT * 2.0).abs() < 1e-9);
    }
}
