//! Frame timing.
//!
//! The scene is closed form in time, so there is no fixed-step accumulator:
//! each frame reads the monotonic time since start, plus a clamped `dt` for
//! the spacecraft integrator.

use std::time::Instant;
use tracing::warn;

/// Longest step handed to the integrator. A stalled frame (window drag,
/// breakpoint) would otherwise fling the ship across the scene.
pub const MAX_FRAME_DT: f64 = 0.25;

/// Time values for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock started. Never clamped.
    pub elapsed: f64,
    /// Seconds since the previous frame, at most [`MAX_FRAME_DT`].
    pub dt: f64,
}

pub struct FrameClock {
    start: Instant,
    previous: Instant,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self {
            start,
            previous: start,
            frame_count: 0,
        }
    }

    /// Measure the frame that just ended.
    pub fn tick(&mut self) -> FrameTime {
        self.advance(Instant::now())
    }

    fn advance(&mut self, now: Instant) -> FrameTime {
        let elapsed = now.saturating_duration_since(self.start).as_secs_f64();
        let mut dt = now.saturating_duration_since(self.previous).as_secs_f64();
        self.previous = now;
        self.frame_count += 1;

        if dt > MAX_FRAME_DT {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_DT * 1000.0
            );
            dt = MAX_FRAME_DT;
        }

        FrameTime { elapsed, dt }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
