//! Frame timing.
//!
//! [`FrameClock`] turns wall-clock time into the per-frame deltas fed to
//! [`FlightSim::on_frame`](crate::FlightSim::on_frame). Deltas are capped at
//! `max_delta` so a long stall (minimized window, debugger break) shows up
//! as one ordinary step instead of a huge integration jump.
//!
//! # Example
//!
//! ```ignore
//! use skytrail::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//!
//! // In the redraw handler:
//! let delta = clock.tick();
//! sim.on_frame(delta);
//! ```

use std::time::{Duration, Instant};

/// Default cap on a single frame's delta, in seconds.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Wall-clock frame timer with pause, time scale, and delta clamping.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    /// Clamped, scaled delta of the last tick.
    delta_secs: f32,
    /// Unclamped delta of the last tick, before scaling.
    raw_delta_secs: f32,
    /// Sum of delivered deltas.
    elapsed_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    fixed_delta: Option<f32>,
    time_scale: f32,
    max_delta: f32,
}

impl FrameClock {
    /// Create a clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            raw_delta_secs: 0.0,
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Set the per-frame delta cap.
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    /// Advance one frame and return the delta to simulate.
    ///
    /// Returns `0.0` while paused.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.raw_delta_secs = 0.0;
            self.delta_secs = 0.0;
            return 0.0;
        }

        self.raw_delta_secs = self.fixed_delta.unwrap_or(raw);
        self.delta_secs = (self.raw_delta_secs * self.time_scale).min(self.max_delta);
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    /// Delta returned by the last [`tick`](Self::tick).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Simulated time: the sum of all delivered deltas.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Wall-clock time since the clock was created or reset.
    #[inline]
    pub fn wall_time(&self) -> Duration {
        self.start.elapsed()
    }

    /// Whether the last tick hit the delta cap.
    #[inline]
    pub fn was_clamped(&self) -> bool {
        !self.paused && self.raw_delta_secs * self.time_scale > self.max_delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Stop delivering time. Ticks return `0.0` until resumed.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. The paused interval is not delivered.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a fixed delta instead of wall-clock time. `None` restores real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Set time scale multiplier. Negative values clamp to `0.0`.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Restart from zero, keeping configuration (cap, scale, fixed delta).
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_frame = now;
        self.delta_secs = 0.0;
        self.raw_delta_secs = 0.0;
        self.elapsed_secs = 0.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = now;
        self.paused = false;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
