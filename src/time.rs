//! Frame clock that produces the `(dt, t)` pair fed to [`Engine::advance`].
//!
//! Elapsed time is the sum of the deltas handed out, not wall-clock time since
//! start. That keeps `t` consistent with the `dt` stream when the clock is
//! paused, scaled, clamped or running with a fixed step.
//!
//! # Example
//!
//! ```ignore
//! use erasim::time::Time;
//!
//! let mut time = Time::new().with_max_delta(0.1);
//!
//! loop {
//!     let (t, dt) = time.update();
//!     engine.advance(dt, t);
//! }
//! ```
//!
//! [`Engine::advance`]: crate::Engine::advance

use std::time::{Duration, Instant};

/// Largest delta handed out by default. A stalled frame (debugger, window
/// drag) would otherwise fling every particle across the scene.
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// Frame timing for the engine driver.
#[derive(Debug)]
pub struct Time {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Sum of all deltas handed out so far.
    elapsed_secs: f32,
    /// Delta of the most recent frame.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    paused: bool,
    /// Fixed step used instead of wall-clock deltas.
    fixed_delta: Option<f32>,
    /// Upper bound applied to measured deltas. Fixed steps are not clamped.
    max_delta: f32,
    time_scale: f32,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            fixed_delta: None,
            max_delta: DEFAULT_MAX_DELTA,
            time_scale: 1.0,
        }
    }

    /// Use a fixed step instead of measured frame time. The step is handed
    /// out as is, even when it exceeds `max_delta`.
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.set_fixed_delta(Some(delta));
        self
    }

    /// Clamp measured deltas to at most `max`. Has no effect on a fixed step.
    pub fn with_max_delta(mut self, max: f32) -> Self {
        self.max_delta = max.max(0.0);
        self
    }

    /// Advance the clock. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)`.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.delta_secs = 0.0;
            return (self.elapsed_secs, self.delta_secs);
        }

        let step = match self.fixed_delta {
            Some(fixed) => fixed,
            None => raw.min(self.max_delta),
        };
        self.delta_secs = step * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start, excluding paused frames.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Pause time progression.
    ///
    /// While paused, `delta()` returns 0 and `elapsed()` stops increasing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume time progression after pausing.
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

    /// Set a fixed delta time. Pass `None` to use measured frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.map(|d| d.max(0.0));
    }

    /// Set time scale multiplier (`1.0` = normal speed). Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Reset the clock to its initial state, keeping step settings.
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.paused = false;
    }

    #[inline]
    pub fn delta_duration(&self) -> Duration {
        Duration::from_secs_f32(self.delta_secs)
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
