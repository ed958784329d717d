/// Frame timing for the simulation
///
/// The host calls into the simulation once per animation frame with the raw
/// time since the previous frame. Every delta is clamped to a ceiling so a
/// stalled frame can never hand the resolver a giant step; its corrections
/// are fixed-magnitude and only stable for small steps.

/// Nominal tick length in milliseconds (60 Hz)
pub const TICK_MS: f64 = 16.667;

/// Game loop timing state
#[derive(Debug)]
pub struct GameLoop {
    /// Length of one tick in milliseconds
    tick_ms: f64,

    /// Ceiling applied to every frame delta
    max_frame_ms: f64,

    /// Current frame number
    frame_count: u64,

    /// Simulated time, sum of clamped deltas
    elapsed_ms: f64,
}

impl GameLoop {
    /// Create a new game loop
    pub fn new(tick_ms: f64, max_frame_ms: f64) -> Self {
        Self {
            tick_ms,
            max_frame_ms,
            frame_count: 0,
            elapsed_ms: 0.0,
        }
    }

    /// Begin a new frame, returning the clamped delta in milliseconds
    ///
    /// Negative or non-finite deltas become zero-length frames.
    pub fn begin_frame(&mut self, raw_delta_ms: f64) -> f64 {
        self.frame_count += 1;

        let raw = if raw_delta_ms.is_finite() {
            raw_delta_ms.max(0.0)
        } else {
            0.0
        };

        let delta = raw.min(self.max_frame_ms);
        self.elapsed_ms += delta;
        delta
    }

    /// Express a millisecond delta in ticks
    pub fn ticks(&self, delta_ms: f64) -> f32 {
        (delta_ms / self.tick_ms) as f32
    }

    /// Simulated time since the loop started, paused frames included
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Get total number of frames
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new(TICK_MS, TICK_MS)
    }
}
