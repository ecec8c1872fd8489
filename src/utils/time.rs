use std::time::{Duration, Instant};

/// Source of frame deltas for [`crate::Engine::frame`].
///
/// A wall-clock timer measures real time between ticks; a fixed timer
/// reports the same delta every tick, for replays and headless runs.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    mode: Mode,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    WallClock { last: Instant },
    Fixed(Duration),
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// A wall-clock timer starting now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(Mode::WallClock {
            last: Instant::now(),
        })
    }

    /// A timer advancing by `seconds` on every tick.
    #[must_use]
    pub fn fixed(seconds: f32) -> Self {
        Self::with_mode(Mode::Fixed(Duration::from_secs_f32(seconds.max(0.0))))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the timer and returns the new delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.delta = match &mut self.mode {
            Mode::WallClock { last } => {
                let now = Instant::now();
                let delta = now - *last;
                *last = now;
                delta
            }
            Mode::Fixed(step) => *step,
        };
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.dt_seconds()
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}
