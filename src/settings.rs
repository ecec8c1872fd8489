//! Engine Settings
//!
//! Plain configuration structs. Every struct implements [`Default`] so only
//! the fields that differ need to be spelled out:
//!
//! ```rust,ignore
//! use gale::settings::{EngineSettings, ParticleSystemSettings};
//!
//! let settings = EngineSettings {
//!     particles: ParticleSystemSettings {
//!         capacity: 1 << 14,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineSettings {
    pub physics: PhysicsSettings,
    pub particles: ParticleSystemSettings,
}

/// Fixed-rate physics stepping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSettings {
    /// Simulation interval in seconds.
    pub step_interval: f32,
    /// Upper bound of accumulated time, in multiples of `step_interval`.
    /// Frames that lag further behind drop the excess instead of stepping
    /// repeatedly.
    pub max_lag_steps: f32,
    /// A disabled clock never requests a step.
    pub enabled: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            step_interval: 1.0 / 60.0,
            max_lag_steps: 2.0,
            enabled: true,
        }
    }
}

/// Shared particle buffer sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleSystemSettings {
    /// Number of particle slots in the GPU buffer.
    pub capacity: u32,
    /// Maximum number of simultaneously live emitters.
    pub max_emitters: u32,
    /// Seed for emission count/frequency sampling.
    pub seed: u64,
}

impl ParticleSystemSettings {
    pub const DEFAULT_CAPACITY: u32 = 1 << 16;
    pub const DEFAULT_MAX_EMITTERS: u32 = 256;
}

impl Default for ParticleSystemSettings {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            max_emitters: Self::DEFAULT_MAX_EMITTERS,
            seed: 0x5eed,
        }
    }
}
