use rand::rngs::StdRng;
use rand::RngExt;

use crate::particles::settings::ParticleSettings;

/// Contiguous range of particle buffer slots owned by one emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub index: u32,
    pub length: u32,
}

impl Segment {
    #[inline]
    #[must_use]
    pub fn end(&self) -> u32 {
        self.index + self.length
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub fn overlaps(&self, other: &Segment) -> bool {
        !self.is_empty() && !other.is_empty() && self.index < other.end() && other.index < self.end()
    }
}

/// One particle source multiplexed onto the shared buffer.
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    segment: Segment,
    slot: u32,
    timer: f32,
    interval: f32,
    count: u32,
    settings: ParticleSettings,
    pub enabled: bool,
    /// Name of the material in the particle system's material map.
    pub material: String,
}

impl ParticleEmitter {
    pub(crate) fn new(settings: ParticleSettings, segment: Segment, slot: u32, material: String) -> Self {
        Self {
            segment,
            slot,
            timer: 0.0,
            interval: 0.0,
            count: 0,
            settings,
            enabled: true,
            material,
        }
    }

    #[inline]
    #[must_use]
    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Index of the emitter in the GPU-side emitter tables.
    #[inline]
    #[must_use]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Emitters without buffer space never produce particles.
    #[inline]
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.segment.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn next_interval(&self) -> f32 {
        self.interval
    }

    #[inline]
    #[must_use]
    pub fn interval_timer(&self) -> f32 {
        self.timer
    }

    /// Particles to emit for the last update.
    #[inline]
    #[must_use]
    pub fn interval_count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    /// Live tuning. The reserved segment never grows; emissions beyond it
    /// are capped.
    ///
    /// An emitter stopped by a zero frequency restarts on the next update.
    pub fn settings_mut(&mut self) -> &mut ParticleSettings {
        if self.interval.is_infinite() {
            self.interval = 0.0;
            self.timer = 0.0;
        }
        &mut self.settings
    }

    /// Advances the emission timer and accumulates the number of particles
    /// due this frame.
    pub(crate) fn update(&mut self, dt: f32, rng: &mut StdRng) {
        self.count = 0;
        self.timer += dt;
        while self.timer >= self.interval {
            self.timer -= self.interval;

            let frequency = &self.settings.frequency;
            let frequency = if frequency.min < frequency.max {
                rng.random_range(frequency.min..frequency.max)
            } else {
                frequency.min
            };
            if frequency <= 0.0 {
                self.interval = f32::INFINITY;
                break;
            }
            self.interval = 1.0 / frequency;

            let count = &self.settings.count;
            self.count += if count.min < count.max {
                rng.random_range(count.min..count.max)
            } else {
                count.min
            };
        }
    }
}
