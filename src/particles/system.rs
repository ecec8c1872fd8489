use std::fmt;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::errors::{GaleError, Result};
use crate::particles::allocator::SegmentAllocator;
use crate::particles::emitter::{ParticleEmitter, Segment};
use crate::particles::gpu::{
    CameraMatrices, DrawParams, Emission, EmitterShaderValues, ParticleBackend, ParticleMaterial,
};
use crate::particles::settings::ParticleSettings;
use crate::settings::ParticleSystemSettings;

new_key_type! {
    /// Stable handle to an emitter. Stays valid until that emitter is removed,
    /// regardless of other removals.
    pub struct EmitterKey;
}

/// Shared GPU particle buffer multiplexed across emitters.
///
/// Each emitter reserves a segment sized for its worst case when added and
/// returns it to the free list when removed. Emitters also occupy one of
/// `max_emitters` GPU slots for their per-emitter tables.
pub struct ParticleSystem {
    settings: ParticleSystemSettings,
    allocator: SegmentAllocator,
    emitters: SlotMap<EmitterKey, ParticleEmitter>,
    /// Live emitters in insertion order.
    order: Vec<EmitterKey>,
    free_slots: Vec<u32>,
    materials: FxHashMap<String, ParticleMaterial>,
    backend: Box<dyn ParticleBackend>,
    rng: StdRng,
}

impl ParticleSystem {
    #[must_use]
    pub fn new(settings: ParticleSystemSettings, backend: Box<dyn ParticleBackend>) -> Self {
        Self {
            allocator: SegmentAllocator::new(settings.capacity),
            emitters: SlotMap::with_key(),
            order: Vec::new(),
            free_slots: (0..settings.max_emitters).rev().collect(),
            materials: FxHashMap::default(),
            backend,
            rng: StdRng::seed_from_u64(settings.seed),
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.allocator.capacity()
    }

    /// Total slots held by live emitters.
    #[inline]
    #[must_use]
    pub fn reserved(&self) -> u32 {
        self.allocator.reserved()
    }

    #[must_use]
    pub fn free_ranges(&self) -> &[(u32, u32)] {
        self.allocator.free_ranges()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn max_emitters(&self) -> u32 {
        self.settings.max_emitters
    }

    // ========================================================================
    // Emitters
    // ========================================================================

    /// Adds an emitter drawing with `material`.
    ///
    /// When no free range is large enough the emitter is still created, with
    /// an empty segment at the end of the buffer, and never produces
    /// particles. Only running out of emitter slots is an error.
    pub fn add(&mut self, settings: ParticleSettings, material: &str) -> Result<EmitterKey> {
        let slot = self
            .free_slots
            .pop()
            .ok_or(GaleError::EmitterLimitReached {
                max: self.settings.max_emitters,
            })?;

        let required = settings.required_length();
        let Some(segment) = self.allocator.allocate(required) else {
            log::warn!(
                "Not enough free space for particle emitter ({required} slots requested, {} reserved of {})",
                self.allocator.reserved(),
                self.allocator.capacity()
            );
            let segment = Segment {
                index: self.allocator.capacity(),
                length: 0,
            };
            let key = self.insert(ParticleEmitter::new(settings, segment, slot, material.to_owned()));
            return Ok(key);
        };

        self.backend
            .write_emitter(slot, &EmitterShaderValues::new(segment, settings.gravity));
        let free_stack: Vec<u32> = (0..required).rev().collect();
        self.backend.write_free_stack(segment.index, &free_stack);
        self.backend.write_free_head(slot, required as i32);

        log::debug!(
            "Particle emitter added in slot {slot}: segment {}..{} material '{material}'",
            segment.index,
            segment.end()
        );
        Ok(self.insert(ParticleEmitter::new(settings, segment, slot, material.to_owned())))
    }

    fn insert(&mut self, emitter: ParticleEmitter) -> EmitterKey {
        let key = self.emitters.insert(emitter);
        self.order.push(key);
        key
    }

    /// Removes an emitter and returns its segment to the free list. Handles
    /// of other emitters stay valid.
    pub fn remove(&mut self, key: EmitterKey) -> Result<ParticleEmitter> {
        let emitter = self.emitters.remove(key).ok_or(GaleError::UnknownEmitter)?;
        self.order.retain(|&k| k != key);

        let segment = emitter.segment();
        self.allocator.free(segment);
        self.free_slots.push(emitter.slot());
        if !segment.is_empty() {
            self.backend.reset_segment(segment);
        }

        log::debug!(
            "Particle emitter removed from slot {}: segment {}..{}",
            emitter.slot(),
            segment.index,
            segment.end()
        );
        Ok(emitter)
    }

    #[must_use]
    pub fn contains(&self, key: EmitterKey) -> bool {
        self.emitters.contains_key(key)
    }

    #[must_use]
    pub fn emitter(&self, key: EmitterKey) -> Option<&ParticleEmitter> {
        self.emitters.get(key)
    }

    pub fn emitter_mut(&mut self, key: EmitterKey) -> Option<&mut ParticleEmitter> {
        self.emitters.get_mut(key)
    }

    /// Live emitters in pool order.
    pub fn emitters(&self) -> impl Iterator<Item = (EmitterKey, &ParticleEmitter)> {
        self.order.iter().map(|&k| (k, &self.emitters[k]))
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Registers `material` under `name`, returning the one it replaces.
    pub fn load_material(
        &mut self,
        name: impl Into<String>,
        material: ParticleMaterial,
    ) -> Option<ParticleMaterial> {
        let name = name.into();
        let previous = self.materials.insert(name.clone(), material);
        if previous.is_some() {
            log::debug!("Particle material '{name}' replaced");
        }
        previous
    }

    #[must_use]
    pub fn materials(&self) -> &FxHashMap<String, ParticleMaterial> {
        &self.materials
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Runs emission for every enabled emitter, then one simulation pass over
    /// the allocated prefix of the buffer. Returns the number of particles
    /// emitted.
    pub fn update(&mut self, dt: f32) -> u32 {
        let mut emitted = 0;
        for &key in &self.order {
            let emitter = &mut self.emitters[key];
            if !emitter.enabled || emitter.is_inert() {
                continue;
            }
            emitter.update(dt, &mut self.rng);
            let count = emitter.interval_count().min(emitter.segment().length);
            if count == 0 {
                continue;
            }
            let emission = Emission::new(emitter.settings(), emitter.slot(), count, self.rng.random());
            self.backend.dispatch_emit(&emission);
            emitted += count;
        }

        let simulated = self.allocator.high_water_mark();
        if simulated > 0 {
            self.backend.dispatch_simulate(simulated, dt);
        }
        emitted
    }

    /// Draws every enabled emitter whose material is loaded.
    pub fn draw(&mut self, camera: &CameraMatrices) {
        self.backend.begin_draw(camera);
        for &key in &self.order {
            let emitter = &self.emitters[key];
            if !emitter.enabled || emitter.is_inert() {
                continue;
            }
            let Some(material) = self.materials.get(&emitter.material) else {
                continue;
            };
            self.backend.bind_material(material);
            let settings = emitter.settings();
            self.backend.draw_instanced(&DrawParams {
                base_index: emitter.segment().index,
                instances: emitter.segment().length,
                emissivity: settings.emissivity.to_vec2(),
                stretching: settings.stretching,
            });
        }
    }

    /// Removes every emitter.
    pub fn clear(&mut self) {
        let keys = std::mem::take(&mut self.order);
        for key in keys {
            if let Some(emitter) = self.emitters.remove(key) {
                self.allocator.free(emitter.segment());
                self.free_slots.push(emitter.slot());
                if !emitter.is_inert() {
                    self.backend.reset_segment(emitter.segment());
                }
            }
        }
    }
}

impl fmt::Debug for ParticleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("capacity", &self.capacity())
            .field("reserved", &self.reserved())
            .field("emitters", &self.order.len())
            .field("free_ranges", &self.allocator.free_ranges())
            .field("materials", &self.materials.len())
            .finish_non_exhaustive()
    }
}
