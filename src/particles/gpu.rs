//! GPU-side layouts and the compute/draw backend interface.

use bytemuck::{Pod, Zeroable};
use glam::{IVec4, Mat4, Vec2, Vec3, Vec4};

use crate::particles::emitter::Segment;
use crate::particles::settings::{ParticleBlending, ParticleSettings};

/// Threads per compute work group.
pub const WORKGROUP_SIZE: u32 = 64;

/// Work groups needed to cover `count` invocations.
#[inline]
#[must_use]
pub fn workgroups(count: u32) -> u32 {
    count.div_ceil(WORKGROUP_SIZE)
}

/// One particle in the shared buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuParticle {
    /// xyz position, w rotation
    pub position_rotation: Vec4,
    /// xyz velocity, w rotation speed
    pub velocity_revolutions: Vec4,
    /// x drag, y gravity factor, z random seed
    pub drag_gravity_rand: Vec4,
    /// xy size, z life remaining, w life total
    pub size_life: Vec4,
    pub emitter: i32,
    pub _pad: [i32; 3],
}

/// Per-emitter values read by the simulation shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EmitterShaderValues {
    /// x segment start, y segment length
    pub index_length: IVec4,
    /// xyz gravity
    pub gravity: Vec4,
}

impl EmitterShaderValues {
    #[must_use]
    pub fn new(segment: Segment, gravity: Vec3) -> Self {
        Self {
            index_length: IVec4::new(segment.index as i32, segment.length as i32, 0, 0),
            gravity: gravity.extend(0.0),
        }
    }
}

/// Uniforms of one emission dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub direction: Vec4,
    /// Spread in radians.
    pub spread: Vec2,
    pub velocity: Vec2,
    pub life: Vec2,
    pub position: Vec3,
    /// xy rotation range, zw revolutions per frame at 60 Hz
    pub rotation_revolutions: Vec4,
    pub size: Vec2,
    pub scale: Vec2,
    pub drag: Vec2,
    pub gravity: Vec2,
    /// Emitter slot.
    pub index: u32,
    pub count: u32,
    pub seed: u32,
}

impl Emission {
    #[must_use]
    pub fn new(settings: &ParticleSettings, slot: u32, count: u32, seed: u32) -> Self {
        Self {
            direction: settings.direction.normalize_or_zero().extend(0.0),
            spread: Vec2::new(
                settings.spread.min.to_radians(),
                settings.spread.max.to_radians(),
            ),
            velocity: settings.velocity.to_vec2(),
            life: settings.life.to_vec2(),
            position: settings.position,
            rotation_revolutions: Vec4::new(
                settings.rotation.min,
                settings.rotation.max,
                settings.revolutions.min / 60.0,
                settings.revolutions.max / 60.0,
            ),
            size: settings.size,
            scale: settings.scale.to_vec2(),
            drag: settings.drag.to_vec2(),
            gravity: settings.gravity_factor.to_vec2(),
            index: slot,
            count,
            seed,
        }
    }
}

/// Per-draw uniforms of one emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub base_index: u32,
    pub instances: u32,
    pub emissivity: Vec2,
    pub stretching: f32,
}

/// Opaque texture handle issued by the graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Textures and blend mode of a particle material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleMaterial {
    pub blending: ParticleBlending,
    pub sprite: TextureId,
    /// 1D array: colour over life.
    pub tint: TextureId,
    /// 2D: scale over life.
    pub scale: TextureId,
}

/// View and projection for particle drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

/// The compute and draw calls the particle system issues.
///
/// Buffers owned by the backend:
/// - particle buffer, `capacity` × [`GpuParticle`]
/// - free-index buffer, `capacity` × `u32`; each segment holds a stack of
///   segment-relative free indices
/// - free-head buffer, one `i32` stack height per emitter slot
/// - emitter buffer, one [`EmitterShaderValues`] per emitter slot
pub trait ParticleBackend {
    fn write_emitter(&mut self, slot: u32, values: &EmitterShaderValues);

    /// Writes `stack` into the free-index buffer starting at `offset`.
    fn write_free_stack(&mut self, offset: u32, stack: &[u32]);

    fn write_free_head(&mut self, slot: u32, head: i32);

    /// Kills every particle of `segment` and resets its free stack.
    fn reset_segment(&mut self, segment: Segment);

    fn dispatch_emit(&mut self, emission: &Emission);

    /// Simulates particles `0..count`.
    fn dispatch_simulate(&mut self, count: u32, dt: f32);

    fn begin_draw(&mut self, camera: &CameraMatrices);

    fn bind_material(&mut self, material: &ParticleMaterial);

    fn draw_instanced(&mut self, params: &DrawParams);
}
