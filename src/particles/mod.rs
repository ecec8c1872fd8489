//! GPU Particle System
//!
//! A single fixed-capacity particle buffer shared by every emitter:
//!
//! - [`SegmentAllocator`]: first-fit, coalescing free list of buffer ranges
//! - [`ParticleEmitter`]: emission timing and the [`Segment`] it owns
//! - [`ParticleSystem`]: emitter pool with stable [`EmitterKey`] handles,
//!   material map and the per-frame emit/simulate/draw driver
//! - [`ParticleBackend`]: the compute and draw calls, implemented by the
//!   graphics backend
//!
//! # Example
//!
//! ```rust,ignore
//! let key = particles.add(
//!     ParticleSettings {
//!         frequency: Range::splat(60.0),
//!         count: Range::splat(2),
//!         life: Range::new(1.4, 1.7),
//!         ..Default::default()
//!     },
//!     "fire",
//! )?;
//!
//! particles.update(dt);
//! particles.draw(&camera);
//! particles.remove(key)?;
//! ```

pub mod allocator;
pub mod emitter;
pub mod gpu;
pub mod settings;
pub mod system;

pub use allocator::SegmentAllocator;
pub use emitter::{ParticleEmitter, Segment};
pub use gpu::{
    CameraMatrices, DrawParams, Emission, EmitterShaderValues, GpuParticle, ParticleBackend,
    ParticleMaterial, TextureId, WORKGROUP_SIZE, workgroups,
};
pub use settings::{ParticleBlending, ParticleSettings, Range};
pub use system::{EmitterKey, ParticleSystem};
