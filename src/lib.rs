//! # Gale Engine
//!
//! Runtime core of a physics-driven 3D racing game:
//!
//! - [`scene`]: flat, index-addressed scene graph built once from a loaded
//!   [`assets::SceneAsset`], with copyable reference handles and a per-frame
//!   entity framework.
//! - [`physics`]: the fixed-rate physics clock, body ids and the sensor
//!   contact dispatcher. The rigid-body engine itself plugs in through
//!   [`physics::PhysicsBackend`].
//! - [`particles`]: a shared GPU particle buffer carved into per-emitter
//!   segments by a first-fit, coalescing free-list.
//! - [`engine`]: ties the pieces together into a frame loop.
//!
//! # Example
//!
//! ```rust,ignore
//! use gale::{Engine, EngineSettings};
//!
//! let mut engine = Engine::new(EngineSettings::default(), physics, particle_gpu);
//! gale::entities::register_builtin_entities(engine.factory_mut());
//! engine.load_scene(&asset)?;
//!
//! loop {
//!     let report = engine.frame(timer.tick())?;
//!     engine.draw_particles(&camera);
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod particles;
pub mod physics;
pub mod scene;
pub mod settings;
pub mod utils;

pub use assets::{AssetNode, InstanceAttributes, InstanceBuffer, SceneAsset};
pub use engine::{Engine, FrameReport, Services};
pub use errors::{GaleError, Result};
pub use particles::{EmitterKey, ParticleEmitter, ParticleSettings, ParticleSystem, Range};
pub use physics::{BodyId, PhysicsBackend, PhysicsClock, SensorContact};
pub use scene::{
    Entity, EntityContext, EntityFactory, EntityId, GraphicsRef, NodeRef, PhysicsRef, Scene,
    SceneRef, TransformRef,
};
pub use settings::{EngineSettings, ParticleSystemSettings, PhysicsSettings};
