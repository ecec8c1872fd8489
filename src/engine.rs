//! Engine Core Module
//!
//! [`Engine`] owns the entity factory, the shared [`Services`] and the
//! currently loaded [`Scene`], and drives the fixed per-frame call sequence.
//! It knows nothing about windows or rendering APIs: the physics engine and
//! the particle GPU backend are injected as trait objects.
//!
//! # Frame sequence
//!
//! 1. advance the physics clock by the frame delta
//! 2. `update` on every entity
//! 3. if a physics step is due: `pre_physics_update` on every entity, one
//!    physics step, contact callbacks, `post_physics_update` on every entity
//! 4. particle emission and simulation
//!
//! # Example
//!
//! ```rust,ignore
//! use gale::{Engine, EngineSettings};
//!
//! let mut engine = Engine::new(EngineSettings::default(), Box::new(physics), Box::new(particle_gpu));
//! gale::entities::register_builtin_entities(engine.factory_mut());
//! engine.load_scene(&asset)?;
//!
//! loop {
//!     timer.tick();
//!     let report = engine.frame(timer.dt_seconds())?;
//!     engine.draw_particles(&camera);
//! }
//! ```

use crate::assets::SceneAsset;
use crate::errors::{GaleError, Result};
use crate::particles::{CameraMatrices, ParticleBackend, ParticleSystem};
use crate::physics::{ContactDispatcher, PhysicsBackend, PhysicsClock};
use crate::scene::{DebugDraw, Entity, EntityFactory, EntityId, Scene};
use crate::settings::EngineSettings;

/// Shared systems handed to every entity hook.
pub struct Services {
    pub physics: Box<dyn PhysicsBackend>,
    pub particles: ParticleSystem,
    pub contacts: ContactDispatcher,
    pub clock: PhysicsClock,
}

impl Services {
    #[must_use]
    pub fn new(
        settings: &EngineSettings,
        physics: Box<dyn PhysicsBackend>,
        particle_backend: Box<dyn ParticleBackend>,
    ) -> Self {
        Self {
            physics,
            particles: ParticleSystem::new(settings.particles, particle_backend),
            contacts: ContactDispatcher::new(),
            clock: PhysicsClock::new(&settings.physics),
        }
    }

    /// Steps the physics backend once and consumes the step on the clock.
    /// Contacts of the step are queued in `contacts`.
    pub fn step_physics(&mut self) {
        let interval = self.clock.interval();
        self.physics.step(interval, &mut self.contacts);
        self.clock.consume_step();
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("particles", &self.particles)
            .field("contacts", &self.contacts)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// What happened during one [`Engine::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// A physics step was taken.
    pub stepped: bool,
    /// Interpolation factor between the last two physics states.
    pub partial_ticks: f32,
    /// Particles emitted this frame.
    pub emitted: u32,
}

/// The core engine instance.
///
/// # Lifecycle
///
/// 1. Create with [`Engine::new`]
/// 2. Register entity classes through [`Engine::factory_mut`]
/// 3. [`Engine::load_scene`]
/// 4. [`Engine::frame`] once per rendered frame
pub struct Engine {
    factory: EntityFactory,
    pub services: Services,
    scene: Option<Scene>,

    time: f32,
    frame_count: u64,
}

impl Engine {
    #[must_use]
    pub fn new(
        settings: EngineSettings,
        physics: Box<dyn PhysicsBackend>,
        particle_backend: Box<dyn ParticleBackend>,
    ) -> Self {
        Self {
            factory: EntityFactory::new(),
            services: Services::new(&settings, physics, particle_backend),
            scene: None,
            time: 0.0,
            frame_count: 0,
        }
    }

    pub fn factory_mut(&mut self) -> &mut EntityFactory {
        &mut self.factory
    }

    #[must_use]
    pub fn factory(&self) -> &EntityFactory {
        &self.factory
    }

    #[must_use]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Total elapsed time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Replaces the current scene with one built from `asset`.
    ///
    /// The previous scene is unloaded first. A construction error leaves the
    /// engine without a scene, and without the listeners and emitters the
    /// partially initialized entities created.
    pub fn load_scene(&mut self, asset: &SceneAsset) -> Result<()> {
        self.unload_scene()?;
        match Scene::load(asset, &self.factory, &mut self.services) {
            Ok(scene) => {
                self.scene = Some(scene);
                Ok(())
            }
            Err(err) => {
                log::error!("Scene '{}' failed to load: {err}", asset.name);
                self.clear_leftovers();
                Err(err)
            }
        }
    }

    /// Runs the `destroy` hooks of the current scene and drops it, together
    /// with any particle emitters it left behind.
    pub fn unload_scene(&mut self) -> Result<()> {
        let Some(scene) = self.scene.take() else {
            return Ok(());
        };
        let result = scene.unload(&mut self.services);
        self.clear_leftovers();
        result
    }

    fn clear_leftovers(&mut self) {
        self.services.contacts.drain();
        if !self.services.particles.is_empty() {
            log::debug!(
                "Removing {} particle emitters left behind by the scene",
                self.services.particles.len()
            );
            self.services.particles.clear();
        }
    }

    /// Creates a free entity in the current scene, initialized right away.
    pub fn create_entity<E: Entity>(&mut self, entity: E) -> Result<EntityId> {
        let scene = self
            .scene
            .as_mut()
            .ok_or(GaleError::invalid("scene", u32::MAX))?;
        scene.create(&mut self.services, entity)
    }

    /// Advances one rendered frame. Entity errors abort the frame.
    pub fn frame(&mut self, dt: f32) -> Result<FrameReport> {
        self.time += dt;
        self.frame_count += 1;

        let services = &mut self.services;
        services.clock.advance(dt);

        let mut stepped = false;
        if let Some(scene) = self.scene.as_mut() {
            scene.call_entity_update(services, dt)?;

            if services.clock.is_step_due() {
                scene.call_entity_pre_physics_update(services)?;
                services.step_physics();
                scene.dispatch_contacts(services)?;
                scene.call_entity_post_physics_update(services)?;
                stepped = true;
            }
        } else if services.clock.is_step_due() {
            services.step_physics();
            services.contacts.drain();
            stepped = true;
        }

        let emitted = services.particles.update(dt);

        Ok(FrameReport {
            stepped,
            partial_ticks: services.clock.partial_ticks(),
            emitted,
        })
    }

    pub fn draw_particles(&mut self, camera: &CameraMatrices) {
        self.services.particles.draw(camera);
    }

    /// Runs `debug_draw` on every entity of the current scene.
    pub fn debug_draw(&mut self, draw: &mut dyn DebugDraw) -> Result<()> {
        match self.scene.as_mut() {
            Some(scene) => scene.call_entity_debug_draw(&mut self.services, draw),
            None => Ok(()),
        }
    }
}
