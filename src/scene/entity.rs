//! Entity Framework
//!
//! Entities are boxed [`Entity`] trait objects owned by the [`Scene`]'s
//! entity list. A *node entity* is created by the scene builder for every
//! asset node declaring an entity class and keeps that node as its `base`;
//! a *free entity* has no base and is created at runtime through
//! [`EntityContext::create`] or [`Scene::create`].
//!
//! # Lifecycle
//!
//! 1. Constructed by the [`EntityFactory`] (node entities) or by game code
//! 2. `init` exactly once: in bulk after the scene is built, or right away
//!    when created after that bulk pass
//! 3. Per frame: `update`; around each physics step `pre_physics_update`,
//!    the step, contact callbacks, `post_physics_update`
//! 4. `destroy` when the scene unloads
//!
//! Hooks return [`Result`]; an error aborts the current pass and propagates
//! to the caller unchanged.
//!
//! [`Scene`]: super::Scene
//! [`Scene::create`]: super::Scene::create

use std::any::Any;
use std::fmt;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::engine::Services;
use crate::errors::{GaleError, Result};
use crate::particles::ParticleSystem;
use crate::physics::{BodyId, ContactDispatcher, PhysicsBackend, SensorContact};
use crate::scene::handles::{NodeRef, SceneRef};
use crate::scene::store::NodeStore;

/// Position of an entity in its scene's entity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Line-drawing sink for [`Entity::debug_draw`].
pub trait DebugDraw {
    fn line(&mut self, from: Vec3, to: Vec3, color: Vec3);

    fn point(&mut self, at: Vec3, size: f32, color: Vec3);
}

/// Behaviour attached to a scene.
///
/// Every hook has an empty default so entities only implement what they
/// need.
#[allow(unused_variables)]
pub trait Entity: Any {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Once per rendered frame.
    fn update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Before every physics step.
    fn pre_physics_update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        Ok(())
    }

    /// After every physics step and its contact callbacks.
    fn post_physics_update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        Ok(())
    }

    /// A sensor body this entity listens on reported a contact.
    fn on_contact(&mut self, ctx: &mut EntityContext<'_>, contact: SensorContact) -> Result<()> {
        Ok(())
    }

    fn debug_draw(&mut self, ctx: &mut EntityContext<'_>, draw: &mut dyn DebugDraw) -> Result<()> {
        Ok(())
    }

    /// The scene is being unloaded.
    fn destroy(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Construction of node entities from their base node.
pub trait FromNode: Entity + Sized {
    fn from_node(base: NodeRef) -> Self;
}

pub(crate) struct EntityEntry {
    pub(crate) id: EntityId,
    pub(crate) class: String,
    pub(crate) base: Option<NodeRef>,
    pub(crate) behavior: Box<dyn Entity>,
}

impl fmt::Debug for EntityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityEntry")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// Timing passed to hooks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Frame delta for `update`, the step interval for physics hooks.
    pub dt: f32,
    /// Progress towards the next physics step in `[0, 1]`.
    pub partial_ticks: f32,
}

/// Everything an entity hook may touch.
pub struct EntityContext<'a> {
    pub(crate) nodes: &'a mut NodeStore,
    pub(crate) services: &'a mut Services,
    pub(crate) time: FrameTime,
    pub(crate) id: EntityId,
    pub(crate) base: Option<NodeRef>,
    pub(crate) spawned: &'a mut Vec<EntityEntry>,
    pub(crate) next_id: u32,
}

impl EntityContext<'_> {
    #[inline]
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Base node of a node entity. Free entities get an invalid reference
    /// error.
    pub fn base(&self) -> Result<NodeRef> {
        self.base.ok_or(GaleError::invalid("node", u32::MAX))
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> SceneRef {
        SceneRef::of(&*self.nodes)
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &NodeStore {
        &*self.nodes
    }

    #[inline]
    pub fn nodes_mut(&mut self) -> &mut NodeStore {
        &mut *self.nodes
    }

    #[inline]
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.time.dt
    }

    #[inline]
    #[must_use]
    pub fn partial_ticks(&self) -> f32 {
        self.time.partial_ticks
    }

    pub fn services(&mut self) -> &mut Services {
        &mut *self.services
    }

    pub fn physics(&mut self) -> &mut dyn PhysicsBackend {
        self.services.physics.as_mut()
    }

    pub fn particles(&mut self) -> &mut ParticleSystem {
        &mut self.services.particles
    }

    pub fn contacts(&mut self) -> &mut ContactDispatcher {
        &mut self.services.contacts
    }

    /// Routes sensor contacts of `body` to this entity's `on_contact`.
    pub fn listen(&mut self, body: BodyId) {
        let id = self.id;
        self.services.contacts.register(body, id);
    }

    /// Queues a free entity. It joins the entity list once the current pass
    /// over the list finishes and is initialized then if the scene already
    /// ran its bulk init.
    pub fn create<E: Entity>(&mut self, entity: E) -> EntityId {
        let id = EntityId(self.next_id + self.spawned.len() as u32);
        self.spawned.push(EntityEntry {
            id,
            class: short_type_name::<E>().to_owned(),
            base: None,
            behavior: Box::new(entity),
        });
        id
    }
}

pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

// ============================================================================
// Factory
// ============================================================================

type Constructor = Box<dyn Fn(NodeRef) -> Box<dyn Entity>>;

/// Maps entity class names from the asset to constructors.
#[derive(Default)]
pub struct EntityFactory {
    constructors: FxHashMap<String, Constructor>,
}

impl EntityFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor closure under `class`, replacing any previous
    /// registration.
    pub fn register<F>(&mut self, class: impl Into<String>, constructor: F)
    where
        F: Fn(NodeRef) -> Box<dyn Entity> + 'static,
    {
        let class = class.into();
        if self
            .constructors
            .insert(class.clone(), Box::new(constructor))
            .is_some()
        {
            log::warn!("Entity class '{class}' registered twice");
        }
    }

    /// Registers `T` under `class`.
    pub fn register_entity<T: FromNode>(&mut self, class: impl Into<String>) {
        self.register(class, |base| Box::new(T::from_node(base)));
    }

    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn create(&self, class: &str, base: NodeRef) -> Result<Box<dyn Entity>> {
        let constructor = self
            .constructors
            .get(class)
            .ok_or_else(|| GaleError::UnknownEntityClass(class.to_owned()))?;
        Ok(constructor(base))
    }
}

impl fmt::Debug for EntityFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut classes: Vec<_> = self.constructors.keys().collect();
        classes.sort();
        f.debug_struct("EntityFactory")
            .field("classes", &classes)
            .finish()
    }
}
