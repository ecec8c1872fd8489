use std::any::Any;

use crate::assets::SceneAsset;
use crate::engine::Services;
use crate::errors::Result;
use crate::scene::builder::SceneBuilder;
use crate::scene::entity::{
    DebugDraw, Entity, EntityContext, EntityEntry, EntityFactory, EntityId, FrameTime,
    short_type_name,
};
use crate::scene::handles::{NodeRef, SceneRef};
use crate::scene::store::{NodeStore, SceneId};

/// A loaded scene: the node store plus the entities living in it.
///
/// Built once by the [`SceneBuilder`]. The node shape is fixed afterwards;
/// only free entities can still be appended.
///
/// The game loop drives the entity hooks:
///
/// ```rust,ignore
/// scene.call_entity_update(&mut services, dt)?;
/// if services.clock.is_step_due() {
///     scene.call_entity_pre_physics_update(&mut services)?;
///     services.step_physics();
///     scene.dispatch_contacts(&mut services)?;
///     scene.call_entity_post_physics_update(&mut services)?;
/// }
/// ```
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    store: NodeStore,
    entities: Vec<EntityEntry>,
    pending: Vec<EntityEntry>,
    initialized: bool,
}

impl Scene {
    pub(crate) fn from_parts(name: String, store: NodeStore, entities: Vec<EntityEntry>) -> Self {
        Self {
            name,
            store,
            entities,
            pending: Vec::new(),
            initialized: false,
        }
    }

    /// Builds the scene from `asset` and runs the bulk `init` pass.
    pub fn load(
        asset: &SceneAsset,
        factory: &EntityFactory,
        services: &mut Services,
    ) -> Result<Self> {
        let mut scene = SceneBuilder::new(asset, factory).build()?;
        if let Err(err) = scene.call_entity_init(services) {
            scene.release_listeners(services);
            return Err(err);
        }
        Ok(scene)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.store.id()
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &NodeStore {
        &self.store
    }

    #[inline]
    pub fn nodes_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    #[inline]
    #[must_use]
    pub fn scene_ref(&self) -> SceneRef {
        SceneRef::of(&self.store)
    }

    pub fn root(&self) -> Result<NodeRef> {
        self.scene_ref().root(&self.store)
    }

    /// Shorthand for `root().find(path)`.
    pub fn find(&self, path: &str) -> Result<NodeRef> {
        self.root()?.find(&self.store, path)
    }

    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Entity class names in list order.
    pub fn entity_classes(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.class.as_str())
    }

    // ========================================================================
    // Entity access
    // ========================================================================

    /// Downcasts entity `id` to `T`.
    #[must_use]
    pub fn entity<T: Entity>(&self, id: EntityId) -> Option<&T> {
        let entry = self.entities.get(id.0 as usize)?;
        (entry.behavior.as_ref() as &dyn Any).downcast_ref::<T>()
    }

    #[must_use]
    pub fn entity_mut<T: Entity>(&mut self, id: EntityId) -> Option<&mut T> {
        let entry = self.entities.get_mut(id.0 as usize)?;
        (entry.behavior.as_mut() as &mut dyn Any).downcast_mut::<T>()
    }

    /// Downcasts the entity bound to `node` to `T`.
    pub fn node_entity<T: Entity>(&self, node: NodeRef) -> Result<Option<&T>> {
        Ok(node.entity(&self.store)?.and_then(|id| self.entity::<T>(id)))
    }

    /// All entities of type `T` in list order.
    pub fn entities_of<T: Entity>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().filter_map(|e| {
            (e.behavior.as_ref() as &dyn Any)
                .downcast_ref::<T>()
                .map(|t| (e.id, t))
        })
    }

    /// Base node of entity `id`, `None` for free entities.
    #[must_use]
    pub fn entity_base(&self, id: EntityId) -> Option<NodeRef> {
        self.entities.get(id.0 as usize).and_then(|e| e.base)
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Appends a free entity. If the bulk init pass already ran, the entity
    /// is initialized before this returns.
    pub fn create<E: Entity>(&mut self, services: &mut Services, entity: E) -> Result<EntityId> {
        let id = EntityId((self.entities.len() + self.pending.len()) as u32);
        self.pending.push(EntityEntry {
            id,
            class: short_type_name::<E>().to_owned(),
            base: None,
            behavior: Box::new(entity),
        });
        self.flush_pending(services)?;
        Ok(id)
    }

    fn flush_pending(&mut self, services: &mut Services) -> Result<()> {
        while !self.pending.is_empty() {
            let start = self.entities.len();
            self.entities.append(&mut self.pending);
            if self.initialized {
                let partial_ticks = services.clock.partial_ticks();
                for i in start..self.entities.len() {
                    self.run_one(i, services, FrameTime { dt: 0.0, partial_ticks }, |e, ctx| {
                        e.init(ctx)
                    })?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Hooks
    // ========================================================================

    fn run_one(
        &mut self,
        index: usize,
        services: &mut Services,
        time: FrameTime,
        hook: impl FnOnce(&mut dyn Entity, &mut EntityContext<'_>) -> Result<()>,
    ) -> Result<()> {
        let next_id = self.entities.len() as u32;
        let entry = &mut self.entities[index];
        let mut ctx = EntityContext {
            nodes: &mut self.store,
            services,
            time,
            id: entry.id,
            base: entry.base,
            spawned: &mut self.pending,
            next_id,
        };
        hook(entry.behavior.as_mut(), &mut ctx)
    }

    fn run_all(
        &mut self,
        services: &mut Services,
        time: FrameTime,
        mut hook: impl FnMut(&mut dyn Entity, &mut EntityContext<'_>) -> Result<()>,
    ) -> Result<()> {
        let next_id = self.entities.len() as u32;
        for entry in &mut self.entities {
            let mut ctx = EntityContext {
                nodes: &mut self.store,
                services: &mut *services,
                time,
                id: entry.id,
                base: entry.base,
                spawned: &mut self.pending,
                next_id,
            };
            hook(entry.behavior.as_mut(), &mut ctx)?;
        }
        self.flush_pending(services)
    }

    /// Bulk `init` of every entity in creation order. Runs once; later calls
    /// only log a warning.
    pub fn call_entity_init(&mut self, services: &mut Services) -> Result<()> {
        if self.initialized {
            log::warn!(
                "Scene '{}': call_entity_init called after scene was already initialized",
                self.name
            );
            return Ok(());
        }
        self.initialized = true;
        let time = FrameTime {
            dt: 0.0,
            partial_ticks: services.clock.partial_ticks(),
        };
        self.run_all(services, time, |e, ctx| e.init(ctx))
    }

    pub fn call_entity_update(&mut self, services: &mut Services, dt: f32) -> Result<()> {
        let time = FrameTime {
            dt,
            partial_ticks: services.clock.partial_ticks(),
        };
        self.run_all(services, time, |e, ctx| e.update(ctx))
    }

    pub fn call_entity_pre_physics_update(&mut self, services: &mut Services) -> Result<()> {
        let time = Self::step_time(services);
        self.run_all(services, time, |e, ctx| e.pre_physics_update(ctx))
    }

    pub fn call_entity_post_physics_update(&mut self, services: &mut Services) -> Result<()> {
        let time = Self::step_time(services);
        self.run_all(services, time, |e, ctx| e.post_physics_update(ctx))
    }

    pub fn call_entity_debug_draw(
        &mut self,
        services: &mut Services,
        draw: &mut dyn DebugDraw,
    ) -> Result<()> {
        let time = FrameTime {
            dt: 0.0,
            partial_ticks: services.clock.partial_ticks(),
        };
        self.run_all(services, time, |e, ctx| e.debug_draw(ctx, &mut *draw))
    }

    /// Delivers the contacts recorded during the last physics step.
    pub fn dispatch_contacts(&mut self, services: &mut Services) -> Result<()> {
        let time = Self::step_time(services);
        for (id, contact) in services.contacts.drain() {
            let index = id.0 as usize;
            if index >= self.entities.len() {
                log::warn!("Dropping contact for unknown entity {id:?}");
                continue;
            }
            self.run_one(index, services, time, |e, ctx| e.on_contact(ctx, contact))?;
        }
        self.flush_pending(services)
    }

    fn step_time(services: &Services) -> FrameTime {
        FrameTime {
            dt: services.clock.interval(),
            partial_ticks: services.clock.partial_ticks(),
        }
    }

    /// Runs every entity's `destroy` hook and drops the scene.
    ///
    /// Contact listeners of the scene are released even when a hook fails.
    pub fn unload(mut self, services: &mut Services) -> Result<()> {
        let result = self.run_all(services, FrameTime::default(), |e, ctx| e.destroy(ctx));
        self.release_listeners(services);
        result?;
        log::info!(
            "Scene '{}' unloaded ({} entities)",
            self.name,
            self.entities.len()
        );
        Ok(())
    }

    fn release_listeners(&self, services: &mut Services) {
        for entry in self.entities.iter().chain(&self.pending) {
            services.contacts.unregister_entity(entry.id);
        }
    }
}
