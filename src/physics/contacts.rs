use rustc_hash::FxHashMap;

use crate::physics::{BodyId, SensorContact};
use crate::scene::EntityId;

/// Routes sensor contacts to the entity listening on the sensor body.
///
/// The backend records contacts while it steps; the scene drains them right
/// after the step, before any `post_physics_update` runs.
#[derive(Debug, Default)]
pub struct ContactDispatcher {
    listeners: FxHashMap<BodyId, EntityId>,
    pending: Vec<(EntityId, SensorContact)>,
}

impl ContactDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entity` as the listener for `body`, replacing any previous one.
    pub fn register(&mut self, body: BodyId, entity: EntityId) {
        if let Some(previous) = self.listeners.insert(body, entity)
            && previous != entity
        {
            log::warn!("Contact listener for {body:?} replaced ({previous:?} -> {entity:?})");
        }
    }

    pub fn unregister(&mut self, body: BodyId) -> Option<EntityId> {
        self.listeners.remove(&body)
    }

    /// Drops every listener owned by `entity`.
    pub fn unregister_entity(&mut self, entity: EntityId) {
        self.listeners.retain(|_, e| *e != entity);
    }

    #[must_use]
    pub fn listener(&self, body: BodyId) -> Option<EntityId> {
        self.listeners.get(&body).copied()
    }

    /// Queues a contact. Returns `false` when nobody listens on `sensor`.
    pub fn record(&mut self, sensor: BodyId, other: BodyId, persistent: bool) -> bool {
        let Some(&entity) = self.listeners.get(&sensor) else {
            return false;
        };
        self.pending.push((
            entity,
            SensorContact {
                sensor,
                other,
                persistent,
            },
        ));
        true
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Takes all queued contacts in recording order.
    pub fn drain(&mut self) -> Vec<(EntityId, SensorContact)> {
        std::mem::take(&mut self.pending)
    }

    /// Forgets all listeners and queued contacts.
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.pending.clear();
    }
}
