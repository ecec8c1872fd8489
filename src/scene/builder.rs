//! Scene construction from a loaded [`SceneAsset`].
//!
//! A single pre-order walk from the asset root assigns node indices
//! (root = 0), copies names, transforms, properties and tags, constructs node
//! entities and links graphics/physics instances. Entity `init` is not called
//! here; see [`Scene::load`].

use crate::assets::{AssetNode, SceneAsset};
use crate::errors::{GaleError, Result};
use crate::scene::entity::{EntityEntry, EntityFactory, EntityId};
use crate::scene::handles::NodeRef;
use crate::scene::node::Trigger;
use crate::scene::scene::Scene;
use crate::scene::store::NodeStore;

pub struct SceneBuilder<'a> {
    asset: &'a SceneAsset,
    factory: &'a EntityFactory,
    store: NodeStore,
    entities: Vec<EntityEntry>,
    visited: Vec<bool>,
    used_slots: Vec<bool>,
}

impl<'a> SceneBuilder<'a> {
    #[must_use]
    pub fn new(asset: &'a SceneAsset, factory: &'a EntityFactory) -> Self {
        Self {
            asset,
            factory,
            store: NodeStore::with_capacity(asset.nodes.len()),
            entities: Vec::new(),
            visited: vec![false; asset.nodes.len()],
            used_slots: vec![false; asset.graphics.attributes.len()],
        }
    }

    /// Converts the whole tree. Any mismatch between the tree and the asset
    /// tables aborts the build.
    pub fn build(mut self) -> Result<Scene> {
        self.convert(self.asset.root, None)?;

        log::info!(
            "Scene '{}' built: {} nodes, {} graphics, {} physics, {} entities",
            self.asset.name,
            self.store.len(),
            self.store.graphics_count(),
            self.store.physics_count(),
            self.entities.len()
        );

        Ok(Scene::from_parts(
            self.asset.name.clone(),
            self.store,
            self.entities,
        ))
    }

    fn asset_node(&self, index: usize) -> Result<&'a AssetNode> {
        self.asset
            .nodes
            .get(index)
            .ok_or(GaleError::AssetIndexOutOfBounds {
                context: "scene node",
                index,
            })
    }

    fn convert(&mut self, asset_index: usize, parent: Option<u32>) -> Result<u32> {
        let node = self.asset_node(asset_index)?;
        if std::mem::replace(&mut self.visited[asset_index], true) {
            return Err(GaleError::MalformedAsset(format!(
                "node '{}' is reachable more than once",
                node.name
            )));
        }

        let index = self.store.push_node(
            &node.name,
            parent,
            node.transform,
            node.properties.clone(),
            node.tags.clone(),
        );

        if let Some(class) = node.entity_class.as_deref().filter(|c| !c.is_empty()) {
            let base = NodeRef::new(self.store.id(), index);
            let behavior = self.factory.create(class, base)?;
            let id = EntityId(self.entities.len() as u32);
            self.entities.push(EntityEntry {
                id,
                class: class.to_owned(),
                base: Some(base),
                behavior,
            });
            self.store.bind_entity(index, id);
        }

        if let Some(graphics) = node.graphics {
            self.link_graphics(index, graphics)?;
        }

        if let Some(physics) = node.physics {
            self.link_physics(index, physics, node.kinematic)?;
        }

        for &child in &node.children {
            let child_index = self.convert(child, Some(index))?;
            self.store.push_child(index, child_index);
        }

        Ok(index)
    }

    fn link_graphics(&mut self, node: u32, graphics: usize) -> Result<()> {
        let instance = self
            .asset
            .graphics
            .instances
            .get(graphics)
            .ok_or(GaleError::AssetIndexOutOfBounds {
                context: "graphics instance",
                index: graphics,
            })?;
        let buffer = &self.asset.graphics.attributes;
        let Some(used) = self.used_slots.get_mut(instance.attributes) else {
            return Err(GaleError::AssetIndexOutOfBounds {
                context: "instance attributes",
                index: instance.attributes,
            });
        };
        if std::mem::replace(used, true) {
            return Err(GaleError::MalformedAsset(format!(
                "instance attribute slot {} is bound twice",
                instance.attributes
            )));
        }
        self.store
            .bind_graphics(node, buffer.clone(), instance.attributes as u32);
        Ok(())
    }

    fn link_physics(&mut self, node: u32, physics: usize, kinematic: bool) -> Result<()> {
        let instance = self
            .asset
            .physics
            .instances
            .get(physics)
            .ok_or(GaleError::AssetIndexOutOfBounds {
                context: "physics instance",
                index: physics,
            })?;
        let trigger = Trigger {
            enabled: instance.is_trigger,
            action: instance.trigger.action.clone(),
            argument: instance.trigger.argument.clone(),
        };
        self.store
            .bind_physics(node, instance.body, trigger, kinematic || instance.kinematic);
        Ok(())
    }
}
