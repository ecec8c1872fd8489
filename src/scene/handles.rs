//! Reference handles into a [`NodeStore`].
//!
//! Handles are small `Copy` values pairing the owning scene's [`SceneId`]
//! with an array index. They never own or borrow the store; every accessor
//! takes the store explicitly and validates the handle against it, so a
//! default-constructed handle, a handle from an unloaded scene, or one used
//! with the wrong store yields [`GaleError::InvalidReference`].
//!
//! ```rust,ignore
//! let sensor = base.find(store, "*.*.Sensor")?;
//! let body = sensor.physics(store)?.body(store)?;
//! base.graphics(store)?.set_transform_from_node(store)?;
//! ```

use glam::{Mat4, Quat, Vec3};

use crate::assets::InstanceAttributes;
use crate::errors::{GaleError, Result};
use crate::physics::BodyId;
use crate::scene::entity::EntityId;
use crate::scene::node::{Node, Trigger};
use crate::scene::properties::FromProperty;
use crate::scene::store::{NodeStore, SceneId};
use crate::scene::transform::Transform;

const NO_INDEX: u32 = u32::MAX;

// ============================================================================
// NodeRef
// ============================================================================

/// Handle to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    scene: SceneId,
    index: u32,
}

impl Default for NodeRef {
    fn default() -> Self {
        Self::INVALID
    }
}

impl NodeRef {
    pub const INVALID: NodeRef = NodeRef {
        scene: SceneId::INVALID,
        index: NO_INDEX,
    };

    #[inline]
    #[must_use]
    pub(crate) fn new(scene: SceneId, index: u32) -> Self {
        Self { scene, index }
    }

    /// `true` for default-constructed handles. A valid-looking handle can
    /// still fail against a store it does not belong to.
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.scene.is_invalid() || self.index == NO_INDEX
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_invalid()
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_valid() && self.index == 0
    }

    /// Borrows the node data.
    pub fn get<'a>(&self, store: &'a NodeStore) -> Result<&'a Node> {
        store.node(self.scene, self.index)
    }

    pub fn name<'a>(&self, store: &'a NodeStore) -> Result<&'a str> {
        Ok(self.get(store)?.name())
    }

    /// Parent of the node; [`NodeRef::INVALID`] for the root.
    pub fn parent(&self, store: &NodeStore) -> Result<NodeRef> {
        Ok(self
            .get(store)?
            .parent
            .map_or(NodeRef::INVALID, |p| NodeRef::new(self.scene, p)))
    }

    pub fn children<'a>(
        &self,
        store: &'a NodeStore,
    ) -> Result<impl ExactSizeIterator<Item = NodeRef> + 'a> {
        let scene = self.scene;
        Ok(self
            .get(store)?
            .children
            .iter()
            .map(move |&c| NodeRef::new(scene, c)))
    }

    pub fn child_count(&self, store: &NodeStore) -> Result<usize> {
        Ok(self.get(store)?.children.len())
    }

    pub fn transform(&self, store: &NodeStore) -> Result<TransformRef> {
        self.get(store)?;
        Ok(TransformRef {
            scene: self.scene,
            index: self.index,
        })
    }

    /// Graphics binding of the node. Nodes without one yield an invalid
    /// reference error.
    pub fn graphics(&self, store: &NodeStore) -> Result<GraphicsRef> {
        let index = self
            .get(store)?
            .graphics
            .ok_or(GaleError::invalid("graphics", NO_INDEX))?;
        Ok(GraphicsRef {
            scene: self.scene,
            index,
            node: self.index,
        })
    }

    /// Physics binding of the node. Nodes without one yield an invalid
    /// reference error.
    pub fn physics(&self, store: &NodeStore) -> Result<PhysicsRef> {
        let index = self
            .get(store)?
            .physics
            .ok_or(GaleError::invalid("physics", NO_INDEX))?;
        Ok(PhysicsRef {
            scene: self.scene,
            index,
            node: self.index,
        })
    }

    #[must_use]
    pub fn has_graphics(&self, store: &NodeStore) -> bool {
        self.get(store).is_ok_and(|n| n.graphics.is_some())
    }

    #[must_use]
    pub fn has_physics(&self, store: &NodeStore) -> bool {
        self.get(store).is_ok_and(|n| n.physics.is_some())
    }

    #[must_use]
    pub fn has_entity(&self, store: &NodeStore) -> bool {
        self.get(store).is_ok_and(|n| n.entity.is_some())
    }

    pub fn entity(&self, store: &NodeStore) -> Result<Option<EntityId>> {
        Ok(self.get(store)?.entity)
    }

    /// Resolves a path relative to this node, see [`SceneRef::find`].
    pub fn find(&self, store: &NodeStore, path: &str) -> Result<NodeRef> {
        let index = store.find(self.scene, self.index, path)?;
        Ok(NodeRef::new(self.scene, index))
    }

    pub fn tags<'a>(&self, store: &'a NodeStore) -> Result<&'a [String]> {
        Ok(self.get(store)?.tags())
    }

    /// `false` for invalid handles.
    #[must_use]
    pub fn has_tag(&self, store: &NodeStore, tag: &str) -> bool {
        self.get(store).is_ok_and(|n| n.has_tag(tag))
    }

    pub fn prop<T: FromProperty>(&self, store: &NodeStore, key: &str) -> Result<T> {
        self.get(store)?.properties.get(key)
    }

    pub fn prop_or<T: FromProperty>(&self, store: &NodeStore, key: &str, default: T) -> Result<T> {
        self.get(store)?.properties.get_or(key, default)
    }

    pub fn has_prop(&self, store: &NodeStore, key: &str) -> Result<bool> {
        Ok(self.get(store)?.properties.has(key))
    }
}

// ============================================================================
// TransformRef
// ============================================================================

/// Handle to the transform of a node. Shares the node's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformRef {
    scene: SceneId,
    index: u32,
}

impl Default for TransformRef {
    fn default() -> Self {
        Self {
            scene: SceneId::INVALID,
            index: NO_INDEX,
        }
    }
}

impl TransformRef {
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.scene.is_invalid() || self.index == NO_INDEX
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.scene, self.index)
    }

    pub fn get<'a>(&self, store: &'a NodeStore) -> Result<&'a Transform> {
        store.transform(self.scene, self.index)
    }

    pub fn get_mut<'a>(&self, store: &'a mut NodeStore) -> Result<&'a mut Transform> {
        store.transform_mut(self.scene, self.index)
    }

    pub fn position(&self, store: &NodeStore) -> Result<Vec3> {
        Ok(self.get(store)?.t)
    }

    pub fn rotation(&self, store: &NodeStore) -> Result<Quat> {
        Ok(self.get(store)?.r)
    }

    pub fn scale(&self, store: &NodeStore) -> Result<Vec3> {
        Ok(self.get(store)?.s)
    }

    pub fn matrix(&self, store: &NodeStore) -> Result<Mat4> {
        Ok(self.get(store)?.matrix())
    }

    pub fn set_position(&self, store: &mut NodeStore, t: Vec3) -> Result<()> {
        self.get_mut(store)?.t = t;
        Ok(())
    }

    pub fn set_rotation(&self, store: &mut NodeStore, r: Quat) -> Result<()> {
        self.get_mut(store)?.r = r;
        Ok(())
    }

    pub fn set_scale(&self, store: &mut NodeStore, s: Vec3) -> Result<()> {
        self.get_mut(store)?.s = s;
        Ok(())
    }

    pub fn set(&self, store: &mut NodeStore, transform: Transform) -> Result<()> {
        *self.get_mut(store)? = transform;
        Ok(())
    }
}

// ============================================================================
// GraphicsRef
// ============================================================================

/// Handle to a node's slot in the instance-attribute buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphicsRef {
    scene: SceneId,
    index: u32,
    node: u32,
}

impl Default for GraphicsRef {
    fn default() -> Self {
        Self {
            scene: SceneId::INVALID,
            index: NO_INDEX,
            node: NO_INDEX,
        }
    }
}

impl GraphicsRef {
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.scene.is_invalid() || self.index == NO_INDEX
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.scene, self.node)
    }

    /// Index of the bound slot in the instance-attribute buffer.
    pub fn slot(&self, store: &NodeStore) -> Result<u32> {
        Ok(store.graphics(self.scene, self.index)?.slot)
    }

    /// Writes the node's composed transform into the bound slot.
    pub fn set_transform_from_node(&self, store: &NodeStore) -> Result<()> {
        let matrix = store.transform(self.scene, self.node)?.matrix();
        self.set_transform(store, matrix)
    }

    /// Writes `matrix` into the bound slot.
    pub fn set_transform(&self, store: &NodeStore, matrix: Mat4) -> Result<()> {
        let graphics = store.graphics(self.scene, self.index)?;
        graphics.buffer.write(graphics.slot as usize, |attrs| {
            attrs.transform = matrix;
        });
        Ok(())
    }

    /// Reads back the current contents of the bound slot.
    pub fn attributes(&self, store: &NodeStore) -> Result<InstanceAttributes> {
        let graphics = store.graphics(self.scene, self.index)?;
        graphics
            .buffer
            .get(graphics.slot as usize)
            .ok_or(GaleError::invalid("graphics", self.index))
    }
}

// ============================================================================
// PhysicsRef
// ============================================================================

/// Handle to a node's rigid-body binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicsRef {
    scene: SceneId,
    index: u32,
    node: u32,
}

impl Default for PhysicsRef {
    fn default() -> Self {
        Self {
            scene: SceneId::INVALID,
            index: NO_INDEX,
            node: NO_INDEX,
        }
    }
}

impl PhysicsRef {
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.scene.is_invalid() || self.index == NO_INDEX
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeRef {
        NodeRef::new(self.scene, self.node)
    }

    pub fn body(&self, store: &NodeStore) -> Result<BodyId> {
        Ok(store.physics(self.scene, self.index)?.body)
    }

    pub fn trigger<'a>(&self, store: &'a NodeStore) -> Result<&'a Trigger> {
        Ok(&store.physics(self.scene, self.index)?.trigger)
    }

    pub fn kinematic(&self, store: &NodeStore) -> Result<bool> {
        Ok(store.physics(self.scene, self.index)?.kinematic)
    }
}

// ============================================================================
// SceneRef
// ============================================================================

/// Handle to a whole scene, used for scene-wide lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SceneRef {
    scene: SceneId,
}

impl SceneRef {
    #[must_use]
    pub fn of(store: &NodeStore) -> Self {
        Self { scene: store.id() }
    }

    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.scene.is_invalid()
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.scene
    }

    fn check(&self, store: &NodeStore) -> Result<()> {
        if self.scene.is_invalid() || self.scene != store.id() {
            return Err(GaleError::invalid("scene", self.scene.0));
        }
        Ok(())
    }

    /// The root node, index 0.
    pub fn root(&self, store: &NodeStore) -> Result<NodeRef> {
        self.node(store, 0)
    }

    /// Handle to the node at `index`, checked against the store.
    pub fn node(&self, store: &NodeStore, index: u32) -> Result<NodeRef> {
        let node = NodeRef::new(self.scene, index);
        node.get(store)?;
        Ok(node)
    }

    /// Node registered under exactly `name`. With duplicate names the one
    /// latest in document order wins.
    pub fn by_name(&self, store: &NodeStore, name: &str) -> Result<Option<NodeRef>> {
        self.check(store)?;
        Ok(store
            .index_by_name(name)
            .map(|i| NodeRef::new(self.scene, i)))
    }

    /// Node owning the rigid body `body`.
    pub fn by_physics_body(&self, store: &NodeStore, body: BodyId) -> Result<Option<NodeRef>> {
        self.check(store)?;
        Ok(store
            .index_by_body(body)
            .map(|i| NodeRef::new(self.scene, i)))
    }

    /// Resolves `path` relative to `parent`.
    ///
    /// `path` is a list of segments separated by `/`. Each segment descends
    /// exactly one level: it is matched against the direct children of the
    /// previous match, and the first child in document order whose name
    /// matches the dotted pattern wins (see [`super::pattern`]). A segment
    /// without a match fails with [`GaleError::NodeNotFound`].
    pub fn find(&self, store: &NodeStore, parent: NodeRef, path: &str) -> Result<NodeRef> {
        self.check(store)?;
        parent.find(store, path)
    }

    /// First node in document order for which `predicate` holds.
    pub fn find_where(
        &self,
        store: &NodeStore,
        mut predicate: impl FnMut(NodeRef, &Node) -> bool,
    ) -> Result<Option<NodeRef>> {
        self.check(store)?;
        let scene = self.scene;
        Ok(store
            .find_where(|n| predicate(NodeRef::new(scene, n.index), n))
            .map(|i| NodeRef::new(scene, i)))
    }
}
