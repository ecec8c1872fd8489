use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crate::assets::InstanceBuffer;
use crate::errors::{GaleError, Result};
use crate::physics::BodyId;
use crate::scene::entity::EntityId;
use crate::scene::node::{Graphics, Node, Physics, Tags, Trigger};
use crate::scene::pattern;
use crate::scene::properties::Properties;
use crate::scene::transform::Transform;

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one scene instance. Zero is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SceneId(pub(crate) u32);

impl SceneId {
    pub const INVALID: SceneId = SceneId(0);

    #[inline]
    #[must_use]
    pub fn is_invalid(self) -> bool {
        self.0 == 0
    }
}

/// Flat storage of one scene graph.
///
/// Nodes, transforms and bindings are append-only while the scene is being
/// built and fixed-shape afterwards. All arrays are addressed by `u32`
/// indices; handles in [`super::handles`] pair such an index with the
/// store's [`SceneId`].
#[derive(Debug)]
pub struct NodeStore {
    id: SceneId,
    nodes: Vec<Node>,
    transforms: Vec<Transform>,
    graphics: Vec<Graphics>,
    physics: Vec<Physics>,
    by_name: FxHashMap<String, u32>,
    by_body: FxHashMap<BodyId, u32>,
}

impl NodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: Vec::with_capacity(nodes),
            transforms: Vec::with_capacity(nodes),
            graphics: Vec::new(),
            physics: Vec::new(),
            by_name: FxHashMap::default(),
            by_body: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn graphics_count(&self) -> usize {
        self.graphics.len()
    }

    #[must_use]
    pub fn physics_count(&self) -> usize {
        self.physics.len()
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.iter()
    }

    // ========================================================================
    // Checked access
    // ========================================================================

    #[inline]
    fn check(&self, scene: SceneId, kind: &'static str, index: u32) -> Result<usize> {
        if scene != self.id || scene.is_invalid() {
            return Err(GaleError::invalid(kind, index));
        }
        Ok(index as usize)
    }

    pub(crate) fn node(&self, scene: SceneId, index: u32) -> Result<&Node> {
        let i = self.check(scene, "node", index)?;
        self.nodes.get(i).ok_or(GaleError::invalid("node", index))
    }

    pub(crate) fn transform(&self, scene: SceneId, index: u32) -> Result<&Transform> {
        let i = self.check(scene, "transform", index)?;
        self.transforms
            .get(i)
            .ok_or(GaleError::invalid("transform", index))
    }

    pub(crate) fn transform_mut(&mut self, scene: SceneId, index: u32) -> Result<&mut Transform> {
        let i = self.check(scene, "transform", index)?;
        self.transforms
            .get_mut(i)
            .ok_or(GaleError::invalid("transform", index))
    }

    pub(crate) fn graphics(&self, scene: SceneId, index: u32) -> Result<&Graphics> {
        let i = self.check(scene, "graphics", index)?;
        self.graphics
            .get(i)
            .ok_or(GaleError::invalid("graphics", index))
    }

    pub(crate) fn physics(&self, scene: SceneId, index: u32) -> Result<&Physics> {
        let i = self.check(scene, "physics", index)?;
        self.physics
            .get(i)
            .ok_or(GaleError::invalid("physics", index))
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    #[must_use]
    pub(crate) fn index_by_name(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub(crate) fn index_by_body(&self, body: BodyId) -> Option<u32> {
        self.by_body.get(&body).copied()
    }

    /// Resolves a `/`-separated path below `from`.
    ///
    /// Each segment is matched against the direct children of the previous
    /// match in document order; the first child whose name matches wins.
    pub(crate) fn find(&self, scene: SceneId, from: u32, path: &str) -> Result<u32> {
        let mut current = self.node(scene, from)?;
        for segment in path.split('/') {
            let next = current
                .children
                .iter()
                .map(|&c| &self.nodes[c as usize])
                .find(|child| pattern::matches_node_name(segment, &child.name));

            current = next.ok_or_else(|| GaleError::NodeNotFound {
                pattern: segment.to_owned(),
                path: path.to_owned(),
                from: current.name.clone(),
            })?;
        }
        Ok(current.index)
    }

    /// First node in document order satisfying `predicate`.
    pub(crate) fn find_where(&self, mut predicate: impl FnMut(&Node) -> bool) -> Option<u32> {
        self.nodes.iter().find(|n| predicate(n)).map(|n| n.index)
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Appends a node and its transform. Later nodes shadow earlier ones of
    /// the same name in the name lookup.
    pub(crate) fn push_node(
        &mut self,
        name: &str,
        parent: Option<u32>,
        transform: Transform,
        properties: Properties,
        tags: Tags,
    ) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(Node {
            name: name.to_owned(),
            index,
            parent,
            children: Vec::new(),
            graphics: None,
            physics: None,
            entity: None,
            properties,
            tags,
        });
        self.transforms.push(transform);
        self.by_name.insert(name.to_owned(), index);
        index
    }

    pub(crate) fn push_child(&mut self, parent: u32, child: u32) {
        self.nodes[parent as usize].children.push(child);
    }

    pub(crate) fn bind_graphics(&mut self, node: u32, buffer: InstanceBuffer, slot: u32) -> u32 {
        let index = self.graphics.len() as u32;
        self.graphics.push(Graphics { buffer, slot, node });
        self.nodes[node as usize].graphics = Some(index);
        index
    }

    pub(crate) fn bind_physics(
        &mut self,
        node: u32,
        body: BodyId,
        trigger: Trigger,
        kinematic: bool,
    ) -> u32 {
        let index = self.physics.len() as u32;
        self.physics.push(Physics {
            body,
            trigger,
            kinematic,
            node,
        });
        self.nodes[node as usize].physics = Some(index);
        self.by_body.insert(body, node);
        index
    }

    pub(crate) fn bind_entity(&mut self, node: u32, entity: EntityId) {
        self.nodes[node as usize].entity = Some(entity);
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}
