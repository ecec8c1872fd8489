use smallvec::SmallVec;

use crate::assets::InstanceBuffer;
use crate::physics::BodyId;
use crate::scene::entity::EntityId;
use crate::scene::properties::Properties;

pub type Tags = SmallVec<[String; 2]>;

/// One element of the scene-graph tree.
///
/// # Layout
///
/// Nodes live in a flat array inside [`NodeStore`](super::NodeStore) and are
/// addressed by `index`. The transform shares that index; graphics and physics
/// bindings are separate arrays referenced by `graphics`/`physics`.
///
/// # Invariants
///
/// - `index` is fixed for the lifetime of the scene
/// - only the root (index 0) has no parent
/// - `children` is in asset document order
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) index: u32,
    pub(crate) parent: Option<u32>,
    pub(crate) children: Vec<u32>,

    // === Bindings ===
    pub(crate) graphics: Option<u32>,
    pub(crate) physics: Option<u32>,
    pub(crate) entity: Option<EntityId>,

    // === Asset metadata (read-only) ===
    pub(crate) properties: Properties,
    pub(crate) tags: Tags,
}

impl Node {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub fn parent(&self) -> Option<u32> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[u32] {
        &self.children
    }

    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Binds a node to one slot of the externally owned instance-attribute buffer.
#[derive(Debug, Clone)]
pub struct Graphics {
    pub(crate) buffer: InstanceBuffer,
    pub(crate) slot: u32,
    pub(crate) node: u32,
}

impl Graphics {
    #[must_use]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    #[must_use]
    pub fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }
}

/// Trigger metadata of a sensor body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trigger {
    pub enabled: bool,
    pub action: String,
    pub argument: String,
}

/// Binds a node to a rigid body of the physics backend.
#[derive(Debug, Clone)]
pub struct Physics {
    pub(crate) body: BodyId,
    pub(crate) trigger: Trigger,
    pub(crate) kinematic: bool,
    pub(crate) node: u32,
}

impl Physics {
    #[must_use]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[must_use]
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    #[must_use]
    pub fn kinematic(&self) -> bool {
        self.kinematic
    }
}
