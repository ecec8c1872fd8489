use serde_json::Value;

use crate::assets::InstanceBuffer;
use crate::physics::BodyId;
use crate::scene::node::Tags;
use crate::scene::properties::{Properties, PropertyValue};
use crate::scene::transform::Transform;

/// Name of the synthetic node every asset tree hangs from.
pub const ROOT_NODE_NAME: &str = "#root";

/// One node of a loaded asset tree.
#[derive(Debug, Clone, Default)]
pub struct AssetNode {
    pub name: String,
    pub transform: Transform,
    pub properties: Properties,
    pub tags: Tags,
    /// Entity class to instantiate for this node, if any.
    pub entity_class: Option<String>,
    /// Index into [`GraphicsData::instances`].
    pub graphics: Option<usize>,
    /// Index into [`PhysicsData::instances`].
    pub physics: Option<usize>,
    /// Physics body of this node is driven by game code, not the solver.
    pub kinematic: bool,
    /// Indices into [`SceneAsset::nodes`], in document order.
    pub children: Vec<usize>,
}

impl AssetNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_entity(mut self, class: impl Into<String>) -> Self {
        self.entity_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Builds a node from exporter extras.
    ///
    /// Recognised keys:
    /// - `prop.<key>`: a node property (bool, int, float, string, or an
    ///   `{"type": "Object", "name": ...}` object reference stored as its name)
    /// - `entity`: the entity class
    /// - `tags`: comma separated tag list
    /// - `kinematic`: bool
    ///
    /// Unknown keys and unsupported property values are skipped.
    #[must_use]
    pub fn from_extras(name: impl Into<String>, extras: &Value) -> Self {
        let mut node = Self::new(name);
        let Some(map) = extras.as_object() else {
            return node;
        };

        for (key, value) in map {
            if let Some(short_key) = key.strip_prefix("prop.") {
                match property_from_json(value) {
                    Some(v) => node.properties.insert(short_key, v),
                    None => log::debug!(
                        "Skipping unsupported property '{short_key}' on node '{}'",
                        node.name
                    ),
                }
            }
        }

        node.entity_class = map
            .get("entity")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        if let Some(tags) = map.get("tags").and_then(Value::as_str) {
            node.tags = parse_tags(tags);
        }

        node.kinematic = map
            .get("kinematic")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        node
    }
}

fn property_from_json(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Bool(b) => Some(PropertyValue::Bool(*b)),
        Value::String(s) => Some(PropertyValue::String(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(PropertyValue::Int)
            .or_else(|| n.as_f64().map(|f| PropertyValue::Float(f as f32))),
        // object reference
        Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("Object") => obj
            .get("name")
            .and_then(Value::as_str)
            .map(|s| PropertyValue::String(s.to_owned())),
        _ => None,
    }
}

/// Splits `"a, b ,c"` into trimmed tags. Empty entries are dropped.
#[must_use]
pub fn parse_tags(tags: &str) -> Tags {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

// ============================================================================
// Graphics
// ============================================================================

/// A renderable instance of the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsInstance {
    /// Slot in [`GraphicsData::attributes`].
    pub attributes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct GraphicsData {
    pub instances: Vec<GraphicsInstance>,
    pub attributes: InstanceBuffer,
}

// ============================================================================
// Physics
// ============================================================================

/// Sensor behaviour authored as `"<action>"` or `"<action>:<argument>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerDesc {
    pub action: String,
    pub argument: String,
}

impl TriggerDesc {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((action, argument)) => Self {
                action: action.to_owned(),
                argument: argument.to_owned(),
            },
            None => Self {
                action: s.to_owned(),
                argument: String::new(),
            },
        }
    }
}

/// A rigid body already realised by the physics backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicsInstance {
    pub name: String,
    pub body: BodyId,
    pub is_trigger: bool,
    pub kinematic: bool,
    pub trigger: TriggerDesc,
}

impl PhysicsInstance {
    #[must_use]
    pub fn new(name: impl Into<String>, body: BodyId) -> Self {
        Self {
            name: name.into(),
            body,
            is_trigger: false,
            kinematic: false,
            trigger: TriggerDesc::default(),
        }
    }

    #[must_use]
    pub fn sensor(name: impl Into<String>, body: BodyId, trigger: &str) -> Self {
        Self {
            is_trigger: true,
            trigger: TriggerDesc::parse(trigger),
            ..Self::new(name, body)
        }
    }

    /// Reads `trigger` and `kinematic` from exporter extras.
    #[must_use]
    pub fn from_extras(name: impl Into<String>, body: BodyId, extras: &Value) -> Self {
        let mut instance = Self::new(name, body);
        if let Some(trigger) = extras
            .get("trigger")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
        {
            instance.is_trigger = true;
            instance.trigger = TriggerDesc::parse(trigger);
        }
        instance.kinematic = extras
            .get("kinematic")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        instance
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhysicsData {
    pub instances: Vec<PhysicsInstance>,
}

// ============================================================================
// SceneAsset
// ============================================================================

/// Immutable result of loading a scene file.
///
/// Nodes form a tree through index lists; `root` designates the tree anchor.
/// Graphics and physics instances are side tables the nodes refer to by
/// index.
#[derive(Debug, Clone)]
pub struct SceneAsset {
    pub name: String,
    pub nodes: Vec<AssetNode>,
    pub root: usize,
    pub graphics: GraphicsData,
    pub physics: PhysicsData,
}

impl SceneAsset {
    /// An asset holding only the `#root` node.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: vec![AssetNode::new(ROOT_NODE_NAME)],
            root: 0,
            graphics: GraphicsData::default(),
            physics: PhysicsData::default(),
        }
    }

    /// Replaces the instance-attribute buffer graphics instances point into.
    #[must_use]
    pub fn with_attributes(mut self, attributes: InstanceBuffer) -> Self {
        self.graphics.attributes = attributes;
        self
    }

    /// Appends `node` as the last child of `parent` and returns its index.
    /// `parent` is not validated here; the scene builder rejects bad indices.
    pub fn add_node(&mut self, parent: usize, node: AssetNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(index);
        }
        index
    }

    /// Binds `node` to attribute slot `slot`.
    pub fn attach_graphics(&mut self, node: usize, slot: usize) -> usize {
        let index = self.graphics.instances.len();
        self.graphics
            .instances
            .push(GraphicsInstance { attributes: slot });
        if let Some(n) = self.nodes.get_mut(node) {
            n.graphics = Some(index);
        }
        index
    }

    /// Binds `node` to a realised rigid body.
    pub fn attach_physics(&mut self, node: usize, instance: PhysicsInstance) -> usize {
        let index = self.physics.instances.len();
        self.physics.instances.push(instance);
        if let Some(n) = self.nodes.get_mut(node) {
            n.physics = Some(index);
        }
        index
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the first node named exactly `name`.
    #[must_use]
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }
}
