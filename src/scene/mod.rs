//! Scene Graph
//!
//! Runtime scene built from a loaded asset:
//! - [`NodeStore`]: flat, index-addressed nodes, transforms and bindings
//! - [`Transform`]: per-node TRS
//! - Handles ([`NodeRef`], [`TransformRef`], [`GraphicsRef`], [`PhysicsRef`],
//!   [`SceneRef`]): copyable, checked references into the store
//! - [`Entity`]: per-frame behaviour, created through the [`EntityFactory`]
//! - [`SceneBuilder`]: one-shot conversion from [`crate::assets::SceneAsset`]
//! - [`Scene`]: the store plus its entity list

pub mod builder;
pub mod entity;
pub mod handles;
pub mod node;
pub mod pattern;
pub mod properties;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod store;
pub mod transform;

pub use builder::SceneBuilder;
pub use entity::{
    DebugDraw, Entity, EntityContext, EntityFactory, EntityId, FrameTime, FromNode,
};
pub use handles::{GraphicsRef, NodeRef, PhysicsRef, SceneRef, TransformRef};
pub use node::{Graphics, Node, Physics, Tags, Trigger};
pub use properties::{FromProperty, Properties, PropertyValue};
pub use scene::Scene;
pub use store::{NodeStore, SceneId};
pub use transform::Transform;
