//! Loaded asset data consumed by the scene builder.
//!
//! Decoding of the source files (glTF, images, terrain) happens outside this
//! crate. What arrives here is an immutable [`SceneAsset`]: a node tree plus
//! graphics and physics side tables, and the shared [`InstanceBuffer`] the
//! graphics instances point into.

pub mod instance_buffer;
pub mod scene_asset;

pub use instance_buffer::{InstanceAttributes, InstanceBuffer};
pub use scene_asset::{
    AssetNode, GraphicsData, GraphicsInstance, PhysicsData, PhysicsInstance, ROOT_NODE_NAME,
    SceneAsset, TriggerDesc, parse_tags,
};
