//! Race course entities
//!
//! Gameplay behaviour for the node entity classes a race course asset
//! declares. [`register_builtin_entities`] makes them known to a factory.
//!
//! | Class             | Type                      |
//! |-------------------|---------------------------|
//! | `Checkpoint`      | [`CheckpointEntity`]      |
//! | `BarrierObstacle` | [`BarrierObstacleEntity`] |
//! | `TestObstacle`    | [`BarrierObstacleEntity`] |
//! | `MillObstacle`    | [`MillObstacleEntity`]    |
//! | `Crate`           | [`CrateEntity`]           |
//! | `BoostRing`       | [`BoostRingEntity`]       |
//! | `GoalFirework`    | [`GoalFireworkEntity`]    |
//!
//! [`CheckpointMarkerEntity`] is a free entity created by race logic.

pub mod barrier_obstacle;
pub mod boost_ring;
pub mod checkpoint;
pub mod checkpoint_marker;
pub mod crate_entity;
pub mod goal_firework;
pub mod mill_obstacle;
pub mod propeller;

pub use barrier_obstacle::BarrierObstacleEntity;
pub use boost_ring::BoostRingEntity;
pub use checkpoint::CheckpointEntity;
pub use checkpoint_marker::CheckpointMarkerEntity;
pub use crate_entity::CrateEntity;
pub use goal_firework::{FIREWORK_MATERIAL, GoalFireworkEntity};
pub use mill_obstacle::MillObstacleEntity;
pub use propeller::Propeller;

use crate::scene::EntityFactory;

/// Tag marking nodes whose bodies belong to a player.
pub const PLAYER_TAG: &str = "player";

pub fn register_builtin_entities(factory: &mut EntityFactory) {
    factory.register_entity::<CheckpointEntity>("Checkpoint");
    factory.register_entity::<BarrierObstacleEntity>("BarrierObstacle");
    // older course files
    factory.register_entity::<BarrierObstacleEntity>("TestObstacle");
    factory.register_entity::<MillObstacleEntity>("MillObstacle");
    factory.register_entity::<CrateEntity>("Crate");
    factory.register_entity::<BoostRingEntity>("BoostRing");
    factory.register_entity::<GoalFireworkEntity>("GoalFirework");
}
