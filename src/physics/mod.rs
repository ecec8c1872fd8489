//! Physics Integration
//!
//! The rigid-body engine lives outside this crate. The scene only sees:
//!
//! - [`BodyId`]: the opaque body handle issued by the backend
//! - [`PhysicsBackend`]: stepping plus the handful of body queries entities use
//! - [`ContactDispatcher`]: sensor contact routing from bodies to entities
//! - [`PhysicsClock`]: the fixed-rate accumulator deciding when a step is due

pub mod clock;
pub mod contacts;

pub use clock::PhysicsClock;
pub use contacts::ContactDispatcher;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque rigid-body handle issued by the physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl BodyId {
    pub const INVALID: BodyId = BodyId(u32::MAX);

    #[inline]
    #[must_use]
    pub fn is_invalid(self) -> bool {
        self == Self::INVALID
    }
}

/// A contact reported for a sensor body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorContact {
    /// The sensor body the listener was registered for.
    pub sensor: BodyId,
    /// The body that touched the sensor.
    pub other: BodyId,
    /// `false` on the first step of a contact, `true` while it persists.
    pub persistent: bool,
}

/// The rigid-body engine as seen by the scene.
///
/// `step` advances the simulation by exactly one fixed interval and reports
/// every sensor contact of that step through [`ContactDispatcher::record`].
pub trait PhysicsBackend {
    fn step(&mut self, interval: f32, contacts: &mut ContactDispatcher);

    fn body_position(&self, body: BodyId) -> Vec3;

    fn body_rotation(&self, body: BodyId) -> Quat;

    fn linear_velocity(&self, body: BodyId) -> Vec3;

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec3);

    /// Teleports a body, typically a kinematic one driven by an entity.
    fn set_body_position(&mut self, body: BodyId, position: Vec3);

    fn set_body_rotation(&mut self, body: BodyId, rotation: Quat);
}
