use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::entities::propeller::wrap_angle;
use crate::entities::PLAYER_TAG;
use crate::errors::Result;
use crate::physics::SensorContact;
use crate::scene::{Entity, EntityContext, FromNode, NodeRef};

/// A spinning ring that accelerates players flying through it.
///
/// Expects a `BoostRing.Mesh` mesh and a `Phys.Cylinder.Sensor` sensor below
/// its node. The `boost` property (float, required) is the velocity added
/// along the ring's forward axis.
#[derive(Debug)]
pub struct BoostRingEntity {
    base: NodeRef,
    mesh: NodeRef,
    sensor: NodeRef,
    initial: Quat,
    angle: f32,
    boost: f32,
    cooldown: f32,
}

impl FromNode for BoostRingEntity {
    fn from_node(base: NodeRef) -> Self {
        Self {
            base,
            mesh: NodeRef::INVALID,
            sensor: NodeRef::INVALID,
            initial: Quat::IDENTITY,
            angle: 0.0,
            boost: 0.0,
            cooldown: 0.0,
        }
    }
}

impl BoostRingEntity {
    /// Seconds before the ring boosts again.
    pub const COOLDOWN: f32 = 2.0;
    /// Spin rate in half turns per second.
    pub const SPIN_SPEED: f32 = 0.125;

    #[must_use]
    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    #[must_use]
    pub fn boost(&self) -> f32 {
        self.boost
    }

    #[must_use]
    pub fn sensor(&self) -> NodeRef {
        self.sensor
    }
}

impl Entity for BoostRingEntity {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let store = ctx.nodes();
        self.mesh = self.base.find(store, "BoostRing.Mesh")?;
        self.sensor = self.base.find(store, "Phys.Cylinder.Sensor")?;
        self.initial = self.mesh.transform(store)?.rotation(store)?;
        self.boost = self.base.prop(store, "boost")?;
        let body = self.sensor.physics(store)?.body(store)?;

        ctx.listen(body);
        Ok(())
    }

    fn update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let dt = ctx.dt();
        self.angle = wrap_angle(self.angle + Self::SPIN_SPEED * dt * PI);
        self.cooldown = (self.cooldown - dt).max(0.0);

        let store = ctx.nodes_mut();
        let rotation = self.initial * Quat::from_axis_angle(Vec3::Z, self.angle);
        self.mesh.transform(store)?.set_rotation(store, rotation)?;
        self.mesh.graphics(store)?.set_transform_from_node(store)
    }

    fn on_contact(&mut self, ctx: &mut EntityContext<'_>, contact: SensorContact) -> Result<()> {
        if contact.persistent || self.cooldown > 0.0 {
            return Ok(());
        }
        let store = ctx.nodes();
        let Some(node) = ctx.scene().by_physics_body(store, contact.other)? else {
            return Ok(());
        };
        if !node.has_tag(store, PLAYER_TAG) {
            return Ok(());
        }

        let forward = self.mesh.transform(store)?.rotation(store)? * Vec3::NEG_Z;
        let physics = ctx.physics();
        let velocity = physics.linear_velocity(contact.other) + forward * self.boost;
        physics.set_linear_velocity(contact.other, velocity);
        self.cooldown = Self::COOLDOWN;
        log::debug!("Boost ring applied {} to body {:?}", self.boost, contact.other);
        Ok(())
    }
}
