use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::entities::propeller::wrap_angle;
use crate::errors::Result;
use crate::scene::{Entity, EntityContext, FromNode, NodeRef};

/// Windmill blades turning about their local Z axis, once per `cycle_time`
/// seconds. The blade collider follows the mesh rotation before each step.
///
/// Expects `Phys.MillBlades.Collider` and `MillBlades.Mesh` below its node.
#[derive(Debug)]
pub struct MillObstacleEntity {
    base: NodeRef,
    collider: NodeRef,
    mesh: NodeRef,
    initial: Quat,
    cycle_time: f32,
    angle: f32,
}

impl FromNode for MillObstacleEntity {
    fn from_node(base: NodeRef) -> Self {
        Self {
            base,
            collider: NodeRef::INVALID,
            mesh: NodeRef::INVALID,
            initial: Quat::IDENTITY,
            cycle_time: 0.0,
            angle: 0.0,
        }
    }
}

impl MillObstacleEntity {
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[must_use]
    pub fn mesh(&self) -> NodeRef {
        self.mesh
    }
}

impl Entity for MillObstacleEntity {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let store = ctx.nodes();
        self.collider = self.base.find(store, "Phys.MillBlades.Collider")?;
        self.mesh = self.base.find(store, "MillBlades.Mesh")?;
        self.initial = self.mesh.transform(store)?.rotation(store)?;
        self.cycle_time = self.base.prop(store, "cycle_time")?;
        Ok(())
    }

    fn update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        if self.cycle_time > 0.0 {
            self.angle = wrap_angle(self.angle + ctx.dt() * TAU / self.cycle_time);
        }
        let rotation = self.initial * Quat::from_axis_angle(Vec3::Z, self.angle);

        let store = ctx.nodes_mut();
        self.mesh.transform(store)?.set_rotation(store, rotation)?;
        self.mesh.graphics(store)?.set_transform_from_node(store)
    }

    fn pre_physics_update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let store = ctx.nodes();
        let body = self.collider.physics(store)?.body(store)?;
        let rotation = self.mesh.transform(store)?.rotation(store)?;
        ctx.physics().set_body_rotation(body, rotation);
        Ok(())
    }
}
