use glam::Vec3;

use crate::errors::Result;
use crate::scene::{DebugDraw, Entity, EntityContext, FromNode, NodeRef};

/// A kinematic barrier sliding back and forth between two marker nodes.
///
/// Expects below its node:
/// - `*.MoveFrom` and `*.MoveTo` markers
/// - a kinematic collider matching `Phys.*.BoxCollider`
/// - a mesh matching `*.Mesh`
///
/// Property `cycle_time` (float, required) is the duration of one way.
#[derive(Debug)]
pub struct BarrierObstacleEntity {
    base: NodeRef,
    from: NodeRef,
    to: NodeRef,
    collider: NodeRef,
    mesh: NodeRef,
    endpoints: (Vec3, Vec3),
    cycle_time: f32,
    /// Position along the round trip, `0..2`.
    phase: f32,
}

impl FromNode for BarrierObstacleEntity {
    fn from_node(base: NodeRef) -> Self {
        Self {
            base,
            from: NodeRef::INVALID,
            to: NodeRef::INVALID,
            collider: NodeRef::INVALID,
            mesh: NodeRef::INVALID,
            endpoints: (Vec3::ZERO, Vec3::ZERO),
            cycle_time: 0.0,
            phase: 0.0,
        }
    }
}

impl BarrierObstacleEntity {
    /// Fraction of the way from `MoveFrom` to `MoveTo`, `0..=1`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.phase <= 1.0 {
            self.phase
        } else {
            2.0 - self.phase
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.endpoints.0.lerp(self.endpoints.1, self.progress())
    }

    #[must_use]
    pub fn mesh(&self) -> NodeRef {
        self.mesh
    }

    #[must_use]
    pub fn collider(&self) -> NodeRef {
        self.collider
    }
}

impl Entity for BarrierObstacleEntity {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let store = ctx.nodes();
        self.from = self.base.find(store, "*.MoveFrom")?;
        self.to = self.base.find(store, "*.MoveTo")?;
        self.collider = self.base.find(store, "Phys.*.BoxCollider")?;
        self.mesh = self.base.find(store, "*.Mesh")?;
        self.cycle_time = self.base.prop(store, "cycle_time")?;

        self.endpoints = (
            self.from.transform(store)?.position(store)?,
            self.to.transform(store)?.position(store)?,
        );
        if self.cycle_time <= 0.0 {
            log::warn!(
                "Barrier '{}' has cycle_time {}, it will not move",
                self.base.name(store)?,
                self.cycle_time
            );
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        if self.cycle_time > 0.0 {
            self.phase = (self.phase + ctx.dt() / self.cycle_time).rem_euclid(2.0);
        }
        let position = self.position();

        let store = ctx.nodes_mut();
        self.mesh.transform(store)?.set_position(store, position)?;
        self.mesh.graphics(store)?.set_transform_from_node(store)
    }

    fn pre_physics_update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let body = self.collider.physics(ctx.nodes())?.body(ctx.nodes())?;
        let position = self.position();
        ctx.physics().set_body_position(body, position);
        Ok(())
    }

    fn debug_draw(&mut self, _ctx: &mut EntityContext<'_>, draw: &mut dyn DebugDraw) -> Result<()> {
        draw.line(self.endpoints.0, self.endpoints.1, Vec3::ZERO);
        Ok(())
    }
}
