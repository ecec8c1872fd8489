use glam::{Quat, Vec3};

use crate::errors::Result;
use crate::scene::{Entity, EntityContext, FromNode, NodeRef};

/// A dynamic box whose mesh follows its rigid body, interpolated between the
/// last two physics states.
///
/// Expects a `Phys.Crate.Box` collider and a `Crate.Mesh` mesh below its
/// node.
#[derive(Debug)]
pub struct CrateEntity {
    base: NodeRef,
    collider: NodeRef,
    mesh: NodeRef,
    start: (Vec3, Quat),
    end: (Vec3, Quat),
}

impl FromNode for CrateEntity {
    fn from_node(base: NodeRef) -> Self {
        Self {
            base,
            collider: NodeRef::INVALID,
            mesh: NodeRef::INVALID,
            start: (Vec3::ZERO, Quat::IDENTITY),
            end: (Vec3::ZERO, Quat::IDENTITY),
        }
    }
}

impl CrateEntity {
    #[must_use]
    pub fn mesh(&self) -> NodeRef {
        self.mesh
    }

    #[must_use]
    pub fn collider(&self) -> NodeRef {
        self.collider
    }

    /// Body pose before and after the latest physics step.
    #[must_use]
    pub fn interpolation_range(&self) -> ((Vec3, Quat), (Vec3, Quat)) {
        (self.start, self.end)
    }

    fn body_pose(&self, ctx: &mut EntityContext<'_>) -> Result<(Vec3, Quat)> {
        let body = self.collider.physics(ctx.nodes())?.body(ctx.nodes())?;
        let physics = ctx.physics();
        Ok((physics.body_position(body), physics.body_rotation(body)))
    }
}

impl Entity for CrateEntity {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let store = ctx.nodes();
        self.collider = self.base.find(store, "Phys.Crate.Box")?;
        self.mesh = self.base.find(store, "Crate.Mesh")?;

        let transform = self.mesh.transform(store)?.get(store)?;
        self.start = (transform.t, transform.r);
        self.end = self.start;
        Ok(())
    }

    fn update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let alpha = ctx.partial_ticks();
        let position = self.start.0.lerp(self.end.0, alpha);
        let rotation = self.start.1.slerp(self.end.1, alpha);

        let store = ctx.nodes_mut();
        let transform = self.mesh.transform(store)?;
        transform.set_position(store, position)?;
        transform.set_rotation(store, rotation)?;
        self.mesh.graphics(store)?.set_transform_from_node(store)
    }

    fn pre_physics_update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        self.start = self.body_pose(ctx)?;
        Ok(())
    }

    fn post_physics_update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        self.end = self.body_pose(ctx)?;
        Ok(())
    }
}
