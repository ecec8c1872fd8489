use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

use crate::errors::Result;
use crate::scene::{NodeRef, NodeStore};

/// Spinning blades below a propeller node. Not an entity itself; owned by
/// the entity that places it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Propeller {
    pub node: NodeRef,
    blades: NodeRef,
    initial: Quat,
    /// Half turns per second, sign gives the direction.
    speed: f32,
    angle: f32,
}

impl Propeller {
    /// Resolves the `*.Blades.*` child of `node`.
    pub fn new(store: &NodeStore, node: NodeRef, speed: f32) -> Result<Self> {
        let blades = node.find(store, "*.Blades.*")?;
        let initial = blades.transform(store)?.rotation(store)?;
        Ok(Self {
            node,
            blades,
            initial,
            speed,
            angle: 0.0,
        })
    }

    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[must_use]
    pub fn blades(&self) -> NodeRef {
        self.blades
    }

    pub fn update(&mut self, store: &mut NodeStore, dt: f32) -> Result<()> {
        self.angle = wrap_angle(self.angle + self.speed * dt * PI);

        let rotation = self.initial * Quat::from_axis_angle(Vec3::Y, self.angle);
        self.blades.transform(store)?.set_rotation(store, rotation)?;
        self.blades.graphics(store)?.set_transform_from_node(store)?;
        self.node.graphics(store)?.set_transform_from_node(store)
    }
}

/// Maps `angle` into `[0, 2π)`.
pub(crate) fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}
