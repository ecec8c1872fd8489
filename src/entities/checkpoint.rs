use glam::Vec3;

use crate::entities::propeller::Propeller;
use crate::errors::Result;
use crate::physics::SensorContact;
use crate::scene::{DebugDraw, Entity, EntityContext, FromNode, NodeRef};

/// A race checkpoint gate.
///
/// Expects below its node:
/// - a sensor body matching `*.*.Sensor`
/// - a `*.Respawn` node placing players that reset to this checkpoint
/// - `Propeller.Left` and `Propeller.Right`, each with a `*.Blades.*` child
///
/// Properties: `next_checkpoint` (node name, optional), `is_first` (bool,
/// optional).
#[derive(Debug)]
pub struct CheckpointEntity {
    base: NodeRef,
    sensor: NodeRef,
    respawn: NodeRef,
    next: Option<NodeRef>,
    propellers: Option<[Propeller; 2]>,
    passed: bool,
    activations: u32,
}

impl FromNode for CheckpointEntity {
    fn from_node(base: NodeRef) -> Self {
        Self {
            base,
            sensor: NodeRef::INVALID,
            respawn: NodeRef::INVALID,
            next: None,
            propellers: None,
            passed: false,
            activations: 0,
        }
    }
}

impl CheckpointEntity {
    pub const PROPELLER_SPEED: f32 = 3.0;

    #[must_use]
    pub fn base(&self) -> NodeRef {
        self.base
    }

    #[must_use]
    pub fn sensor(&self) -> NodeRef {
        self.sensor
    }

    /// Where a player restarts after failing past this checkpoint.
    #[must_use]
    pub fn respawn(&self) -> NodeRef {
        self.respawn
    }

    /// The checkpoint that follows this one, if the asset names one.
    #[must_use]
    pub fn next(&self) -> Option<NodeRef> {
        self.next
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Non-persistent sensor contacts seen so far.
    #[must_use]
    pub fn activations(&self) -> u32 {
        self.activations
    }

    #[must_use]
    pub fn propellers(&self) -> Option<&[Propeller; 2]> {
        self.propellers.as_ref()
    }
}

impl Entity for CheckpointEntity {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let store = ctx.nodes();
        self.sensor = self.base.find(store, "*.*.Sensor")?;
        let body = self.sensor.physics(store)?.body(store)?;
        self.respawn = self.base.find(store, "*.Respawn")?;

        let next_name: String = self.base.prop_or(store, "next_checkpoint", String::new())?;
        if !next_name.is_empty() {
            self.next = ctx.scene().by_name(store, &next_name)?;
            if self.next.is_none() {
                log::warn!("Checkpoint next '{next_name}' does not exist");
            }
        }

        let left = Propeller::new(
            store,
            self.base.find(store, "Propeller.Left")?,
            -Self::PROPELLER_SPEED,
        )?;
        let right = Propeller::new(
            store,
            self.base.find(store, "Propeller.Right")?,
            Self::PROPELLER_SPEED,
        )?;
        self.propellers = Some([left, right]);

        ctx.listen(body);
        Ok(())
    }

    fn update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let dt = ctx.dt();
        if let Some(propellers) = self.propellers.as_mut() {
            for propeller in propellers {
                propeller.update(ctx.nodes_mut(), dt)?;
            }
        }
        Ok(())
    }

    fn on_contact(&mut self, ctx: &mut EntityContext<'_>, contact: SensorContact) -> Result<()> {
        if contact.persistent {
            return Ok(());
        }
        self.activations += 1;
        if !self.passed {
            self.passed = true;
            let name = self.base.name(ctx.nodes())?;
            log::info!("Checkpoint '{name}' passed");
        }
        Ok(())
    }

    fn debug_draw(&mut self, ctx: &mut EntityContext<'_>, draw: &mut dyn DebugDraw) -> Result<()> {
        let store = ctx.nodes();
        let from = self.base.transform(store)?.position(store)? + Vec3::new(0.0, 3.0, 0.0);
        draw.point(from, 0.5, Vec3::new(1.0, 1.0, 0.0));

        let respawn = self.respawn.transform(store)?.matrix(store)?;
        let origin = respawn.w_axis.truncate();
        for (axis, color) in [
            (respawn.x_axis, Vec3::X),
            (respawn.y_axis, Vec3::Y),
            (respawn.z_axis, Vec3::Z),
        ] {
            draw.line(origin, origin + axis.truncate().normalize_or_zero() * 2.0, color);
        }

        if let Some(next) = self.next {
            let to = next.transform(store)?.position(store)?;
            draw.line(from, to, Vec3::ZERO);
        }
        Ok(())
    }
}
