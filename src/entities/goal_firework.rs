use glam::{Vec2, Vec3};

use crate::entities::PLAYER_TAG;
use crate::errors::Result;
use crate::particles::{EmitterKey, ParticleSettings, Range};
use crate::physics::SensorContact;
use crate::scene::{Entity, EntityContext, FromNode, NodeRef};

/// Material name the jets emit with.
pub const FIREWORK_MATERIAL: &str = "fire";

/// The finish line. Starts two particle jets the first time a player passes
/// its sensor. Later contacts never start more, even when starting the first
/// pair failed.
///
/// Expects a sensor matching `*.*.Sensor` and two nodes `Jet.Left` and
/// `Jet.Right` below its node.
#[derive(Debug)]
pub struct GoalFireworkEntity {
    base: NodeRef,
    sensor: NodeRef,
    jets: [NodeRef; 2],
    emitters: Vec<EmitterKey>,
    triggered: bool,
}

impl FromNode for GoalFireworkEntity {
    fn from_node(base: NodeRef) -> Self {
        Self {
            base,
            sensor: NodeRef::INVALID,
            jets: [NodeRef::INVALID; 2],
            emitters: Vec::new(),
            triggered: false,
        }
    }
}

impl GoalFireworkEntity {
    #[must_use]
    pub fn triggered(&self) -> bool {
        self.triggered
    }

    #[must_use]
    pub fn emitters(&self) -> &[EmitterKey] {
        &self.emitters
    }

    /// Emitter settings of one jet placed at `position` and pointing along
    /// `direction`.
    #[must_use]
    pub fn jet_settings(position: Vec3, direction: Vec3) -> ParticleSettings {
        ParticleSettings {
            frequency: Range::splat(60.0),
            count: Range::splat(2),
            life: Range::new(1.4, 1.7),
            position,
            direction,
            spread: Range::new(1.0, 7.0),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            velocity: Range::new(15.0, 17.0),
            gravity_factor: Range::splat(1.4),
            emissivity: Range::splat(1.2),
            size: Vec2::splat(0.02),
            stretching: 3.0,
            ..ParticleSettings::default()
        }
    }
}

impl Entity for GoalFireworkEntity {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let store = ctx.nodes();
        self.sensor = self.base.find(store, "*.*.Sensor")?;
        self.jets = [
            self.base.find(store, "Jet.Left")?,
            self.base.find(store, "Jet.Right")?,
        ];
        let body = self.sensor.physics(store)?.body(store)?;

        ctx.listen(body);
        Ok(())
    }

    fn on_contact(&mut self, ctx: &mut EntityContext<'_>, contact: SensorContact) -> Result<()> {
        if contact.persistent || self.triggered {
            return Ok(());
        }
        let store = ctx.nodes();
        let is_player = ctx
            .scene()
            .by_physics_body(store, contact.other)?
            .is_some_and(|node| node.has_tag(store, PLAYER_TAG));
        if !is_player {
            return Ok(());
        }

        let mut settings = Vec::with_capacity(self.jets.len());
        for jet in self.jets {
            let transform = jet.transform(store)?.get(store)?;
            settings.push(Self::jet_settings(transform.t, transform.r * Vec3::Y));
        }
        self.triggered = true;
        log::info!("Goal reached");
        for jet in settings {
            let key = ctx.particles().add(jet, FIREWORK_MATERIAL)?;
            self.emitters.push(key);
        }
        Ok(())
    }

    fn destroy(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        for key in self.emitters.drain(..) {
            ctx.particles().remove(key)?;
        }
        Ok(())
    }
}
