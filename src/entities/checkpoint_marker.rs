use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::entities::FIREWORK_MATERIAL;
use crate::errors::Result;
use crate::particles::{EmitterKey, ParticleSettings, Range};
use crate::scene::{Entity, EntityContext, NodeRef};

/// Two particle streams circling the checkpoint the player has to pass next.
///
/// A free entity: the race logic creates it with `Scene::create` and moves it
/// along with [`CheckpointMarkerEntity::set_target`]. Without a target the
/// emitters stay where they last were.
#[derive(Debug, Default)]
pub struct CheckpointMarkerEntity {
    target: Option<NodeRef>,
    emitters: Option<[EmitterKey; 2]>,
    angle: f32,
}

impl CheckpointMarkerEntity {
    /// Orbit radius in the target's local XY plane.
    pub const RADIUS: f32 = 3.0;
    /// Orbit speed in radians per second.
    pub const SPEED: f32 = 12.0;

    #[must_use]
    pub fn new(target: NodeRef) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn target(&self) -> Option<NodeRef> {
        self.target
    }

    pub fn set_target(&mut self, target: NodeRef) {
        self.target = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    #[must_use]
    pub fn emitters(&self) -> Option<[EmitterKey; 2]> {
        self.emitters
    }

    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[must_use]
    pub fn stream_settings() -> ParticleSettings {
        ParticleSettings {
            frequency: Range::splat(100.0),
            count: Range::splat(3),
            life: Range::new(0.5, 0.6),
            position: Vec3::new(0.0, 100.0, 0.0),
            direction: Vec3::Y,
            spread: Range::new(1.0, 7.0),
            gravity: Vec3::ZERO,
            velocity: Range::new(3.0, 4.0),
            gravity_factor: Range::splat(1.0),
            revolutions: Range::new(60.0, 120.0),
            emissivity: Range::splat(2.0),
            size: Vec2::splat(0.02),
            stretching: 3.0,
            ..ParticleSettings::default()
        }
    }
}

impl Entity for CheckpointMarkerEntity {
    fn init(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let particles = ctx.particles();
        let first = particles.add(Self::stream_settings(), FIREWORK_MATERIAL)?;
        let second = match particles.add(Self::stream_settings(), FIREWORK_MATERIAL) {
            Ok(key) => key,
            Err(err) => {
                particles.remove(first)?;
                return Err(err);
            }
        };
        self.emitters = Some([first, second]);
        Ok(())
    }

    fn update(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        let (Some(target), Some(emitters)) = (self.target, self.emitters) else {
            return Ok(());
        };
        let store = ctx.nodes();
        let transform = target.transform(store)?;
        let matrix = transform.matrix(store)?;
        let rotation = transform.rotation(store)?;

        let particles = ctx.particles();
        for (key, offset) in emitters.into_iter().zip([0.0, PI]) {
            let angle = self.angle + offset;
            let local = Vec3::new(angle.cos(), angle.sin(), 0.0);
            if let Some(emitter) = particles.emitter_mut(key) {
                let settings = emitter.settings_mut();
                settings.position = matrix.transform_point3(local * Self::RADIUS);
                settings.direction = rotation * -local;
            }
        }
        self.angle = (self.angle + Self::SPEED * ctx.dt()).rem_euclid(TAU);
        Ok(())
    }

    fn destroy(&mut self, ctx: &mut EntityContext<'_>) -> Result<()> {
        if let Some(emitters) = self.emitters.take() {
            for key in emitters {
                ctx.particles().remove(key)?;
            }
        }
        Ok(())
    }
}
