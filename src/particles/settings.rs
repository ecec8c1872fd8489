use std::ops::Sub;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Inclusive `min..max` parameter range of an emitter.
///
/// Deserializes from either `{ "min": a, "max": b }` or a single value `a`
/// meaning `a..a`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "RangeRepr<T>",
    bound(deserialize = "T: Deserialize<'de> + Copy")
)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RangeRepr<T> {
    Value(T),
    Bounds { min: T, max: T },
}

impl<T: Copy> From<RangeRepr<T>> for Range<T> {
    fn from(repr: RangeRepr<T>) -> Self {
        match repr {
            RangeRepr::Value(v) => Range {
                min: v,
                max: v,
            },
            RangeRepr::Bounds { min, max } => Range { min, max },
        }
    }
}

impl<T: Copy> Range<T> {
    #[must_use]
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

impl<T: Copy + Sub<Output = T>> Range<T> {
    #[must_use]
    pub fn range(&self) -> T {
        self.max - self.min
    }
}

impl<T: Copy> From<T> for Range<T> {
    fn from(value: T) -> Self {
        Self::splat(value)
    }
}

impl Range<f32> {
    #[must_use]
    pub fn to_vec2(&self) -> Vec2 {
        Vec2::new(self.min, self.max)
    }
}

/// Blend mode of a particle material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleBlending {
    #[default]
    None,
    AlphaClip,
    Additive,
}

/// Emitter configuration.
///
/// Ranges are sampled per emission (count, frequency) or per particle on the
/// GPU (everything else). The maxima of `count`, `life` and `frequency`
/// determine how many buffer slots the emitter reserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    /// Emissions per second.
    pub frequency: Range<f32>,
    /// Particles per emission.
    pub count: Range<u32>,
    /// Particle lifetime in seconds.
    pub life: Range<f32>,

    pub position: Vec3,
    pub direction: Vec3,
    /// Cone half angle in degrees, 0 to 180.
    pub spread: Range<f32>,
    pub gravity: Vec3,

    pub velocity: Range<f32>,
    pub gravity_factor: Range<f32>,
    pub drag: Range<f32>,
    pub rotation: Range<f32>,
    /// Revolutions per second.
    pub revolutions: Range<f32>,
    pub color: Vec3,
    pub hsl_variation: Vec3,
    pub emissivity: Range<f32>,
    pub size: Vec2,
    pub scale: Range<f32>,
    /// Velocity-aligned stretch factor of the sprite.
    pub stretching: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            frequency: Range::splat(10.0),
            count: Range::splat(1),
            life: Range::splat(5.0),
            position: Vec3::ZERO,
            direction: Vec3::Y,
            spread: Range::splat(0.0),
            gravity: Vec3::ZERO,
            velocity: Range::splat(10.0),
            gravity_factor: Range::splat(1.0),
            drag: Range::splat(0.0),
            rotation: Range::splat(0.0),
            revolutions: Range::splat(0.0),
            color: Vec3::ONE,
            hsl_variation: Vec3::ZERO,
            emissivity: Range::splat(0.0),
            size: Vec2::ONE,
            scale: Range::splat(1.0),
            stretching: 0.0,
        }
    }
}

impl ParticleSettings {
    /// Parses an emitter preset. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Buffer slots needed to hold every particle that can be alive at once:
    /// `count.max * ceil(life.max * frequency.max)`.
    #[must_use]
    pub fn required_length(&self) -> u32 {
        let emissions = (self.life.max * self.frequency.max).ceil().max(0.0) as u32;
        self.count.max.saturating_mul(emissions)
    }
}
