use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local TRS of a scene node.
///
/// Owned 1:1 by its node through the shared index; the matrix is composed on
/// demand as `T · R · S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub t: Vec3,
    pub r: Quat,
    pub s: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        t: Vec3::ZERO,
        r: Quat::IDENTITY,
        s: Vec3::ONE,
    };

    #[must_use]
    pub fn new() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn from_trs(t: Vec3, r: Quat, s: Vec3) -> Self {
        Self { t, r, s }
    }

    #[must_use]
    pub fn from_translation(t: Vec3) -> Self {
        Self {
            t,
            ..Self::IDENTITY
        }
    }

    /// Decomposes an affine matrix. Shear is lost.
    #[must_use]
    pub fn from_matrix(mat: Mat4) -> Self {
        let (s, r, t) = mat.to_scale_rotation_translation();
        Self { t, r, s }
    }

    /// `translate(t) · rotate(r) · scale(s)`
    #[inline]
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.s, self.r, self.t)
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.t
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.r
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.s
    }

    /// Rotates local +Y into parent space.
    #[inline]
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.r * Vec3::Y
    }

    /// Rotates local -Z into parent space.
    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.r * Vec3::NEG_Z
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.r = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Linear interpolation between two poses, spherical for the rotation.
    #[must_use]
    pub fn lerp(&self, other: &Transform, alpha: f32) -> Transform {
        Transform {
            t: self.t.lerp(other.t, alpha),
            r: self.r.slerp(other.r, alpha),
            s: self.s.lerp(other.s, alpha),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
