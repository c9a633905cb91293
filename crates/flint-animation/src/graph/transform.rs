//! The graph core's transform type (spec §3): unit quaternion rotation,
//! translation, uniform scale. Distinct from `flint_core::Transform` (Euler
//! rotation, non-uniform scale, used by the ECS-facing Tier 1/2 animation
//! path) — the graph core needs quaternion composition for correct blending
//! and IK, so it gets its own, smaller type, matching how Esoterica's
//! `Transform` differs from its scene-graph transform.

use crate::graph::math::Quat;
use flint_core::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        scale: 1.0,
    };

    pub const fn new(rotation: Quat, translation: Vec3, scale: f32) -> Self {
        Self {
            rotation,
            translation,
            scale,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// Right-to-left composition: `self` is the child's local transform,
    /// `parent` is the parent's (usually model-space) transform. Matches
    /// spec §3: `child_model = local * parent_model`.
    pub fn compose(self, parent: Self) -> Self {
        let rotation = parent.rotation.mul(self.rotation);
        let scale = self.scale * parent.scale;
        let translation =
            parent.rotation.rotate_vector(self.translation * parent.scale) + parent.translation;
        Self {
            rotation,
            translation,
            scale,
        }
    }

    pub fn inverse(self) -> Self {
        let inv_rotation = self.rotation.inverse();
        let inv_scale = if self.scale.abs() > 1e-10 {
            1.0 / self.scale
        } else {
            0.0
        };
        let inv_translation = inv_rotation.rotate_vector(self.translation) * -inv_scale;
        Self {
            rotation: inv_rotation,
            translation: inv_translation,
            scale: inv_scale,
        }
    }

    /// Returns `delta` such that `delta.compose(self) == other`.
    pub fn delta_from(self, other: Self) -> Self {
        other.compose(self.inverse())
    }

    pub fn to_matrix(self) -> [[f32; 4]; 4] {
        let q = self.rotation;
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        let s = self.scale;

        [
            [(1.0 - (yy + zz)) * s, (xy + wz) * s, (xz - wy) * s, 0.0],
            [(xy - wz) * s, (1.0 - (xx + zz)) * s, (yz + wx) * s, 0.0],
            [(xz + wy) * s, (yz - wx) * s, (1.0 - (xx + yy)) * s, 0.0],
            [self.translation.x, self.translation.y, self.translation.z, 1.0],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_compose_is_identity() {
        let t = Transform::IDENTITY.compose(Transform::IDENTITY);
        assert_eq!(t, Transform::IDENTITY);
    }

    #[test]
    fn translation_composes_additively_with_identity_rotation() {
        let local = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let parent = Transform::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let model = local.compose(parent);
        assert!((model.translation.x - 1.0).abs() < 1e-6);
        assert!((model.translation.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_undoes_compose() {
        let t = Transform::new(
            Quat::from_axis_angle(Vec3::UP, 0.7),
            Vec3::new(3.0, -1.0, 2.0),
            1.5,
        );
        let identity_again = t.compose(t.inverse());
        assert!(identity_again.translation.length() < 1e-3);
        assert!((identity_again.scale - 1.0).abs() < 1e-3);
    }

    #[test]
    fn delta_from_recovers_other() {
        let a = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Transform::from_translation(Vec3::new(4.0, 5.0, 0.0));
        let delta = a.delta_from(b);
        let recomposed = delta.compose(a);
        assert!((recomposed.translation.x - b.translation.x).abs() < 1e-4);
        assert!((recomposed.translation.y - b.translation.y).abs() < 1e-4);
    }
}
