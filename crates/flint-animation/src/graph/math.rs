//! Shared quaternion math and scalar interpolation for the graph core.
//!
//! Mirrors the free-function style of `crate::blend`'s `quat_slerp`/`quat_mul`
//! helpers, generalized into a `Quat` newtype so the graph's `Transform` type
//! (§3) can expose `inverse`/`delta_from`/composition as methods instead of
//! free functions scattered across callers.

use flint_core::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_array(q: [f32; 4]) -> Self {
        Self::new(q[0], q[1], q[2], q[3])
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Shortest-arc rotation that takes unit vector `from` onto unit vector `to`.
    pub fn from_rotation_between_vectors(from: Vec3, to: Vec3) -> Self {
        let from = from.normalized();
        let to = to.normalized();
        let dot = from.dot(&to);

        if dot > 0.999999 {
            return Self::IDENTITY;
        }
        if dot < -0.999999 {
            // 180 degrees: pick any orthogonal axis
            let axis = if from.x.abs() < 0.9 {
                Vec3::RIGHT.cross(&from)
            } else {
                Vec3::UP.cross(&from)
            }
            .normalized();
            return Self::from_axis_angle(axis, std::f32::consts::PI);
        }

        let axis = from.cross(&to);
        let s = ((1.0 + dot) * 2.0).sqrt();
        let inv_s = 1.0 / s;
        Self::new(axis.x * inv_s, axis.y * inv_s, axis.z * inv_s, s * 0.5).normalized()
    }

    pub fn from_axis_angle(axis: Vec3, angle_radians: f32) -> Self {
        let half = angle_radians * 0.5;
        let (s, c) = half.sin_cos();
        let axis = axis.normalized();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len < 1e-10 {
            return Self::IDENTITY;
        }
        Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// For a unit quaternion, conjugate == inverse.
    pub fn inverse(self) -> Self {
        self.conjugate()
    }

    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }

    pub fn rotate_vector(self, v: Vec3) -> Vec3 {
        // v' = q * v * q^-1, expanded without constructing a pure quaternion.
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(&v);
        let uuv = qv.cross(&uv);
        v + (uv * self.w + uuv) * 2.0
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    /// Spherical linear interpolation with shortest-path correction.
    pub fn slerp(self, rhs: Self, t: f32) -> Self {
        let mut dot = self.dot(rhs);
        let mut rhs = rhs;

        if dot < 0.0 {
            rhs = Self::new(-rhs.x, -rhs.y, -rhs.z, -rhs.w);
            dot = -dot;
        }

        if dot > 0.9995 {
            return Self::new(
                self.x + t * (rhs.x - self.x),
                self.y + t * (rhs.y - self.y),
                self.z + t * (rhs.z - self.z),
                self.w + t * (rhs.w - self.w),
            )
            .normalized();
        }

        let theta = dot.acos();
        let sin_theta = theta.sin();
        let wa = ((1.0 - t) * theta).sin() / sin_theta;
        let wb = (t * theta).sin() / sin_theta;
        Self::new(
            self.x * wa + rhs.x * wb,
            self.y * wa + rhs.y * wb,
            self.z * wa + rhs.z * wb,
            self.w * wa + rhs.w * wb,
        )
    }

    /// Non-spherical nlerp — cheaper, adequate for small-angle joint blends.
    pub fn nlerp(self, rhs: Self, t: f32) -> Self {
        let mut rhs = rhs;
        if self.dot(rhs) < 0.0 {
            rhs = Self::new(-rhs.x, -rhs.y, -rhs.z, -rhs.w);
        }
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
            self.z + (rhs.z - self.z) * t,
            self.w + (rhs.w - self.w) * t,
        )
        .normalized()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Basic linear interpolation.
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

pub fn lerp_vec3(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from + (to - from) * t
}

/// Frame-rate independent lerp. `half_life` is the time to close half the
/// remaining distance to `to`. Fixes the source's `Lerp.h::LerpSmooth`, which
/// is missing its `return` statement (confirmed dead code in the original —
/// the formula below is the documented intent, not a guess).
pub fn lerp_smooth(from: f32, to: f32, dt: f32, half_life: f32) -> f32 {
    to + (from - to) * 2f32.powf(-dt / half_life)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_quat_rotates_nothing() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let r = Quat::IDENTITY.rotate_vector(v);
        assert!((r.x - v.x).abs() < 1e-6);
        assert!((r.y - v.y).abs() < 1e-6);
        assert!((r.z - v.z).abs() < 1e-6);
    }

    #[test]
    fn rotation_between_identical_vectors_is_identity() {
        let v = Vec3::new(0.0, 1.0, 0.0);
        let q = Quat::from_rotation_between_vectors(v, v);
        assert!((q.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_between_vectors_aligns() {
        let from = Vec3::new(1.0, 0.0, 0.0);
        let to = Vec3::new(0.0, 1.0, 0.0);
        let q = Quat::from_rotation_between_vectors(from, to);
        let rotated = q.rotate_vector(from);
        assert!((rotated.x - to.x).abs() < 1e-4);
        assert!((rotated.y - to.y).abs() < 1e-4);
        assert!((rotated.z - to.z).abs() < 1e-4);
    }

    #[test]
    fn slerp_endpoints() {
        let a = Quat::IDENTITY;
        let b = Quat::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_2);
        let r0 = a.slerp(b, 0.0);
        let r1 = a.slerp(b, 1.0);
        assert!((r0.w - a.w).abs() < 1e-5);
        assert!((r1.w - b.w).abs() < 1e-5);
    }

    #[test]
    fn lerp_smooth_converges_by_half_life() {
        let v = lerp_smooth(0.0, 10.0, 1.0, 1.0);
        assert!((v - 5.0).abs() < 1e-4);
    }

    #[test]
    fn lerp_smooth_zero_dt_is_from() {
        let v = lerp_smooth(3.0, 9.0, 0.0, 1.0);
        assert!((v - 3.0).abs() < 1e-4);
    }
}
