//! Vector type alias for 3D positions and directions.
//!
//! The world is Y-up. Yaw is measured from +Z towards +X, so a yaw of zero
//! faces +Z and strafing right moves along +X.

use nalgebra::Vector3;

/// 3D vector type for positions, velocities, and directions.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, used throughout
/// the simulation for world positions, movement directions, and collider extents.
pub type Vec3 = Vector3<f32>;

/// Lengths at or below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f32 = 1.0e-6;

/// Normalize `v`, returning the zero vector for degenerate input.
///
/// A player standing still produces a zero movement vector; normalizing it
/// directly would propagate NaN into the position.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(NORMALIZE_EPSILON).unwrap_or_else(Vec3::zeros)
}

/// Horizontal forward direction for a yaw angle (radians).
#[inline]
pub fn flat_forward(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Horizontal right direction for a yaw angle (radians).
#[inline]
pub fn flat_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normalize_or_zero_handles_zero() {
        let n = normalize_or_zero(Vec3::zeros());
        assert_eq!(n, Vec3::zeros());
        assert!(n.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_normalize_or_zero_unit_length() {
        let n = normalize_or_zero(Vec3::new(3.0, 0.0, 4.0));
        assert_abs_diff_eq!(n.norm(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(n, Vec3::new(0.6, 0.0, 0.8), epsilon = 1e-6);
    }

    #[test]
    fn test_basis_vectors_are_orthonormal() {
        for yaw in [0.0_f32, 0.7, -2.1, std::f32::consts::PI] {
            let f = flat_forward(yaw);
            let r = flat_right(yaw);
            assert_abs_diff_eq!(f.norm(), 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(r.norm(), 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(f.dot(&r), 0.0, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(flat_forward(0.0), Vec3::z(), epsilon = 1e-6);
        assert_abs_diff_eq!(flat_right(0.0), Vec3::x(), epsilon = 1e-6);
    }
}
