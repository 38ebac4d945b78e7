//! Rays and the slab test.

use crate::collision::aabb::Aabb;
use crate::core_types::vec3::Vec3;

/// Ray with a precomputed reciprocal direction.
///
/// Zero direction components have an infinite reciprocal. The slab test
/// guards those axes explicitly instead of relying on `0 * inf`, which is NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    /// Create a ray. `direction` is used as given; pass a unit vector if
    /// hit distances should be in world units.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Ray {
            origin,
            direction,
            inv_direction: direction.map(|d| 1.0 / d),
        }
    }

    /// Reciprocal of each direction component
    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    /// Point at parametric distance `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Parametric entry/exit distances against `aabb`.
    ///
    /// Returns `(t_entry, t_exit)`, the max of per-axis entries and the min
    /// of per-axis exits. The ray hits iff `t_exit >= 0 && t_entry <= t_exit`.
    /// An axis the ray is parallel to contributes no bound when the origin
    /// lies inside that slab and an empty interval when it does not.
    pub fn slab_interval(&self, aabb: &Aabb) -> (f32, f32) {
        let mut t_entry = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if self.direction[axis] == 0.0 {
                if origin < lo || origin > hi {
                    return (f32::INFINITY, f32::NEG_INFINITY);
                }
                continue;
            }

            let inv = self.inv_direction[axis];
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;
            t_entry = t_entry.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        (t_entry, t_exit)
    }
}

/// Slab-method ray/box test.
///
/// Returns the entry distance on a hit. The entry distance is negative when
/// the origin is inside the box.
pub fn ray_intersects_box(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let (t_entry, t_exit) = ray.slab_interval(aabb);
    (t_exit >= 0.0 && t_entry <= t_exit).then_some(t_entry)
}
