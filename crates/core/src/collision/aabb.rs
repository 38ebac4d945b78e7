//! Axis-aligned bounding boxes.
//!
//! Boxes are stored as `min`/`max` corners. Static obstacles are built once
//! at level load, dynamic colliders are rebuilt every frame from the owning
//! entity's position.

use crate::collision::ray::{ray_intersects_box, Ray};
use crate::core_types::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with `min.axis <= max.axis` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Build a box from two corners, ordering each axis so the invariant holds.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Aabb {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Build a box from its centre and full size (`min = c - s/2`, `max = c + s/2`).
    ///
    /// Negative size components are taken by magnitude.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Aabb {
            min: center - half,
            max: center + half,
        }
    }

    /// Centre point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Box grown by `amount` on every side (Minkowski sum with a box of half size `amount`).
    pub fn expanded(&self, amount: Vec3) -> Self {
        Aabb {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// Closed-interval point containment.
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Overlap test against another box. See [`intersects`].
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        intersects(self, other)
    }
}

/// True iff the boxes overlap on all three axes.
///
/// Intervals are closed: boxes that only touch on a face, edge or corner
/// count as overlapping.
#[inline]
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    a.min.x <= b.max.x
        && a.max.x >= b.min.x
        && a.min.y <= b.max.y
        && a.max.y >= b.min.y
        && a.min.z <= b.max.z
        && a.max.z >= b.min.z
}

/// True if `collider` overlaps any box in `obstacles` (linear scan).
pub fn overlaps_any(collider: &Aabb, obstacles: &[Aabb]) -> bool {
    obstacles.iter().any(|o| intersects(collider, o))
}

/// Sweep a box of half size `half_extents` from `start` along `motion`.
///
/// Returns the fraction of `motion` (in `[0, 1]`) at which the moving box
/// first touches `target`, or `None` if it never does. A box that already
/// overlaps at `start` reports `0.0`. Zero motion degrades to a plain
/// overlap test at `start`.
pub fn sweep_box(start: Vec3, motion: Vec3, half_extents: Vec3, target: &Aabb) -> Option<f32> {
    let grown = target.expanded(half_extents);
    let travel = motion.norm();

    if travel <= f32::EPSILON {
        return grown.contains_point(start).then_some(0.0);
    }

    let ray = Ray::new(start, motion / travel);
    ray_intersects_box(&ray, &grown)
        .filter(|&t| t <= travel)
        .map(|t| (t / travel).max(0.0))
}
