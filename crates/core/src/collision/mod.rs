//! Collision primitives: boxes, rays, and sweeps.
//!
//! Pure functions with no simulation state. Every gameplay collision check
//! in the crate is a brute-force linear scan over these.

pub mod aabb;
pub mod ray;

pub use aabb::{intersects, overlaps_any, sweep_box, Aabb};
pub use ray::{ray_intersects_box, Ray};
