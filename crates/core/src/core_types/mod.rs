//! Core types and utilities

pub mod input;
pub mod vec3;

pub use input::InputSnapshot;
pub use vec3::{flat_forward, flat_right, normalize_or_zero, Vec3};
