//! The player: movement, aiming, and weapon handling.

pub mod ammo;
pub mod controller;

pub use ammo::AmmoState;
pub use controller::{Player, PlayerController};
