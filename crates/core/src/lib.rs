//! FPS Simulation Core Library
//!
//! Frame-stepped gameplay simulation for a first-person shooter: player
//! movement and aiming with axis-separated collision, a weapon action state
//! machine, enemies that track the player, and swept bullets.
//!
//! ## Frame Loop
//!
//! [`GameSimulation::step`] runs one frame from an explicit [`InputSnapshot`]:
//! - Player look, movement and trigger handling
//! - Action state machine (bullet spawn, reload completion, weapon clip)
//! - Enemy facing and idle animation
//! - Bullet integration, wall/enemy hits and compaction
//!
//! Rendering is out of scope; [`GameSimulation::render_snapshot`] exposes
//! transforms, animation clips and colliders for whatever draws the frame.

// Core types and utilities
pub mod core_types;

// Collision primitives
pub mod collision;

// Gameplay
pub mod actions;
pub mod animation;
pub mod bullet;
pub mod enemy;
pub mod player;

// World setup and the frame loop
pub mod config;
pub mod level;
pub mod simulation;

// Re-export core types
pub use core_types::{InputSnapshot, Vec3};

// Re-export collision
pub use collision::{intersects, ray_intersects_box, Aabb, Ray};

// Re-export gameplay types
pub use actions::{ActionTable, PlayerActionStateMachine, PlayerState};
pub use animation::{AnimationPlayback, ClipPlayer};
pub use bullet::{Bullet, BulletManager};
pub use enemy::{Damageable, Enemy, EnemyManager};
pub use player::{AmmoState, Player, PlayerController};

// Re-export world and frame loop types
pub use config::{
    ArenaConfig, BulletConfig, CameraMode, EnemyConfig, PlayerConfig, SimulationConfig,
    WeaponConfig,
};
pub use level::{LevelDescription, LevelError};
pub use simulation::{FrameReport, GameSimulation, HudState, RenderSnapshot, SimulationStats};
