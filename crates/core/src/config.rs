//! Simulation tuning.
//!
//! Every struct here deserializes with `#[serde(default)]`, so a config file
//! only has to name the values it changes. Defaults are the shipped game's
//! tuning.

use crate::actions::ActionTable;
use crate::core_types::vec3::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Camera placement relative to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Eye at `position + (0, eye_height, 0)`, looking along yaw/pitch.
    FirstPerson { eye_height: f32 },
    /// Chase camera behind the player, looking at `position + (0, target_height, 0)`.
    ThirdPerson {
        distance: f32,
        height: f32,
        target_height: f32,
    },
}

impl Default for CameraMode {
    fn default() -> Self {
        CameraMode::FirstPerson { eye_height: 1.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start_position: Vec3,
    /// Units per second
    pub speed: f32,
    /// Radians per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]` radians
    pub pitch_limit: f32,
    pub collider_size: Vec3,
    /// Collider centre relative to `position` (feet)
    pub collider_offset: Vec3,
    pub health: f32,
    pub camera: CameraMode,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            start_position: Vec3::new(0.0, 0.0, -10.0),
            speed: 5.0,
            mouse_sensitivity: 0.002,
            pitch_limit: 1.5,
            collider_size: Vec3::new(1.0, 2.0, 1.0),
            collider_offset: Vec3::new(0.0, 1.0, 0.0),
            health: 100.0,
            camera: CameraMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub clip_capacity: u32,
    pub initial_reserve: u32,
    /// Minimum seconds between shots
    pub fire_rate: f32,
    /// Muzzle position in the camera's local frame (+x right, +y up, +z forward)
    pub muzzle_offset: Vec3,
    /// Crosshair ray length when nothing is hit
    pub crosshair_range: f32,
    /// Pulling the trigger on an empty clip starts a reload
    pub auto_reload: bool,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        WeaponConfig {
            clip_capacity: 30,
            initial_reserve: 90,
            fire_rate: 0.1,
            muzzle_offset: Vec3::new(0.25, -0.25, 0.6),
            crosshair_range: 1000.0,
            auto_reload: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub speed: f32,
    /// Seconds before an unobstructed bullet expires
    pub lifetime: f32,
    /// Edge length of the cubic collider
    pub collider_size: f32,
    /// Health removed from an enemy per hit
    pub damage: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        BulletConfig {
            speed: 100.0,
            lifetime: 3.0,
            collider_size: 0.1,
            damage: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub health: f32,
    pub collider_size: Vec3,
    pub collider_offset: Vec3,
    /// Added to `atan2(dx, dz)` to line the model's forward axis up with the player
    pub facing_offset: f32,
    pub idle_clip: String,
    /// Length of the idle clip, if the host knows it
    pub idle_clip_length: Option<f32>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            health: 100.0,
            collider_size: Vec3::new(1.0, 2.0, 1.0),
            collider_offset: Vec3::new(0.0, 1.0, 0.0),
            facing_offset: std::f32::consts::PI + 0.5,
            idle_clip: "idle".to_owned(),
            idle_clip_length: None,
        }
    }
}

/// Fixed boundary walls around the playable square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Distance from the origin to the inner face of each boundary wall
    pub map_limit: f32,
    pub wall_thickness: f32,
    pub wall_height: f32,
    /// Length of each wall along its long axis
    pub wall_span: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            map_limit: 48.0,
            wall_thickness: 10.0,
            wall_height: 100.0,
            wall_span: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub player: PlayerConfig,
    pub weapon: WeaponConfig,
    pub actions: ActionTable,
    pub bullets: BulletConfig,
    pub enemies: EnemyConfig,
    pub arena: ArenaConfig,
    /// Seed for enemy animation phases; `None` seeds from the OS
    pub seed: Option<u64>,
}

fn sanitize(name: &str, value: &mut f32, fallback: f32, allow_zero: bool) {
    let ok = value.is_finite() && (*value > 0.0 || (allow_zero && *value == 0.0));
    if !ok {
        warn!("Config value {} = {} is invalid, using {}", name, value, fallback);
        *value = fallback;
    }
}

fn sanitize_size(name: &str, value: &mut Vec3, fallback: Vec3) {
    if !value.iter().all(|c| c.is_finite() && *c >= 0.0) {
        warn!("Config value {} = {:?} is invalid, using {:?}", name, value, fallback);
        *value = fallback;
    }
}

impl SimulationConfig {
    /// Copy of this config with out-of-range values replaced by defaults.
    ///
    /// Never fails; each replacement is logged at warn level.
    pub fn validated(&self) -> Self {
        let defaults = SimulationConfig::default();
        let mut cfg = self.clone();

        let p = &mut cfg.player;
        sanitize("player.speed", &mut p.speed, defaults.player.speed, true);
        sanitize(
            "player.mouse_sensitivity",
            &mut p.mouse_sensitivity,
            defaults.player.mouse_sensitivity,
            true,
        );
        sanitize("player.pitch_limit", &mut p.pitch_limit, defaults.player.pitch_limit, true);
        // Keep the view from flipping over the pole.
        p.pitch_limit = p.pitch_limit.min(std::f32::consts::FRAC_PI_2 - 0.01);
        sanitize("player.health", &mut p.health, defaults.player.health, false);
        sanitize_size("player.collider_size", &mut p.collider_size, defaults.player.collider_size);
        if !p.start_position.iter().all(|c| c.is_finite()) {
            warn!("Config value player.start_position is not finite, using default");
            p.start_position = defaults.player.start_position;
        }
        if !p.collider_offset.iter().all(|c| c.is_finite()) {
            p.collider_offset = defaults.player.collider_offset;
        }

        let w = &mut cfg.weapon;
        sanitize("weapon.fire_rate", &mut w.fire_rate, defaults.weapon.fire_rate, true);
        sanitize(
            "weapon.crosshair_range",
            &mut w.crosshair_range,
            defaults.weapon.crosshair_range,
            false,
        );
        if !w.muzzle_offset.iter().all(|c| c.is_finite()) {
            w.muzzle_offset = defaults.weapon.muzzle_offset;
        }

        cfg.actions = cfg.actions.validated();

        let b = &mut cfg.bullets;
        sanitize("bullets.speed", &mut b.speed, defaults.bullets.speed, true);
        sanitize("bullets.lifetime", &mut b.lifetime, defaults.bullets.lifetime, true);
        sanitize(
            "bullets.collider_size",
            &mut b.collider_size,
            defaults.bullets.collider_size,
            true,
        );
        sanitize("bullets.damage", &mut b.damage, defaults.bullets.damage, true);

        let e = &mut cfg.enemies;
        sanitize("enemies.health", &mut e.health, defaults.enemies.health, false);
        sanitize_size("enemies.collider_size", &mut e.collider_size, defaults.enemies.collider_size);
        if !e.collider_offset.iter().all(|c| c.is_finite()) {
            e.collider_offset = defaults.enemies.collider_offset;
        }
        if !e.facing_offset.is_finite() {
            e.facing_offset = defaults.enemies.facing_offset;
        }

        let a = &mut cfg.arena;
        sanitize("arena.map_limit", &mut a.map_limit, defaults.arena.map_limit, true);
        sanitize(
            "arena.wall_thickness",
            &mut a.wall_thickness,
            defaults.arena.wall_thickness,
            true,
        );
        sanitize("arena.wall_height", &mut a.wall_height, defaults.arena.wall_height, true);
        sanitize("arena.wall_span", &mut a.wall_span, defaults.arena.wall_span, true);

        cfg
    }
}
