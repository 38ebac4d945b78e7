//! Player controller.
//!
//! Turns one frame of [`InputSnapshot`] into orientation, movement and
//! firing/reload intent. Collision against static geometry is resolved one
//! axis at a time so the player slides along walls instead of sticking.

use crate::collision::{overlaps_any, ray_intersects_box, Aabb, Ray};
use crate::config::{CameraMode, PlayerConfig, WeaponConfig};
use crate::core_types::input::InputSnapshot;
use crate::core_types::vec3::{flat_forward, flat_right, normalize_or_zero, Vec3};
use crate::player::ammo::AmmoState;
use nalgebra::{Matrix4, Point3, Rotation3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use tracing::debug;

/// Player state read by the action state machine, HUD and renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub(crate) position: Vec3,
    /// Radians, 0 faces +Z
    pub(crate) yaw: f32,
    /// Radians, positive looks up
    pub(crate) pitch: f32,
    pub(crate) ammo: AmmoState,
    /// Seconds until the weapon may fire again
    pub(crate) fire_cooldown: f32,
    /// Set for exactly the frame a shot was fired
    pub(crate) is_firing: bool,
    pub(crate) is_reloading: bool,
    pub(crate) is_moving: bool,
    pub(crate) health: f32,
    pub(crate) speed: f32,
    pub(crate) collider_size: Vec3,
}

impl Player {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn ammo(&self) -> AmmoState {
        self.ammo
    }

    pub fn fire_cooldown(&self) -> f32 {
        self.fire_cooldown
    }

    pub fn is_firing(&self) -> bool {
        self.is_firing
    }

    pub fn is_reloading(&self) -> bool {
        self.is_reloading
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn collider_size(&self) -> Vec3 {
        self.collider_size
    }
}

/// Owns the [`Player`] and applies per-frame input to it.
#[derive(Debug, Clone)]
pub struct PlayerController {
    player: Player,
    config: PlayerConfig,
    weapon: WeaponConfig,
}

impl PlayerController {
    pub fn new(config: PlayerConfig, weapon: WeaponConfig) -> Self {
        let player = Player {
            position: config.start_position,
            yaw: 0.0,
            pitch: 0.0,
            ammo: AmmoState::new(weapon.clip_capacity, weapon.initial_reserve),
            fire_cooldown: 0.0,
            is_firing: false,
            is_reloading: false,
            is_moving: false,
            health: config.health,
            speed: config.speed,
            collider_size: config.collider_size,
        };
        PlayerController {
            player,
            config,
            weapon,
        }
    }

    /// Read-only view of the player
    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn weapon_config(&self) -> &WeaponConfig {
        &self.weapon
    }

    /// Place the player and reset orientation.
    pub fn teleport(&mut self, position: Vec3, yaw: f32) {
        self.player.position = position;
        self.player.yaw = yaw.rem_euclid(TAU);
        self.player.pitch = 0.0;
    }

    /// Advance one frame.
    ///
    /// Order: look, move (axis-separated), cooldown, reload request, trigger.
    /// `is_firing` is cleared at the start so it is only ever true for the
    /// frame in which a round was actually fired.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot, obstacles: &[Aabb]) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.player.is_firing = false;

        self.apply_look(input.mouse_dx, input.mouse_dy);
        self.apply_movement(dt, input, obstacles);

        self.player.fire_cooldown = (self.player.fire_cooldown - dt).max(0.0);

        if input.reload {
            self.start_reload();
        }
        if input.fire {
            self.try_fire();
        }
    }

    fn apply_look(&mut self, dx: f32, dy: f32) {
        let sensitivity = self.config.mouse_sensitivity;
        if dx.is_finite() {
            self.player.yaw = (self.player.yaw + dx * sensitivity).rem_euclid(TAU);
        }
        if dy.is_finite() {
            let limit = self.config.pitch_limit;
            self.player.pitch = (self.player.pitch - dy * sensitivity).clamp(-limit, limit);
        }
    }

    fn apply_movement(&mut self, dt: f32, input: &InputSnapshot, obstacles: &[Aabb]) {
        let forward = flat_forward(self.player.yaw);
        let right = flat_right(self.player.yaw);

        let mut wish = Vec3::zeros();
        if input.forward {
            wish += forward;
        }
        if input.backward {
            wish -= forward;
        }
        if input.right {
            wish += right;
        }
        if input.left {
            wish -= right;
        }

        let direction = normalize_or_zero(wish);
        self.player.is_moving = direction != Vec3::zeros();
        if !self.player.is_moving {
            return;
        }

        let step = direction * self.player.speed * dt;

        // X first, then Z from wherever X left us.
        let mut candidate = self.player.position;
        candidate.x += step.x;
        if !overlaps_any(&self.collider_at(candidate), obstacles) {
            self.player.position.x = candidate.x;
        }

        let mut candidate = self.player.position;
        candidate.z += step.z;
        if !overlaps_any(&self.collider_at(candidate), obstacles) {
            self.player.position.z = candidate.z;
        }
    }

    /// Try to fire one round. Returns true if a round was fired.
    fn try_fire(&mut self) -> bool {
        if self.player.is_reloading || self.player.fire_cooldown > 0.0 {
            return false;
        }
        if !self.player.ammo.consume_round() {
            if self.weapon.auto_reload {
                self.start_reload();
            }
            return false;
        }
        self.player.fire_cooldown = self.weapon.fire_rate;
        self.player.is_firing = true;
        true
    }

    /// Request a reload.
    ///
    /// No-op (returns false) when already reloading, the reserve is empty, or
    /// the clip is already full.
    pub fn start_reload(&mut self) -> bool {
        let ammo = &self.player.ammo;
        if self.player.is_reloading || ammo.reserve == 0 || ammo.is_clip_full() {
            return false;
        }
        debug!(
            "Reload started: clip={}/{}, reserve={}",
            ammo.clip, ammo.clip_capacity, ammo.reserve
        );
        self.player.is_reloading = true;
        true
    }

    /// Finish a reload: move `min(needed, reserve)` rounds into the clip.
    ///
    /// Called once the reload action's timer has elapsed. Returns rounds moved.
    pub fn complete_reload(&mut self) -> u32 {
        let moved = self.player.ammo.refill();
        self.player.is_reloading = false;
        debug!(
            "Reload complete: moved={}, clip={}, reserve={}",
            moved, self.player.ammo.clip, self.player.ammo.reserve
        );
        moved
    }

    /// Reduce health, clamped at zero.
    pub fn take_damage(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.player.health = (self.player.health - amount).max(0.0);
        }
    }

    pub fn is_dead(&self) -> bool {
        self.player.health <= 0.0
    }

    /// Collider at the current position
    pub fn collider(&self) -> Aabb {
        self.collider_at(self.player.position)
    }

    fn collider_at(&self, position: Vec3) -> Aabb {
        Aabb::from_center_size(position + self.config.collider_offset, self.player.collider_size)
    }

    /// Yaw then pitch, mapping local +Z to the look direction.
    pub fn rotation(&self) -> Rotation3<f32> {
        Rotation3::from_axis_angle(&Vec3::y_axis(), self.player.yaw)
            * Rotation3::from_axis_angle(&Vec3::x_axis(), -self.player.pitch)
    }

    /// World-space eye position
    pub fn camera_position(&self) -> Vec3 {
        let p = self.player.position;
        match self.config.camera {
            CameraMode::FirstPerson { eye_height } => p + Vec3::new(0.0, eye_height, 0.0),
            CameraMode::ThirdPerson {
                distance, height, ..
            } => p - flat_forward(self.player.yaw) * distance + Vec3::new(0.0, height, 0.0),
        }
    }

    /// Unit look direction of the camera
    pub fn view_direction(&self) -> Vec3 {
        match self.config.camera {
            CameraMode::FirstPerson { .. } => self.rotation() * Vec3::z(),
            CameraMode::ThirdPerson { target_height, .. } => {
                let target = self.player.position + Vec3::new(0.0, target_height, 0.0);
                let dir = normalize_or_zero(target - self.camera_position());
                if dir == Vec3::zeros() {
                    flat_forward(self.player.yaw)
                } else {
                    dir
                }
            }
        }
    }

    /// Left-handed look-at view matrix (Y up).
    pub fn view_transform(&self) -> Matrix4<f32> {
        let eye = self.camera_position();
        let target = eye + self.view_direction();
        Matrix4::look_at_lh(&Point3::from(eye), &Point3::from(target), &Vec3::y())
    }

    /// Where the crosshair lands.
    ///
    /// Casts from the camera along the view direction against every wall and
    /// returns the closest impact point. Falls back to the point
    /// `max_distance` along the ray when nothing is hit within range.
    pub fn cast_crosshair_ray(&self, walls: &[Aabb], max_distance: f32) -> Vec3 {
        let ray = Ray::new(self.camera_position(), self.view_direction());

        let closest = walls
            .iter()
            .filter_map(|wall| ray_intersects_box(&ray, wall))
            .map(|t| t.max(0.0))
            .filter(|&t| t <= max_distance)
            .fold(None, |best: Option<f32>, t| Some(best.map_or(t, |b| b.min(t))));

        ray.at(closest.unwrap_or(max_distance))
    }
}
