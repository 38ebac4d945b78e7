//! Bullets: short-lived projectiles swept against walls and enemies.
//!
//! Each frame a bullet's motion is swept as a small box, so a fast bullet
//! cannot step over a thin collider between frames. Spent bullets are
//! flagged during the pass and dropped in one `retain` at the end.

use crate::collision::{sweep_box, Aabb};
use crate::config::BulletConfig;
use crate::core_types::vec3::{normalize_or_zero, Vec3};
use crate::enemy::Damageable;
use tracing::debug;

/// Fraction of the lifetime forgiven when comparing accumulated age, so
/// frame times that sum to the lifetime expire the bullet despite rounding.
const LIFETIME_TOLERANCE: f32 = 1.0e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub(crate) position: Vec3,
    /// Unit travel direction
    pub(crate) direction: Vec3,
    pub(crate) speed: f32,
    /// Total seconds the bullet may live
    pub(crate) lifetime: f32,
    /// Seconds since spawn
    pub(crate) age: f32,
    pub(crate) active: bool,
    pub(crate) collider: Aabb,
}

impl Bullet {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    /// Seconds left before expiry
    pub fn remaining_lifetime(&self) -> f32 {
        (self.lifetime - self.age).max(0.0)
    }

    fn is_expired(&self) -> bool {
        self.age >= self.lifetime * (1.0 - LIFETIME_TOLERANCE)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn collider(&self) -> Aabb {
        self.collider
    }
}

pub struct BulletManager {
    bullets: Vec<Bullet>,
    config: BulletConfig,
}

impl BulletManager {
    pub fn new(config: BulletConfig) -> Self {
        BulletManager {
            bullets: Vec::new(),
            config,
        }
    }

    fn collider_size(&self) -> Vec3 {
        Vec3::repeat(self.config.collider_size)
    }

    /// Fire a bullet from `origin` along `direction` (normalized here).
    pub fn spawn(&mut self, origin: Vec3, direction: Vec3) {
        let direction = normalize_or_zero(direction);
        debug!("Bullet spawned at {:?} heading {:?}", origin, direction);
        self.bullets.push(Bullet {
            position: origin,
            direction,
            speed: self.config.speed,
            lifetime: self.config.lifetime,
            age: 0.0,
            active: true,
            collider: Aabb::from_center_size(origin, self.collider_size()),
        });
    }

    /// Advance every bullet one frame.
    ///
    /// Per bullet: age it and expire it once its age reaches the lifetime,
    /// move it, then sweep the move against `walls` and living `targets`. A
    /// target reached strictly before the nearest wall takes the hit, first
    /// in slice order winning; otherwise a wall on the path absorbs the
    /// bullet. Each bullet hits at most one target.
    ///
    /// Returns the indices into `targets` that this pass killed.
    pub fn update<T: Damageable>(
        &mut self,
        dt: f32,
        targets: &mut [T],
        walls: &[Aabb],
    ) -> Vec<usize> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let size = self.collider_size();
        let half = size * 0.5;
        let damage = self.config.damage;
        let mut killed = Vec::new();

        for bullet in self.bullets.iter_mut().filter(|b| b.active) {
            bullet.age += dt;
            if bullet.is_expired() {
                bullet.active = false;
                continue;
            }

            let start = bullet.position;
            let motion = bullet.direction * bullet.speed * dt;
            bullet.position += motion;
            bullet.collider = Aabb::from_center_size(bullet.position, size);

            let wall_hit = walls
                .iter()
                .filter_map(|wall| sweep_box(start, motion, half, wall))
                .fold(None, |best: Option<f32>, t| Some(best.map_or(t, |b| b.min(t))));

            let target_hit = targets.iter_mut().enumerate().find(|(_, target)| {
                target.is_alive()
                    && sweep_box(start, motion, half, &target.collider())
                        .is_some_and(|t| wall_hit.is_none_or(|w| t < w))
            });

            if let Some((index, target)) = target_hit {
                bullet.active = false;
                if target.apply_damage(damage) {
                    debug!("Bullet killed target {}", index);
                    killed.push(index);
                }
                continue;
            }

            if wall_hit.is_some() {
                bullet.active = false;
            }
        }

        self.bullets.retain(Bullet::is_active);
        killed
    }

    /// Live bullets, in spawn order
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }
}
