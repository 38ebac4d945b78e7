//! Enemies: stationary targets that turn to face the player.

use crate::animation::{AnimationPlayback, ClipPlayer};
use crate::collision::Aabb;
use crate::config::EnemyConfig;
use crate::core_types::vec3::Vec3;
use nalgebra::{Matrix4, Rotation3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Something a bullet can hit.
///
/// The bullet pass only needs these three operations, so it never sees the
/// concrete enemy container.
pub trait Damageable {
    /// World-space collision box
    fn collider(&self) -> Aabb;

    fn is_alive(&self) -> bool;

    /// Subtract `amount` health. Returns true if this hit was fatal.
    fn apply_damage(&mut self, amount: f32) -> bool;
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub(crate) position: Vec3,
    /// Radians about +Y
    pub(crate) yaw: f32,
    pub(crate) scale: Vec3,
    pub(crate) transform: Matrix4<f32>,
    pub(crate) anim: ClipPlayer,
    pub(crate) collider: Aabb,
    pub(crate) health: f32,
    pub(crate) is_dead: bool,
}

impl Enemy {
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// World transform: scale, then yaw, then translation
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    pub fn animation(&self) -> &ClipPlayer {
        &self.anim
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    fn rebuild(&mut self, config: &EnemyConfig) {
        let t = Matrix4::new_translation(&self.position);
        let r = Rotation3::from_axis_angle(&Vec3::y_axis(), self.yaw).to_homogeneous();
        let s = Matrix4::new_nonuniform_scaling(&self.scale);
        self.transform = t * r * s;
        self.collider =
            Aabb::from_center_size(self.position + config.collider_offset, config.collider_size);
    }
}

impl Damageable for Enemy {
    fn collider(&self) -> Aabb {
        self.collider
    }

    fn is_alive(&self) -> bool {
        !self.is_dead
    }

    fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_dead {
            return false;
        }
        self.health -= amount.max(0.0);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.is_dead = true;
            return true;
        }
        false
    }
}

/// Owns every enemy in the level.
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    config: EnemyConfig,
    rng: StdRng,
}

impl EnemyManager {
    /// `seed` makes spawn phases reproducible; `None` seeds from the OS.
    pub fn new(config: EnemyConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        EnemyManager {
            enemies: Vec::new(),
            config,
            rng,
        }
    }

    /// Add a living enemy at `position`. Returns its index.
    ///
    /// The idle clip starts at a random phase so neighbours don't animate in
    /// lockstep.
    pub fn spawn(&mut self, position: Vec3, scale: Vec3) -> usize {
        let mut anim = ClipPlayer::new(&self.config.idle_clip);
        let phase = match self.config.idle_clip_length {
            Some(len) => {
                anim.set_clip_length(&self.config.idle_clip, len);
                self.rng.random::<f32>() * len
            }
            None => self.rng.random::<f32>(),
        };
        anim.set_time(phase);

        let mut enemy = Enemy {
            position,
            yaw: 0.0,
            scale,
            transform: Matrix4::identity(),
            anim,
            collider: Aabb::new(position, position),
            health: self.config.health,
            is_dead: false,
        };
        enemy.rebuild(&self.config);

        debug!("Spawned enemy {} at {:?}", self.enemies.len(), position);
        self.enemies.push(enemy);
        self.enemies.len() - 1
    }

    /// Animate living enemies and turn them toward the player.
    ///
    /// Dead enemies are left exactly as they were.
    pub fn update(&mut self, dt: f32, player_position: Vec3) {
        let config = &self.config;
        for enemy in self.enemies.iter_mut().filter(|e| !e.is_dead) {
            enemy.anim.set_active_clip(&config.idle_clip);
            enemy.anim.advance(dt);

            let to_player = player_position - enemy.position;
            enemy.yaw = to_player.x.atan2(to_player.z) + config.facing_offset;
            enemy.rebuild(config);
        }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Mutable view handed to the bullet pass
    pub fn targets_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead).count()
    }
}
