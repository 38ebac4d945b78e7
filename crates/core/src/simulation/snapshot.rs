//! Per-frame outputs: the step report, HUD values, renderer snapshot and
//! running statistics.

use crate::actions::PlayerState;
use crate::animation::{AnimationPlayback, ClipPlayer};
use crate::bullet::Bullet;
use crate::collision::Aabb;
use crate::core_types::vec3::Vec3;
use crate::enemy::{Damageable, Enemy};
use crate::level::StaticProp;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// What happened during one [`step`](super::GameSimulation::step).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub shots_fired: u32,
    /// Indices into the enemy list
    pub enemies_killed: Vec<usize>,
    pub reload_completed: bool,
    /// Player action after this frame
    pub state: PlayerState,
}

/// Scalar values for the on-screen HUD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudState {
    pub clip: u32,
    pub clip_capacity: u32,
    pub reserve: u32,
    pub health: f32,
    pub is_reloading: bool,
    pub is_dead: bool,
    pub enemies_alive: usize,
    pub enemies_total: usize,
    pub state: PlayerState,
}

/// Active clip and playback position of an animated model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationView {
    pub clip: String,
    pub time: f32,
    /// `time / clip length` when the length is known
    pub normalized_time: Option<f32>,
}

impl AnimationView {
    pub fn of(player: &ClipPlayer) -> Self {
        AnimationView {
            clip: player.active_clip().to_owned(),
            time: player.time(),
            normalized_time: player.normalized_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyView {
    pub transform: Matrix4<f32>,
    pub animation: AnimationView,
    pub collider: Aabb,
    pub is_dead: bool,
}

impl From<&Enemy> for EnemyView {
    fn from(enemy: &Enemy) -> Self {
        EnemyView {
            transform: enemy.transform(),
            animation: AnimationView::of(enemy.animation()),
            collider: enemy.collider(),
            is_dead: enemy.is_dead(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletView {
    pub position: Vec3,
    pub collider: Aabb,
}

impl From<&Bullet> for BulletView {
    fn from(bullet: &Bullet) -> Self {
        BulletView {
            position: bullet.position(),
            collider: bullet.collider(),
        }
    }
}

/// Renderer input for one frame.
///
/// Dead enemies are included with `is_dead` set; skipping them is the
/// renderer's call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub view: Matrix4<f32>,
    pub camera_position: Vec3,
    /// First-person weapon rig
    pub weapon: AnimationView,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub props: Vec<StaticProp>,
    pub ground: Matrix4<f32>,
    /// For debug drawing
    pub obstacles: Vec<Aabb>,
}

/// Statistics for the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub frames: u64,
    pub simulation_time: f32,
    pub shots_fired: u64,
    pub bullets_live: usize,
    pub kills: u64,
    pub enemies_alive: usize,
}
