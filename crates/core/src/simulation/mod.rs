//! Frame loop tying the player, actions, enemies and bullets together.
//!
//! One [`GameSimulation::step`] per rendered frame, in this order:
//! player input and movement, action state machine (which may spawn a bullet
//! or finish a reload), enemies, bullets. Rendering reads a
//! [`RenderSnapshot`] afterwards.

pub mod snapshot;

pub use snapshot::{
    AnimationView, BulletView, EnemyView, FrameReport, HudState, RenderSnapshot, SimulationStats,
};

use crate::actions::{PlayerActionStateMachine, PlayerState};
use crate::animation::{AnimationPlayback, ClipPlayer};
use crate::bullet::BulletManager;
use crate::collision::Aabb;
use crate::config::SimulationConfig;
use crate::core_types::input::InputSnapshot;
use crate::core_types::vec3::Vec3;
use crate::enemy::EnemyManager;
use crate::level::{LevelDescription, StaticProp};
use crate::player::{Player, PlayerController};
use nalgebra::Matrix4;
use tracing::{debug, info};

pub struct GameSimulation {
    config: SimulationConfig,
    player: PlayerController,
    actions: PlayerActionStateMachine,
    weapon_anim: ClipPlayer,
    enemies: EnemyManager,
    bullets: BulletManager,
    /// Level obstacles followed by the arena walls
    obstacles: Vec<Aabb>,
    props: Vec<StaticProp>,
    ground_transform: Matrix4<f32>,

    frame_count: u64,
    simulation_time: f32,
    shots_fired: u64,
    kills: u64,
}

impl GameSimulation {
    /// Empty arena: boundary walls only, no enemies.
    pub fn new(config: &SimulationConfig) -> Self {
        Self::from_level(config, &LevelDescription::default())
    }

    /// Build a simulation from a parsed level.
    ///
    /// `config` is validated first; bad values fall back to defaults.
    pub fn from_level(config: &SimulationConfig, level: &LevelDescription) -> Self {
        let config = config.validated();

        let player = PlayerController::new(config.player, config.weapon);
        let actions = PlayerActionStateMachine::new(config.actions.clone());
        // Timed clips know their length so hosts get a normalized time.
        let mut weapon_anim = ClipPlayer::new(config.actions.clip(PlayerState::Idle));
        for state in PlayerState::ALL {
            if let Some(duration) = config.actions.spec(state).duration {
                weapon_anim.set_clip_length(config.actions.clip(state), duration);
            }
        }

        let mut enemies = EnemyManager::new(config.enemies.clone(), config.seed);
        for (position, scale) in level.enemy_spawns() {
            enemies.spawn(position, scale);
        }

        let obstacles = level.obstacles(&config.arena);
        let props = level.static_props();
        let ground_transform = level.ground_transform();

        info!(
            "Game simulation created: {} enemies, {} obstacles, {} props",
            enemies.len(),
            obstacles.len(),
            props.len()
        );

        GameSimulation {
            bullets: BulletManager::new(config.bullets),
            config,
            player,
            actions,
            weapon_anim,
            enemies,
            obstacles,
            props,
            ground_transform,
            frame_count: 0,
            simulation_time: 0.0,
            shots_fired: 0,
            kills: 0,
        }
    }

    /// Advance the world by `dt` seconds of wall-clock time.
    ///
    /// A non-finite or negative `dt` is treated as zero.
    pub fn step(&mut self, dt: f32, input: &InputSnapshot) -> FrameReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.player.update(dt, input, &self.obstacles);
        let outcome = self.actions.update(
            dt,
            &mut self.player,
            &mut self.bullets,
            &self.obstacles,
            &mut self.weapon_anim,
        );
        self.enemies.update(dt, self.player.player().position());
        let killed = self
            .bullets
            .update(dt, self.enemies.targets_mut(), &self.obstacles);

        self.frame_count += 1;
        self.simulation_time += dt;
        self.shots_fired += u64::from(outcome.shots_fired);
        self.kills += killed.len() as u64;

        if !killed.is_empty() {
            debug!(
                "Frame {}: killed {:?}, {} enemies left",
                self.frame_count,
                killed,
                self.enemies.alive_count()
            );
        }

        FrameReport {
            shots_fired: outcome.shots_fired,
            enemies_killed: killed,
            reload_completed: outcome.reload_completed,
            state: self.actions.current_state(),
        }
    }

    /// Add an enemy after construction. Returns its index.
    pub fn spawn_enemy(&mut self, position: Vec3, scale: Vec3) -> usize {
        self.enemies.spawn(position, scale)
    }

    /// Move the player without touching weapon or health state.
    pub fn teleport_player(&mut self, position: Vec3, yaw: f32) {
        self.player.teleport(position, yaw);
    }

    pub fn hud(&self) -> HudState {
        let p = self.player.player();
        let ammo = p.ammo();
        HudState {
            clip: ammo.clip,
            clip_capacity: ammo.clip_capacity,
            reserve: ammo.reserve,
            health: p.health(),
            is_reloading: p.is_reloading(),
            is_dead: self.player.is_dead(),
            enemies_alive: self.enemies.alive_count(),
            enemies_total: self.enemies.len(),
            state: self.actions.current_state(),
        }
    }

    /// Everything the renderer needs for this frame
    pub fn render_snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            view: self.player.view_transform(),
            camera_position: self.player.camera_position(),
            weapon: self.weapon_view(),
            enemies: self
                .enemies
                .enemies()
                .iter()
                .map(EnemyView::from)
                .collect(),
            bullets: self.bullets.bullets().iter().map(BulletView::from).collect(),
            props: self.props.clone(),
            ground: self.ground_transform,
            obstacles: self.obstacles.clone(),
        }
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            frames: self.frame_count,
            simulation_time: self.simulation_time,
            shots_fired: self.shots_fired,
            bullets_live: self.bullets.len(),
            kills: self.kills,
            enemies_alive: self.enemies.alive_count(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        self.player.player()
    }

    pub fn controller(&self) -> &PlayerController {
        &self.player
    }

    pub fn action_state(&self) -> PlayerState {
        self.actions.current_state()
    }

    pub fn weapon_animation(&self) -> &dyn AnimationPlayback {
        &self.weapon_anim
    }

    /// Weapon clip name, time and normalized time
    pub fn weapon_view(&self) -> AnimationView {
        AnimationView::of(&self.weapon_anim)
    }

    pub fn enemies(&self) -> &EnemyManager {
        &self.enemies
    }

    pub fn bullets(&self) -> &BulletManager {
        &self.bullets
    }

    pub fn obstacles(&self) -> &[Aabb] {
        &self.obstacles
    }

    pub fn ground_transform(&self) -> Matrix4<f32> {
        self.ground_transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire() -> InputSnapshot {
        InputSnapshot {
            fire: true,
            ..InputSnapshot::idle()
        }
    }

    #[test]
    fn test_new_has_arena_only() {
        let sim = GameSimulation::new(&SimulationConfig::default());
        assert_eq!(sim.obstacles().len(), 4);
        assert!(sim.enemies().is_empty());
        assert_eq!(sim.action_state(), PlayerState::Idle);
        assert_eq!(sim.weapon_animation().active_clip(), "04 idle");
    }

    #[test]
    fn test_hud_tracks_ammo() {
        let mut sim = GameSimulation::new(&SimulationConfig::default());
        let report = sim.step(0.1, &fire());
        assert_eq!(report.shots_fired, 1);
        assert_eq!(report.state, PlayerState::Fire);

        let hud = sim.hud();
        assert_eq!(hud.clip, 29);
        assert_eq!(hud.clip_capacity, 30);
        assert_eq!(hud.reserve, 90);
        assert_eq!(hud.health, 100.0);
        assert!(!hud.is_reloading);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut sim = GameSimulation::new(&SimulationConfig::default());
        let forward = InputSnapshot {
            forward: true,
            ..InputSnapshot::idle()
        };
        let start = sim.player().position();
        sim.step(f32::NAN, &forward);
        sim.step(-1.0, &forward);
        assert_eq!(sim.player().position(), start);
        assert_eq!(sim.stats().frames, 2);
        assert_eq!(sim.stats().simulation_time, 0.0);
    }

    #[test]
    fn test_arena_walls_stop_bullets() {
        let mut sim = GameSimulation::new(&SimulationConfig::default());
        sim.step(0.1, &fire());
        assert_eq!(sim.bullets().len(), 1);
        // Wall face at z = 48; the bullet starts near z = -9.4 at 100 u/s.
        for _ in 0..7 {
            sim.step(0.1, &InputSnapshot::idle());
        }
        assert!(sim.bullets().is_empty());
        assert_eq!(sim.stats().shots_fired, 1);
    }

    #[test]
    fn test_weapon_view_normalizes_timed_clips_only() {
        let mut sim = GameSimulation::new(&SimulationConfig::default());
        sim.step(0.1, &InputSnapshot::idle());
        let idle = sim.weapon_view();
        assert_eq!(idle.clip, "04 idle");
        assert!(idle.normalized_time.is_none());

        sim.step(0.1, &fire());
        sim.step(0.1, &InputSnapshot::idle());
        let firing = sim.weapon_view();
        assert_eq!(firing.clip, "08 fire");
        assert!((firing.time - 0.2).abs() < 1e-5);
        assert!((firing.normalized_time.unwrap() - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_teleport_moves_camera() {
        let mut sim = GameSimulation::new(&SimulationConfig::default());
        sim.teleport_player(Vec3::new(5.0, 0.0, 5.0), std::f32::consts::FRAC_PI_2);
        assert_eq!(sim.player().position(), Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(sim.render_snapshot().camera_position, Vec3::new(5.0, 1.5, 5.0));

        // Now facing +X: walking forward moves along X.
        let forward = InputSnapshot {
            forward: true,
            ..InputSnapshot::idle()
        };
        sim.step(0.1, &forward);
        let p = sim.player().position();
        assert!((p.x - 5.5).abs() < 1e-4, "moved to {p:?}");
        assert!((p.z - 5.0).abs() < 1e-4, "moved to {p:?}");
    }

    #[test]
    fn test_render_snapshot_lists_entities() {
        let mut sim = GameSimulation::new(&SimulationConfig::default());
        sim.spawn_enemy(Vec3::new(3.0, 0.0, 0.0), Vec3::repeat(1.0));
        sim.step(0.1, &fire());
        let snap = sim.render_snapshot();
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.bullets.len(), 1);
        assert_eq!(snap.obstacles.len(), 4);
        assert_eq!(snap.weapon.clip, "08 fire");
        assert_eq!(snap.weapon.normalized_time.map(|t| (t * 100.0).round()), Some(40.0));
        assert_eq!(snap.camera_position, Vec3::new(0.0, 1.5, -10.0));
    }
}
