//! End-to-end gameplay: shooting enemies, reload cycles and movement against
//! the arena, driven through the public frame loop.

use fps_sim_core::bullet::BulletManager;
use fps_sim_core::config::{BulletConfig, EnemyConfig, SimulationConfig};
use fps_sim_core::core_types::{InputSnapshot, Vec3};
use fps_sim_core::enemy::EnemyManager;
use fps_sim_core::level::LevelDescription;
use fps_sim_core::simulation::GameSimulation;
use fps_sim_core::PlayerState;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn seeded() -> SimulationConfig {
    SimulationConfig {
        seed: Some(42),
        ..SimulationConfig::default()
    }
}

fn pressed(f: impl FnOnce(&mut InputSnapshot)) -> InputSnapshot {
    let mut input = InputSnapshot::idle();
    f(&mut input);
    input
}

#[test]
fn test_bullet_kills_enemy_five_units_ahead() {
    let mut enemies = EnemyManager::new(EnemyConfig::default(), Some(1));
    enemies.spawn(Vec3::new(0.0, 0.0, 5.0), Vec3::repeat(1.0));

    let mut bullets = BulletManager::new(BulletConfig {
        speed: 100.0,
        lifetime: 3.0,
        ..BulletConfig::default()
    });
    bullets.spawn(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0));

    let dt = 0.1;
    let mut travelled = 0.0;
    while travelled < 5.0 {
        bullets.update(dt, enemies.targets_mut(), &[]);
        travelled += 100.0 * dt;
    }

    assert!(enemies.enemies()[0].is_dead());
    assert!(bullets.is_empty());
}

#[test]
fn test_player_shoots_enemy_through_frame_loop() {
    let level = LevelDescription::parse("ENEMY soldier.gem 0 0 5 0 0 0 1 1 1\n");
    let mut sim = GameSimulation::from_level(&seeded(), &level);
    assert_eq!(sim.hud().enemies_alive, 1);

    let mut killed = Vec::new();
    killed.extend(sim.step(0.1, &pressed(|i| i.fire = true)).enemies_killed);
    for _ in 0..5 {
        killed.extend(sim.step(0.1, &InputSnapshot::idle()).enemies_killed);
    }

    assert_eq!(killed, vec![0]);
    let hud = sim.hud();
    assert_eq!(hud.enemies_alive, 0);
    assert_eq!(hud.enemies_total, 1);
    assert_eq!(sim.stats().kills, 1);
    assert!(sim.bullets().is_empty());

    let snapshot = sim.render_snapshot();
    assert!(snapshot.enemies[0].is_dead);
}

#[test]
fn test_dead_enemy_stops_turning() {
    let level = LevelDescription::parse("ENEMY soldier.gem 0 0 5 0 0 0 1 1 1\n");
    let mut sim = GameSimulation::from_level(&seeded(), &level);
    sim.step(0.1, &pressed(|i| i.fire = true));
    sim.step(0.1, &InputSnapshot::idle());
    assert!(sim.enemies().enemies()[0].is_dead());

    let yaw = sim.enemies().enemies()[0].yaw();
    for _ in 0..10 {
        sim.step(0.1, &pressed(|i| i.right = true));
    }
    assert_eq!(sim.enemies().enemies()[0].yaw(), yaw);
}

#[test]
fn test_empty_clip_auto_reloads() {
    let mut sim = GameSimulation::new(&seeded());
    let trigger = pressed(|i| i.fire = true);

    let mut shots = 0;
    for _ in 0..30 {
        shots += sim.step(0.1, &trigger).shots_fired;
    }
    assert_eq!(shots, 30);
    assert_eq!(sim.hud().clip, 0);

    // Dry fire starts the reload.
    sim.step(0.1, &trigger);
    assert!(sim.hud().is_reloading);

    let mut completed = false;
    for _ in 0..40 {
        if sim.step(0.1, &InputSnapshot::idle()).reload_completed {
            completed = true;
            break;
        }
    }
    assert!(completed);

    let hud = sim.hud();
    assert_eq!(hud.clip, 30);
    assert_eq!(hud.reserve, 60);
    assert!(!hud.is_reloading);

    sim.step(0.1, &InputSnapshot::idle());
    assert_eq!(sim.action_state(), PlayerState::Idle);
}

#[test]
fn test_arena_wall_blocks_then_player_slides() {
    let mut sim = GameSimulation::new(&seeded());
    let forward = pressed(|i| i.forward = true);

    // 100 units of walking from z = -10 toward the wall face at z = 48.
    for _ in 0..200 {
        sim.step(0.1, &forward);
    }
    let stopped = sim.player().position();
    assert!(stopped.z > 46.9 && stopped.z < 47.5, "stopped at {stopped:?}");
    assert!(sim.controller().collider().max.z < 48.0);

    let diagonal = pressed(|i| {
        i.forward = true;
        i.right = true;
    });
    for _ in 0..10 {
        sim.step(0.1, &diagonal);
    }
    let slid = sim.player().position();
    assert!(sim.controller().collider().max.z < 48.0);
    assert!(slid.z >= stopped.z);
    assert!(slid.x > 3.0, "slid to {slid:?}");
}

#[test]
fn test_run_state_follows_movement() {
    let mut sim = GameSimulation::new(&seeded());
    sim.step(0.1, &pressed(|i| i.left = true));
    assert_eq!(sim.action_state(), PlayerState::Run);
    assert_eq!(sim.weapon_animation().active_clip(), "07 run");

    sim.step(0.1, &InputSnapshot::idle());
    assert_eq!(sim.action_state(), PlayerState::Idle);
    assert_eq!(sim.weapon_animation().active_clip(), "04 idle");
}
