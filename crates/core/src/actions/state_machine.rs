use crate::actions::table::{ActionTable, PlayerState};
use crate::animation::AnimationPlayback;
use crate::bullet::BulletManager;
use crate::collision::Aabb;
use crate::core_types::vec3::{normalize_or_zero, Vec3};
use crate::player::PlayerController;
use tracing::debug;

/// What the state machine did during one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub shots_fired: u32,
    pub reload_completed: bool,
}

/// Chooses the player's action each frame.
///
/// Untimed states (idle, run) are re-evaluated every frame in the order
/// reload, fire, run, idle. Timed states (fire, reload) lock for their
/// configured duration. When a lock expires the state is kept for that frame
/// and intent is re-evaluated on the next one.
#[derive(Debug, Clone)]
pub struct PlayerActionStateMachine {
    table: ActionTable,
    state: PlayerState,
    /// Seconds spent in the current timed state; `None` while unlocked
    lock_elapsed: Option<f32>,
}

impl PlayerActionStateMachine {
    pub fn new(table: ActionTable) -> Self {
        PlayerActionStateMachine {
            table,
            state: PlayerState::Idle,
            lock_elapsed: None,
        }
    }

    pub fn current_state(&self) -> PlayerState {
        self.state
    }

    pub fn table(&self) -> &ActionTable {
        &self.table
    }

    /// True once the current timed action has run its course (always true
    /// for untimed states).
    pub fn is_action_finished(&self) -> bool {
        self.lock_elapsed.is_none()
    }

    /// Run one frame.
    ///
    /// Call after [`PlayerController::update`] so the player's firing,
    /// reloading and moving flags describe this frame.
    pub fn update(
        &mut self,
        dt: f32,
        player: &mut PlayerController,
        bullets: &mut BulletManager,
        walls: &[Aabb],
        anim: &mut dyn AnimationPlayback,
    ) -> ActionOutcome {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut outcome = ActionOutcome::default();

        if let Some(elapsed) = self.lock_elapsed {
            if self.state == PlayerState::Fire && player.player().is_firing() {
                // Next round left the barrel before the fire pose finished.
                Self::fire(player, bullets, walls);
                outcome.shots_fired += 1;
                self.lock_elapsed = Some(0.0);
            } else {
                let elapsed = elapsed + dt;
                if elapsed >= self.table.duration(self.state) {
                    self.lock_elapsed = None;
                    if self.state == PlayerState::Reload {
                        player.complete_reload();
                        outcome.reload_completed = true;
                    }
                } else {
                    self.lock_elapsed = Some(elapsed);
                }
            }
        } else {
            let next = Self::evaluate(player);
            if next == PlayerState::Fire {
                Self::fire(player, bullets, walls);
                outcome.shots_fired += 1;
            }
            self.set_state(next, anim);

            if next == PlayerState::Reload && self.lock_elapsed.is_none() {
                // No reload duration configured: finish immediately.
                player.complete_reload();
                outcome.reload_completed = true;
            }
        }

        self.advance_playback(dt, anim);
        outcome
    }

    fn evaluate(player: &PlayerController) -> PlayerState {
        let p = player.player();
        if p.is_reloading() {
            PlayerState::Reload
        } else if p.is_firing() {
            PlayerState::Fire
        } else if p.is_moving() {
            PlayerState::Run
        } else {
            PlayerState::Idle
        }
    }

    /// Enter `next`. The clip only restarts when its name changes, so
    /// re-entering the same state keeps playing where it was.
    fn set_state(&mut self, next: PlayerState, anim: &mut dyn AnimationPlayback) {
        if next != self.state {
            debug!("Player state {} -> {}", self.state.name(), next.name());
        }
        self.state = next;
        self.lock_elapsed = self.table.is_timed(next).then_some(0.0);

        let clip = self.table.clip(next);
        if anim.active_clip() != clip {
            anim.set_active_clip(clip);
            anim.set_time(0.0);
        }
    }

    /// Timed states hold their last pose at `duration - epsilon` instead of
    /// looping.
    fn advance_playback(&self, dt: f32, anim: &mut dyn AnimationPlayback) {
        if self.table.is_timed(self.state) {
            let duration = self.table.duration(self.state);
            if anim.time() + dt >= duration {
                anim.set_time((duration - self.table.hold_epsilon).max(0.0));
                return;
            }
        }
        anim.advance(dt);
    }

    /// Spawn a bullet at the muzzle aimed at whatever the crosshair covers.
    fn fire(player: &PlayerController, bullets: &mut BulletManager, walls: &[Aabb]) {
        let weapon = player.weapon_config();
        let muzzle = player.camera_position() + player.rotation() * weapon.muzzle_offset;
        let aim_point = player.cast_crosshair_ray(walls, weapon.crosshair_range);

        let mut direction = normalize_or_zero(aim_point - muzzle);
        if direction == Vec3::zeros() {
            direction = player.view_direction();
        }
        bullets.spawn(muzzle, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ClipPlayer;
    use crate::config::{BulletConfig, PlayerConfig, WeaponConfig};
    use crate::core_types::input::InputSnapshot;
    use approx::assert_abs_diff_eq;

    struct Rig {
        pc: PlayerController,
        bm: BulletManager,
        sm: PlayerActionStateMachine,
        anim: ClipPlayer,
    }

    impl Rig {
        fn new() -> Self {
            Rig {
                pc: PlayerController::new(PlayerConfig::default(), WeaponConfig::default()),
                bm: BulletManager::new(BulletConfig::default()),
                sm: PlayerActionStateMachine::new(ActionTable::default()),
                anim: ClipPlayer::new("04 idle"),
            }
        }

        fn tick(&mut self, dt: f32, input: &InputSnapshot) -> ActionOutcome {
            self.tick_among(dt, input, &[])
        }

        fn tick_among(&mut self, dt: f32, input: &InputSnapshot, walls: &[Aabb]) -> ActionOutcome {
            self.pc.update(dt, input, walls);
            self.sm
                .update(dt, &mut self.pc, &mut self.bm, walls, &mut self.anim)
        }
    }

    fn input(f: impl FnOnce(&mut InputSnapshot)) -> InputSnapshot {
        let mut i = InputSnapshot::idle();
        f(&mut i);
        i
    }

    #[test]
    fn test_idle_when_nothing_pressed() {
        let mut rig = Rig::new();
        rig.tick(0.1, &InputSnapshot::idle());
        assert_eq!(rig.sm.current_state(), PlayerState::Idle);
        assert_eq!(rig.anim.active_clip(), "04 idle");
        assert!(rig.sm.is_action_finished());
    }

    #[test]
    fn test_same_state_does_not_restart_clip() {
        let mut rig = Rig::new();
        let run = input(|i| i.forward = true);
        rig.tick(0.1, &run);
        assert_eq!(rig.sm.current_state(), PlayerState::Run);
        assert_abs_diff_eq!(rig.anim.time(), 0.1);

        rig.tick(0.1, &run);
        assert_eq!(rig.anim.active_clip(), "07 run");
        assert_abs_diff_eq!(rig.anim.time(), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_state_change_restarts_clip() {
        let mut rig = Rig::new();
        rig.tick(0.3, &InputSnapshot::idle());
        rig.tick(0.1, &input(|i| i.forward = true));
        assert_eq!(rig.anim.active_clip(), "07 run");
        assert_abs_diff_eq!(rig.anim.time(), 0.1);
    }

    #[test]
    fn test_fire_beats_run() {
        let mut rig = Rig::new();
        let out = rig.tick(
            0.1,
            &input(|i| {
                i.forward = true;
                i.fire = true;
            }),
        );
        assert_eq!(rig.sm.current_state(), PlayerState::Fire);
        assert_eq!(out.shots_fired, 1);
        assert_eq!(rig.bm.len(), 1);
    }

    #[test]
    fn test_reload_beats_run() {
        let mut rig = Rig::new();
        rig.tick(0.1, &input(|i| i.fire = true));
        // Let the fire lock run out.
        for _ in 0..3 {
            rig.tick(0.1, &InputSnapshot::idle());
        }
        rig.tick(
            0.1,
            &input(|i| {
                i.forward = true;
                i.reload = true;
            }),
        );
        assert_eq!(rig.sm.current_state(), PlayerState::Reload);
        assert!(!rig.sm.is_action_finished());
    }

    #[test]
    fn test_fire_lock_holds_then_releases() {
        let mut rig = Rig::new();
        rig.tick(0.1, &input(|i| i.fire = true));
        let run = input(|i| i.forward = true);

        rig.tick(0.1, &run);
        rig.tick(0.1, &run);
        assert_eq!(rig.sm.current_state(), PlayerState::Fire);

        // Expires here; the state is kept for this frame.
        rig.tick(0.1, &run);
        assert!(rig.sm.is_action_finished());
        assert_eq!(rig.sm.current_state(), PlayerState::Fire);

        rig.tick(0.1, &run);
        assert_eq!(rig.sm.current_state(), PlayerState::Run);
    }

    #[test]
    fn test_locked_playback_holds_before_duration() {
        let mut rig = Rig::new();
        rig.tick(0.2, &input(|i| i.fire = true));
        assert_abs_diff_eq!(rig.anim.time(), 0.2);
        rig.tick(0.01, &InputSnapshot::idle());
        assert_abs_diff_eq!(rig.anim.time(), 0.21, epsilon = 1e-6);
        // Would reach 0.25; holds at 0.24 instead.
        rig.tick(0.1, &InputSnapshot::idle());
        assert_abs_diff_eq!(rig.anim.time(), 0.24, epsilon = 1e-6);
    }

    #[test]
    fn test_reload_completes_when_lock_expires() {
        let mut rig = Rig::new();
        rig.tick(0.1, &input(|i| i.fire = true));
        for _ in 0..3 {
            rig.tick(0.1, &InputSnapshot::idle());
        }
        let out = rig.tick(0.1, &input(|i| i.reload = true));
        assert!(!out.reload_completed);
        assert_eq!(rig.pc.player().ammo().clip, 29);

        let mut completed = 0;
        for _ in 0..4 {
            if rig.tick(0.5, &InputSnapshot::idle()).reload_completed {
                completed += 1;
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(rig.pc.player().ammo().clip, 30);
        assert_eq!(rig.pc.player().ammo().reserve, 89);
        assert!(!rig.pc.player().is_reloading());
        // Final pose held on the release frame.
        assert_abs_diff_eq!(rig.anim.time(), 1.79, epsilon = 1e-5);

        rig.tick(0.1, &InputSnapshot::idle());
        assert_eq!(rig.sm.current_state(), PlayerState::Idle);
    }

    #[test]
    fn test_untimed_reload_completes_immediately() {
        let mut table = ActionTable::default();
        table.specs[PlayerState::Reload.index()].duration = None;
        let mut rig = Rig::new();
        rig.sm = PlayerActionStateMachine::new(table);

        rig.tick(0.3, &input(|i| i.fire = true));
        rig.tick(0.3, &InputSnapshot::idle());
        let out = rig.tick(0.1, &input(|i| i.reload = true));
        assert!(out.reload_completed);
        assert_eq!(rig.pc.player().ammo().clip, 30);
    }

    #[test]
    fn test_every_round_fired_spawns_a_bullet() {
        let mut rig = Rig::new();
        let hold = input(|i| i.fire = true);
        let mut shots = 0;
        for _ in 0..10 {
            shots += rig.tick(0.1, &hold).shots_fired;
        }
        let ammo = rig.pc.player().ammo();
        assert_eq!(shots, 10);
        assert_eq!(ammo.clip_capacity - ammo.clip, 10);
        assert_eq!(rig.bm.len(), 10);
        assert_eq!(rig.sm.current_state(), PlayerState::Fire);
    }

    #[test]
    fn test_bullet_leaves_muzzle_toward_crosshair() {
        let mut rig = Rig::new();
        rig.tick(0.0, &input(|i| i.fire = true));
        let bullet = &rig.bm.bullets()[0];
        // Camera at (0, 1.5, -10) looking down +Z.
        assert_abs_diff_eq!(bullet.position(), Vec3::new(0.25, 1.25, -9.4), epsilon = 1e-5);
        assert!(bullet.direction().z > 0.999);
        assert!(bullet.direction().x < 0.0);
        assert!(bullet.direction().y > 0.0);
    }

    #[test]
    fn test_bullet_aims_at_crosshair_impact_on_wall() {
        let mut rig = Rig::new();
        let wall = Aabb::new(Vec3::new(-100.0, -100.0, 20.0), Vec3::new(100.0, 100.0, 21.0));
        // Turn right and look up in the same frame the trigger is pulled.
        rig.tick_among(
            0.1,
            &input(|i| {
                i.mouse_dx = 250.0;
                i.mouse_dy = -100.0;
                i.fire = true;
            }),
            &[wall],
        );
        assert_eq!(rig.bm.len(), 1);

        let p = rig.pc.player();
        assert_abs_diff_eq!(p.yaw(), 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(p.pitch(), 0.2, epsilon = 1e-5);

        let rot = nalgebra::Rotation3::from_axis_angle(&Vec3::y_axis(), p.yaw())
            * nalgebra::Rotation3::from_axis_angle(&Vec3::x_axis(), -p.pitch());
        let eye = Vec3::new(0.0, 1.5, -10.0);
        let look = rot * Vec3::z();
        let impact = eye + look * ((20.0 - eye.z) / look.z);
        let muzzle = eye + rot * Vec3::new(0.25, -0.25, 0.6);
        let expected = (impact - muzzle).normalize();

        let bullet = &rig.bm.bullets()[0];
        assert_abs_diff_eq!(bullet.position(), muzzle, epsilon = 1e-4);
        assert_abs_diff_eq!(bullet.direction(), expected, epsilon = 1e-4);
        // Converges on the impact point rather than running parallel to the eye ray.
        assert!((bullet.direction() - look).norm() > 1e-3);
    }
}
