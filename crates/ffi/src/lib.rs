//! C ABI for the FPS simulation core.
//!
//! The host engine owns the window, renderer and input polling. Per frame it
//! calls `fps_sim_step` with an `FfiInput`, then pulls the view matrix, HUD,
//! enemy and bullet snapshots for drawing. Every fallible call returns an
//! `FpsSimErrorCode` and leaves a message for `fps_sim_get_last_error`.

// ============================================================================
// ERROR REPORTING
// ============================================================================
mod error;
mod helpers;

// ============================================================================
// INSTANCE LIFECYCLE, FRAME STEP, QUERIES
// ============================================================================
mod instance;
mod queries;
mod simulation;

pub use error::{fps_sim_get_last_error, fps_sim_get_last_error_code, FpsSimErrorCode};
pub use instance::{
    fps_sim_destroy, fps_sim_new, fps_sim_new_from_level_file, fps_sim_new_from_level_text,
    fps_sim_new_with_config, FpsSimInstance,
};
pub use queries::{
    fps_sim_get_bullets, fps_sim_get_enemies, fps_sim_get_hud, fps_sim_get_stats,
    fps_sim_get_view_matrix, fps_sim_get_weapon_anim, fps_sim_get_weapon_anim_time, FfiBullet,
    FfiEnemy, FfiHud, FfiStats, FfiWeaponAnim,
};
pub use simulation::{fps_sim_step, FfiFrameReport, FfiInput, FfiPlayerState};

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};
    use std::ptr;

    const LEVEL: &str = "ENEMY soldier.gem 0 0 5 0 0 0 1 1 1\n";

    fn new_from_text(text: &str) -> *mut FpsSimInstance {
        let text = CString::new(text).unwrap();
        let mut sim = ptr::null_mut();
        let code = unsafe { fps_sim_new_from_level_text(text.as_ptr(), &mut sim) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert!(!sim.is_null());
        sim
    }

    fn hud(sim: *const FpsSimInstance) -> FfiHud {
        let mut hud = std::mem::MaybeUninit::<FfiHud>::uninit();
        let code = unsafe { fps_sim_get_hud(sim, hud.as_mut_ptr()) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        unsafe { hud.assume_init() }
    }

    #[test]
    fn test_null_out_instance_is_reported() {
        let code = unsafe { fps_sim_new(ptr::null_mut()) };
        assert_eq!(code, FpsSimErrorCode::NullPointer);
        assert_eq!(fps_sim_get_last_error_code(), FpsSimErrorCode::NullPointer);
        let msg = unsafe { CStr::from_ptr(fps_sim_get_last_error()) };
        assert!(msg.to_str().unwrap().contains("out_instance"));
    }

    #[test]
    fn test_missing_level_file() {
        let path = CString::new("/no/such/level.txt").unwrap();
        let mut sim = ptr::null_mut();
        let code = unsafe { fps_sim_new_from_level_file(path.as_ptr(), &mut sim) };
        assert_eq!(code, FpsSimErrorCode::LevelLoadFailed);
        assert!(sim.is_null());
        assert!(!fps_sim_get_last_error().is_null());
    }

    #[test]
    fn test_step_and_shoot_enemy() {
        let sim = new_from_text(LEVEL);
        assert_eq!(hud(sim).enemies_alive, 1);

        let fire = FfiInput {
            fire: true,
            ..FfiInput::default()
        };
        let mut report = FfiFrameReport {
            shots_fired: 0,
            enemies_killed: 0,
            reload_completed: false,
            state: FfiPlayerState::Idle,
        };
        let code = unsafe { fps_sim_step(sim, 0.1, fire, &mut report) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert_eq!(report.shots_fired, 1);
        assert_eq!(report.state, FfiPlayerState::Fire);

        let mut len = 0;
        let mut bullets = ptr::null();
        let code = unsafe { fps_sim_get_bullets(sim, &mut len, &mut bullets) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert_eq!(len, 1);

        unsafe { fps_sim_step(sim, 0.1, FfiInput::default(), ptr::null_mut()) };

        let hud = hud(sim);
        assert_eq!(hud.enemies_alive, 0);
        assert_eq!(hud.clip, 29);

        let mut len = 0;
        let mut enemies = ptr::null();
        let code = unsafe { fps_sim_get_enemies(sim, &mut len, &mut enemies) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert_eq!(len, 1);
        assert!(unsafe { (*enemies).is_dead });

        unsafe { fps_sim_destroy(sim) };
    }

    #[test]
    fn test_view_matrix_maps_eye_to_origin() {
        let sim = new_from_text("");
        let mut m = [0.0_f32; 16];
        let mut eye = [0.0_f32; 3];
        let code = unsafe { fps_sim_get_view_matrix(sim, m.as_mut_ptr(), eye.as_mut_ptr()) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert_eq!(eye, [0.0, 1.5, -10.0]);

        // Column-major: translation lives in elements 12..15.
        let x = m[0] * eye[0] + m[4] * eye[1] + m[8] * eye[2] + m[12];
        let y = m[1] * eye[0] + m[5] * eye[1] + m[9] * eye[2] + m[13];
        let z = m[2] * eye[0] + m[6] * eye[1] + m[10] * eye[2] + m[14];
        assert!(x.abs() < 1e-5 && y.abs() < 1e-5 && z.abs() < 1e-5);

        unsafe { fps_sim_destroy(sim) };
    }

    #[test]
    fn test_null_instance_queries_fail_cleanly() {
        let mut len = 7;
        let mut enemies = ptr::null();
        let code = unsafe { fps_sim_get_enemies(ptr::null(), &mut len, &mut enemies) };
        assert_eq!(code, FpsSimErrorCode::NullPointer);
        assert_eq!(len, 0);
        assert!(enemies.is_null());

        let code = unsafe { fps_sim_step(ptr::null(), 0.1, FfiInput::default(), ptr::null_mut()) };
        assert_eq!(code, FpsSimErrorCode::NullPointer);
        unsafe { fps_sim_destroy(ptr::null_mut()) };
    }

    #[test]
    fn test_success_clears_last_error() {
        let _ = unsafe { fps_sim_new(ptr::null_mut()) };
        assert_eq!(fps_sim_get_last_error_code(), FpsSimErrorCode::NullPointer);

        let mut sim = ptr::null_mut();
        let code = unsafe { fps_sim_new(&mut sim) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert_eq!(fps_sim_get_last_error_code(), FpsSimErrorCode::Ok);
        assert!(fps_sim_get_last_error().is_null());
        unsafe { fps_sim_destroy(sim) };
    }
    #[test]
    fn test_weapon_anim_reports_clip_and_normalized_time() {
        let sim = new_from_text("");
        let mut anim = std::mem::MaybeUninit::<FfiWeaponAnim>::uninit();
        let code = unsafe { fps_sim_get_weapon_anim(sim, anim.as_mut_ptr()) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        let anim = unsafe { anim.assume_init() };
        let clip = unsafe { CStr::from_ptr(anim.clip) };
        assert_eq!(clip.to_str().unwrap(), "04 idle");
        assert!(anim.normalized_time < 0.0);

        let fire = FfiInput {
            fire: true,
            ..FfiInput::default()
        };
        unsafe { fps_sim_step(sim, 0.1, fire, ptr::null_mut()) };

        let mut anim = std::mem::MaybeUninit::<FfiWeaponAnim>::uninit();
        let code = unsafe { fps_sim_get_weapon_anim(sim, anim.as_mut_ptr()) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        let anim = unsafe { anim.assume_init() };
        let clip = unsafe { CStr::from_ptr(anim.clip) };
        assert_eq!(clip.to_str().unwrap(), "08 fire");
        assert!(anim.normalized_time >= 0.0 && anim.normalized_time < 1.0);

        let code = unsafe { fps_sim_get_weapon_anim(sim, ptr::null_mut()) };
        assert_eq!(code, FpsSimErrorCode::NullPointer);

        unsafe { fps_sim_destroy(sim) };
    }

    #[test]
    fn test_new_with_config_applies_json() {
        let config = CString::new(r#"{"seed": 7, "weapon": {"clip_capacity": 12}}"#).unwrap();
        let level = CString::new(LEVEL).unwrap();
        let mut sim = ptr::null_mut();
        let code = unsafe { fps_sim_new_with_config(config.as_ptr(), level.as_ptr(), &mut sim) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert!(!sim.is_null());

        let first_hud = hud(sim);
        assert_eq!(first_hud.enemies_total, 1);
        assert_eq!(first_hud.clip_capacity, 12);
        unsafe { fps_sim_destroy(sim) };

        let mut sim = ptr::null_mut();
        let code = unsafe { fps_sim_new_with_config(ptr::null(), ptr::null(), &mut sim) };
        assert_eq!(code, FpsSimErrorCode::Ok);
        assert_eq!(hud(sim).enemies_total, 0);
        unsafe { fps_sim_destroy(sim) };
    }

    #[test]
    fn test_new_with_config_rejects_bad_json() {
        let config = CString::new("{ seed: ").unwrap();
        let mut sim = ptr::null_mut();
        let code = unsafe { fps_sim_new_with_config(config.as_ptr(), ptr::null(), &mut sim) };
        assert_eq!(code, FpsSimErrorCode::InvalidParameter);
        assert!(sim.is_null());
        let msg = unsafe { CStr::from_ptr(fps_sim_get_last_error()) };
        assert!(msg.to_str().unwrap().contains("config"));
    }
}
