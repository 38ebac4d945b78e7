use fps_sim_core::simulation::{BulletView, EnemyView};
use fps_sim_core::{GameSimulation, HudState, SimulationStats, Vec3};
use nalgebra::Matrix4;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::error::{DefaultFpsSimError, FpsSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, track_error, with_sim};
use crate::instance::FpsSimInstance;
use crate::simulation::FfiPlayerState;

fn vec_to_array(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Column-major, matching nalgebra's storage order.
fn matrix_to_array(m: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(m.as_slice());
    out
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// HUD values for the current frame. Keep this layout stable for C consumers.
pub struct FfiHud {
    pub clip: u32,
    pub clip_capacity: u32,
    pub reserve: u32,
    pub health: f32,
    pub is_reloading: bool,
    pub is_dead: bool,
    pub enemies_alive: u32,
    pub enemies_total: u32,
    pub state: FfiPlayerState,
}

impl From<HudState> for FfiHud {
    fn from(hud: HudState) -> Self {
        FfiHud {
            clip: hud.clip,
            clip_capacity: hud.clip_capacity,
            reserve: hud.reserve,
            health: hud.health,
            is_reloading: hud.is_reloading,
            is_dead: hud.is_dead,
            enemies_alive: hud.enemies_alive as u32,
            enemies_total: hud.enemies_total as u32,
            state: hud.state.into(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// Render data for one enemy. All enemies are listed, dead ones flagged.
pub struct FfiEnemy {
    /// World transform, column-major
    pub transform: [f32; 16],
    /// Idle clip playback time in seconds
    pub anim_time: f32,
    /// `anim_time / clip length`, or -1 when the clip length is unknown
    pub anim_normalized_time: f32,
    pub collider_min: [f32; 3],
    pub collider_max: [f32; 3],
    pub is_dead: bool,
}

impl From<&EnemyView> for FfiEnemy {
    fn from(view: &EnemyView) -> Self {
        FfiEnemy {
            transform: matrix_to_array(&view.transform),
            anim_time: view.animation.time,
            anim_normalized_time: view.animation.normalized_time.unwrap_or(-1.0),
            collider_min: vec_to_array(view.collider.min),
            collider_max: vec_to_array(view.collider.max),
            is_dead: view.is_dead,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// Render data for one live bullet.
pub struct FfiBullet {
    pub position: [f32; 3],
    pub collider_min: [f32; 3],
    pub collider_max: [f32; 3],
}

impl From<&BulletView> for FfiBullet {
    fn from(view: &BulletView) -> Self {
        FfiBullet {
            position: vec_to_array(view.position),
            collider_min: vec_to_array(view.collider.min),
            collider_max: vec_to_array(view.collider.max),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// Weapon rig playback. `clip` is borrowed from the instance.
pub struct FfiWeaponAnim {
    /// Null-terminated clip name, valid until the next `fps_sim_get_weapon_anim` call
    pub clip: *const c_char,
    pub time: f32,
    /// `time / clip length`, or -1 for looping clips with no known length
    pub normalized_time: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
/// Running totals since creation.
pub struct FfiStats {
    pub frames: u64,
    pub simulation_time: f32,
    pub shots_fired: u64,
    pub kills: u64,
    pub bullets_live: u32,
}

impl From<SimulationStats> for FfiStats {
    fn from(stats: SimulationStats) -> Self {
        FfiStats {
            frames: stats.frames,
            simulation_time: stats.simulation_time,
            shots_fired: stats.shots_fired,
            kills: stats.kills,
            bullets_live: stats.bullets_live as u32,
        }
    }
}

#[no_mangle]
/// Fill `out_hud` with the current HUD values.
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) on success
/// - `FpsSimErrorCode::NullPointer` if `ptr` or `out_hud` is null
/// - `FpsSimErrorCode::LockPoisoned` if the internal lock is poisoned
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_hud` must be a valid, non-null pointer to writable memory.
pub unsafe extern "C" fn fps_sim_get_hud(
    ptr: *const FpsSimInstance,
    out_hud: *mut FfiHud,
) -> FpsSimErrorCode {
    if out_hud.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_hud"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let hud = with_sim(instance, GameSimulation::hud)?;
        unsafe {
            *out_hud = hud.into();
        }
        Ok::<(), DefaultFpsSimError>(())
    })
}

#[no_mangle]
/// Fill `out_stats` with running totals.
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_stats` must be a valid, non-null pointer to writable memory.
pub unsafe extern "C" fn fps_sim_get_stats(
    ptr: *const FpsSimInstance,
    out_stats: *mut FfiStats,
) -> FpsSimErrorCode {
    if out_stats.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_stats"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let stats = with_sim(instance, GameSimulation::stats)?;
        unsafe {
            *out_stats = stats.into();
        }
        Ok::<(), DefaultFpsSimError>(())
    })
}

#[no_mangle]
/// Write the camera view matrix (left-handed, Y up) as 16 column-major floats.
/// Also writes the camera position to `out_camera_position` when it is non-null.
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_matrix` must point to at least 16 writable `float`s.
/// - `out_camera_position`, if non-null, must point to at least 3 writable `float`s.
pub unsafe extern "C" fn fps_sim_get_view_matrix(
    ptr: *const FpsSimInstance,
    out_matrix: *mut f32,
    out_camera_position: *mut f32,
) -> FpsSimErrorCode {
    if out_matrix.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_matrix"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let (view, eye) = with_sim(instance, |sim| {
            let controller = sim.controller();
            (controller.view_transform(), controller.camera_position())
        })?;
        unsafe {
            ptr::copy_nonoverlapping(matrix_to_array(&view).as_ptr(), out_matrix, 16);
            if !out_camera_position.is_null() {
                ptr::copy_nonoverlapping(vec_to_array(eye).as_ptr(), out_camera_position, 3);
            }
        }
        Ok::<(), DefaultFpsSimError>(())
    })
}

#[no_mangle]
/// Weapon clip playback time for the first-person rig, written to `out_time`.
///
/// The active clip follows the player state returned in the HUD.
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_time` must be a valid, non-null pointer to writable memory.
pub unsafe extern "C" fn fps_sim_get_weapon_anim_time(
    ptr: *const FpsSimInstance,
    out_time: *mut f32,
) -> FpsSimErrorCode {
    if out_time.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_time"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let time = with_sim(instance, |sim| sim.weapon_animation().time())?;
        unsafe {
            *out_time = time;
        }
        Ok::<(), DefaultFpsSimError>(())
    })
}

#[no_mangle]
/// Fill `out_anim` with the weapon clip name, playback time and normalized time.
///
/// Timed clips (fire, reload) report a normalized time in `[0, 1)`. Looping
/// clips report -1. **DO NOT FREE** `out_anim->clip`.
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) on success
/// - `FpsSimErrorCode::NullPointer` if `ptr` or `out_anim` is null
/// - `FpsSimErrorCode::InvalidParameter` if the clip name contains a NUL byte
/// - `FpsSimErrorCode::LockPoisoned` if an internal lock is poisoned
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_anim` must be a valid, non-null pointer to writable memory.
pub unsafe extern "C" fn fps_sim_get_weapon_anim(
    ptr: *const FpsSimInstance,
    out_anim: *mut FfiWeaponAnim,
) -> FpsSimErrorCode {
    if out_anim.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_anim"));
    }

    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let view = with_sim(instance, GameSimulation::weapon_view)?;
        let name = CString::new(view.clip).map_err(|e| {
            DefaultFpsSimError::invalid_parameter(format!("Clip name is not C-compatible: {e}"))
        })?;
        let mut clip = instance
            .weapon_clip
            .lock()
            .map_err(|_| DefaultFpsSimError::lock_poisoned("weapon_clip"))?;
        *clip = name;

        unsafe {
            *out_anim = FfiWeaponAnim {
                clip: clip.as_ptr(),
                time: view.time,
                normalized_time: view.normalized_time.unwrap_or(-1.0),
            };
        }
        Ok::<(), DefaultFpsSimError>(())
    })
}

#[no_mangle]
/// Return a borrowed pointer to a cached snapshot of every enemy.
///
/// - Returns the array via `out_array` and its length via `out_len`. **DO NOT FREE THIS POINTER**.
/// - The pointer is invalidated by the next call to this function.
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) on success
/// - `FpsSimErrorCode::NullPointer` if `ptr`, `out_len`, or `out_array` is null
/// - `FpsSimErrorCode::LockPoisoned` if an internal lock is poisoned
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_len` and `out_array` must be valid, non-null pointers to writable memory.
///
/// # Example Usage (C++)
/// ```cpp
/// uintptr_t len = 0;
/// const FfiEnemy* enemies = nullptr;
/// if (fps_sim_get_enemies(sim, &len, &enemies) == FpsSimErrorCode::Ok) {
///     for (uintptr_t i = 0; i < len; i++) {
///         if (!enemies[i].is_dead) draw_enemy(enemies[i].transform);
///     }
/// }
/// ```
pub unsafe extern "C" fn fps_sim_get_enemies(
    ptr: *const FpsSimInstance,
    out_len: *mut usize,
    out_array: *mut *const FfiEnemy,
) -> FpsSimErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultFpsSimError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let mut snapshot = instance
            .enemy_snapshot
            .lock()
            .map_err(|_| DefaultFpsSimError::lock_poisoned("enemy_snapshot"))?;
        snapshot.clear();

        with_sim(instance, |sim| {
            snapshot.extend(
                sim.enemies()
                    .enemies()
                    .iter()
                    .map(|e| FfiEnemy::from(&EnemyView::from(e))),
            );
        })?;

        unsafe {
            *out_len = snapshot.len();
            *out_array = snapshot.as_ptr();
        }
        Ok::<(), DefaultFpsSimError>(())
    });

    if result != FpsSimErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }
    result
}

#[no_mangle]
/// Return a borrowed pointer to a cached snapshot of every live bullet.
///
/// Same contract as `fps_sim_get_enemies`. **DO NOT FREE THIS POINTER**.
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_len` and `out_array` must be valid, non-null pointers to writable memory.
pub unsafe extern "C" fn fps_sim_get_bullets(
    ptr: *const FpsSimInstance,
    out_len: *mut usize,
    out_array: *mut *const FfiBullet,
) -> FpsSimErrorCode {
    if out_len.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_len"));
    }
    if out_array.is_null() {
        unsafe {
            *out_len = 0;
        }
        return track_error(&DefaultFpsSimError::null_pointer("out_array"));
    }

    let result = handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let mut snapshot = instance
            .bullet_snapshot
            .lock()
            .map_err(|_| DefaultFpsSimError::lock_poisoned("bullet_snapshot"))?;
        snapshot.clear();

        with_sim(instance, |sim| {
            snapshot.extend(
                sim.bullets()
                    .bullets()
                    .iter()
                    .map(|b| FfiBullet::from(&BulletView::from(b))),
            );
        })?;

        unsafe {
            *out_len = snapshot.len();
            *out_array = snapshot.as_ptr();
        }
        Ok::<(), DefaultFpsSimError>(())
    });

    if result != FpsSimErrorCode::Ok {
        unsafe {
            *out_array = ptr::null();
            *out_len = 0;
        }
    }
    result
}
