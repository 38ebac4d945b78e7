use fps_sim_core::{GameSimulation, LevelDescription, SimulationConfig};
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Mutex, RwLock};
use tracing::warn;

use crate::error::{DefaultFpsSimError, FpsSimErrorCode};
use crate::helpers::{clear_last_error, str_from_ptr, track_error, track_result};
use crate::queries::{FfiBullet, FfiEnemy};

/// The main simulation context handed to the host engine.
///
/// # Thread Safety
/// The simulation is protected by an `RwLock`: queries take a read lock,
/// `fps_sim_step` takes the write lock once per frame. Enemy and bullet
/// snapshots are cached behind their own `Mutex` so query calls reuse one
/// allocation across frames.
pub struct FpsSimInstance {
    pub(crate) sim: RwLock<GameSimulation>,
    /// Reused across calls to `fps_sim_get_enemies`.
    pub(crate) enemy_snapshot: Mutex<Vec<FfiEnemy>>,
    /// Reused across calls to `fps_sim_get_bullets`.
    pub(crate) bullet_snapshot: Mutex<Vec<FfiBullet>>,
    /// Backing storage for the clip name handed out by `fps_sim_get_weapon_anim`.
    pub(crate) weapon_clip: Mutex<CString>,
}

impl FpsSimInstance {
    pub(crate) fn new(config: &SimulationConfig, level: &LevelDescription) -> Box<Self> {
        let sim = GameSimulation::from_level(config, level);
        let enemies = sim.enemies().len();
        Box::new(Self {
            sim: RwLock::new(sim),
            enemy_snapshot: Mutex::new(Vec::with_capacity(enemies)),
            bullet_snapshot: Mutex::new(Vec::with_capacity(64)),
            weapon_clip: Mutex::new(CString::default()),
        })
    }

    fn with_defaults(level: &LevelDescription) -> Box<Self> {
        Self::new(&SimulationConfig::default(), level)
    }
}

/// Write `result` to `out_instance`, null on error.
///
/// # Safety
///
/// `out_instance` must be non-null and writable.
unsafe fn emit_instance(
    result: Result<Box<FpsSimInstance>, DefaultFpsSimError>,
    out_instance: *mut *mut FpsSimInstance,
) -> FpsSimErrorCode {
    match track_result(result) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            clear_last_error();
            FpsSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                // Set to null on error (per documentation contract)
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Create a simulation with an empty level (arena walls only).
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) — success, `out_instance` contains valid pointer
/// - `FpsSimErrorCode::NullPointer` — `out_instance` is null
///
/// # Safety
///
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller takes ownership of the returned instance and MUST call `fps_sim_destroy`
///   exactly once to avoid memory leaks.
#[no_mangle]
pub unsafe extern "C" fn fps_sim_new(out_instance: *mut *mut FpsSimInstance) -> FpsSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_instance"));
    }
    unsafe { emit_instance(Ok(FpsSimInstance::with_defaults(&LevelDescription::default())), out_instance) }
}

/// Create a simulation from level text already in memory.
///
/// Malformed rows never fail; they load with zeroed fields.
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) on success
/// - `FpsSimErrorCode::NullPointer` if `text` or `out_instance` is null
/// - `FpsSimErrorCode::InvalidParameter` if `text` is not UTF-8
///
/// # Safety
///
/// - `text` must be a null-terminated string valid for the duration of the call.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller MUST call `fps_sim_destroy` exactly once on success.
#[no_mangle]
pub unsafe extern "C" fn fps_sim_new_from_level_text(
    text: *const c_char,
    out_instance: *mut *mut FpsSimInstance,
) -> FpsSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_instance"));
    }
    let result = unsafe { str_from_ptr(text, "text") }
        .map(|text| FpsSimInstance::with_defaults(&LevelDescription::parse(text)));
    unsafe { emit_instance(result, out_instance) }
}

/// Create a simulation from a level file on disk.
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) on success
/// - `FpsSimErrorCode::NullPointer` if `path` or `out_instance` is null
/// - `FpsSimErrorCode::InvalidParameter` if `path` is not UTF-8
/// - `FpsSimErrorCode::LevelLoadFailed` if the file cannot be read
///
/// Call `fps_sim_get_last_error()` for the reason.
///
/// # Safety
///
/// - `path` must be a null-terminated string valid for the duration of the call.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller MUST call `fps_sim_destroy` exactly once on success.
///
/// Example (C++)
/// ```cpp
/// FpsSimInstance* sim = nullptr;
/// if (fps_sim_new_from_level_file("LevelData.txt", &sim) != FpsSimErrorCode::Ok) {
///     fprintf(stderr, "Failed to load level: %s\n", fps_sim_get_last_error());
///     return;
/// }
/// // ... use sim ...
/// fps_sim_destroy(sim);
/// ```
#[no_mangle]
pub unsafe extern "C" fn fps_sim_new_from_level_file(
    path: *const c_char,
    out_instance: *mut *mut FpsSimInstance,
) -> FpsSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_instance"));
    }
    let result = unsafe { str_from_ptr(path, "path") }.and_then(|path| {
        LevelDescription::load(path)
            .map(|level| FpsSimInstance::with_defaults(&level))
            .map_err(|e| {
                warn!("Level load failed: {}", e);
                DefaultFpsSimError::level_load_failed(&e)
            })
    });
    unsafe { emit_instance(result, out_instance) }
}

/// Create a simulation from a JSON config and optional level text.
///
/// `config_json` may be null for the default tuning; fields it leaves out
/// keep their defaults. Set `"seed"` to make enemy animation phases
/// reproducible. `level_text` may be null for an empty arena.
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) on success
/// - `FpsSimErrorCode::NullPointer` if `out_instance` is null
/// - `FpsSimErrorCode::InvalidParameter` if a string is not UTF-8 or the config is not valid JSON
///
/// # Safety
///
/// - `config_json` and `level_text`, if non-null, must be null-terminated strings valid for
///   the duration of the call.
/// - `out_instance` must be a valid, non-null pointer to writable memory.
/// - The caller MUST call `fps_sim_destroy` exactly once on success.
///
/// Example (C++)
/// ```cpp
/// FpsSimInstance* sim = nullptr;
/// fps_sim_new_with_config("{\"seed\": 7, \"bullets\": {\"speed\": 150.0}}", level, &sim);
/// ```
#[no_mangle]
pub unsafe extern "C" fn fps_sim_new_with_config(
    config_json: *const c_char,
    level_text: *const c_char,
    out_instance: *mut *mut FpsSimInstance,
) -> FpsSimErrorCode {
    if out_instance.is_null() {
        return track_error(&DefaultFpsSimError::null_pointer("out_instance"));
    }

    let config = if config_json.is_null() {
        Ok(SimulationConfig::default())
    } else {
        unsafe { str_from_ptr(config_json, "config_json") }.and_then(|json| {
            serde_json::from_str::<SimulationConfig>(json).map_err(|e| {
                DefaultFpsSimError::invalid_parameter(format!("Invalid config JSON: {e}"))
            })
        })
    };
    let level = if level_text.is_null() {
        Ok(LevelDescription::default())
    } else {
        unsafe { str_from_ptr(level_text, "level_text") }.map(LevelDescription::parse)
    };

    let result = config.and_then(|config| level.map(|level| FpsSimInstance::new(&config, &level)));
    unsafe { emit_instance(result, out_instance) }
}

/// Destroys an instance previously created by one of the `fps_sim_new*` functions.
///
/// If `ptr` is null, this function is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by an `fps_sim_new*` function.
/// - The pointer MUST NOT have been freed already.
/// - After calling this function, the caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn fps_sim_destroy(ptr: *mut FpsSimInstance) {
    if ptr.is_null() {
        return;
    }

    // SAFETY: non-null pointers come from `Box::into_raw` in `emit_instance`
    // and have not been freed (caller contract).
    unsafe {
        drop(Box::from_raw(ptr));
    }
}
