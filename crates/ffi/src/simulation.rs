use fps_sim_core::{FrameReport, InputSnapshot, PlayerState};

use crate::error::{DefaultFpsSimError, FpsSimErrorCode};
use crate::helpers::{handle_ffi_result_error, instance_from_ptr, with_sim_mut};
use crate::instance::FpsSimInstance;

/// One frame of player input.
///
/// Mouse deltas are raw pixels since the previous frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "One flag per key mirrors the host's input state"
)]
pub struct FfiInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub reload: bool,
    pub fire: bool,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
}

impl From<FfiInput> for InputSnapshot {
    fn from(input: FfiInput) -> Self {
        InputSnapshot {
            forward: input.forward,
            backward: input.backward,
            left: input.left,
            right: input.right,
            reload: input.reload,
            fire: input.fire,
            mouse_dx: input.mouse_dx,
            mouse_dy: input.mouse_dy,
        }
    }
}

/// Player action, mirrored for C.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiPlayerState {
    Idle = 0,
    Run = 1,
    Fire = 2,
    Reload = 3,
}

impl From<PlayerState> for FfiPlayerState {
    fn from(state: PlayerState) -> Self {
        match state {
            PlayerState::Idle => FfiPlayerState::Idle,
            PlayerState::Run => FfiPlayerState::Run,
            PlayerState::Fire => FfiPlayerState::Fire,
            PlayerState::Reload => FfiPlayerState::Reload,
        }
    }
}

/// Summary of one `fps_sim_step`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiFrameReport {
    pub shots_fired: u32,
    pub enemies_killed: u32,
    pub reload_completed: bool,
    pub state: FfiPlayerState,
}

impl From<&FrameReport> for FfiFrameReport {
    fn from(report: &FrameReport) -> Self {
        FfiFrameReport {
            shots_fired: report.shots_fired,
            enemies_killed: report.enemies_killed.len() as u32,
            reload_completed: report.reload_completed,
            state: report.state.into(),
        }
    }
}

/// Advance the simulation by `dt` seconds with this frame's input.
///
/// Thread-safe: acquires the `RwLock` write lock for the update.
/// A non-finite or negative `dt` is treated as zero.
///
/// Returns
/// - `FpsSimErrorCode::Ok` (0) on success
/// - `FpsSimErrorCode::NullPointer` if `ptr` is null
/// - `FpsSimErrorCode::LockPoisoned` if the internal lock is poisoned
///
/// # Safety
///
/// - `ptr` must be a valid pointer returned by an `fps_sim_new*` function, or null.
/// - `out_report`, if non-null, must be a valid pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn fps_sim_step(
    ptr: *const FpsSimInstance,
    dt: f32,
    input: FfiInput,
    out_report: *mut FfiFrameReport,
) -> FpsSimErrorCode {
    handle_ffi_result_error(|| {
        let instance = unsafe { instance_from_ptr(ptr)? };
        let report = with_sim_mut(instance, |sim| sim.step(dt, &input.into()))?;
        if !out_report.is_null() {
            unsafe {
                *out_report = FfiFrameReport::from(&report);
            }
        }
        Ok::<(), DefaultFpsSimError>(())
    })
}
