use crate::error::{with_last_error_mut, DefaultFpsSimError, FpsSimError, FpsSimErrorCode};
use crate::instance::FpsSimInstance;
use fps_sim_core::GameSimulation;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl FpsSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record `error` and return its code.
#[inline]
pub(crate) fn track_error(error: &impl FpsSimError) -> FpsSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, passing successes through.
pub(crate) fn track_result<T>(result: Result<T, DefaultFpsSimError>) -> Result<T, FpsSimErrorCode> {
    result.map_err(|error| track_error(&error))
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = FpsSimErrorCode::Ok;
    });
}

/// Run `f`, recording its error or clearing the last error on success.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> FpsSimErrorCode
where
    F: FnOnce() -> Result<(), DefaultFpsSimError>,
{
    match f() {
        Ok(()) => {
            clear_last_error();
            FpsSimErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Borrow an instance from a raw pointer.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by one of the `fps_sim_new*` functions.
pub(crate) unsafe fn instance_from_ptr<'a>(
    ptr: *const FpsSimInstance,
) -> Result<&'a FpsSimInstance, DefaultFpsSimError> {
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultFpsSimError::null_pointer("ptr"))
}

/// Run `f` under the simulation's read lock.
pub(crate) fn with_sim<F, R>(instance: &FpsSimInstance, f: F) -> Result<R, DefaultFpsSimError>
where
    F: FnOnce(&GameSimulation) -> R,
{
    let sim = instance
        .sim
        .read()
        .map_err(|_| DefaultFpsSimError::lock_poisoned("RwLock"))?;
    Ok(f(&sim))
}

/// Run `f` under the simulation's write lock.
pub(crate) fn with_sim_mut<F, R>(instance: &FpsSimInstance, f: F) -> Result<R, DefaultFpsSimError>
where
    F: FnOnce(&mut GameSimulation) -> R,
{
    let mut sim = instance
        .sim
        .write()
        .map_err(|_| DefaultFpsSimError::lock_poisoned("RwLock"))?;
    Ok(f(&mut sim))
}

/// Borrow a C string as UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a null-terminated string that outlives the call.
pub(crate) unsafe fn str_from_ptr<'a>(
    ptr: *const c_char,
    param_name: &str,
) -> Result<&'a str, DefaultFpsSimError> {
    if ptr.is_null() {
        return Err(DefaultFpsSimError::null_pointer(param_name));
    }
    let cstr = unsafe { CStr::from_ptr(ptr) };
    cstr.to_str().map_err(|e| {
        DefaultFpsSimError::invalid_parameter(format!("Parameter '{param_name}' is not UTF-8: {e}"))
    })
}
