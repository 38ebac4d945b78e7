use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait FpsSimError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> FpsSimErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `FpsSimError` for common FFI error scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultFpsSimError {
    code: FpsSimErrorCode,
    msg: String,
}

impl DefaultFpsSimError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: FpsSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"RwLock"`, `"Mutex"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: FpsSimErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for invalid parameter.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: FpsSimErrorCode::InvalidParameter,
            msg: message,
        }
    }

    /// Create error for a level file that could not be read.
    pub fn level_load_failed(error: &fps_sim_core::LevelError) -> Self {
        Self {
            code: FpsSimErrorCode::LevelLoadFailed,
            msg: error.to_string(),
        }
    }
}

impl FpsSimError for DefaultFpsSimError {
    fn code(&self) -> FpsSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by simulation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Invalid parameter passed to function (e.g. a string that is not UTF-8).
    InvalidParameter = 3,

    /// The level file could not be read.
    LevelLoadFailed = 4,
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The CString is stored here so the pointer handed out stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, FpsSimErrorCode)> = const { RefCell::new((None, FpsSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, FpsSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, FpsSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call on this thread succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that
/// sets or clears the error. **DO NOT FREE THIS POINTER**.
///
/// Example:
/// ```cpp
/// FpsSimInstance* sim = nullptr;
/// FpsSimErrorCode err = fps_sim_new_from_level_file("LevelData.txt", &sim);
/// if (err != FpsSimErrorCode::Ok) {
///     const char* error = fps_sim_get_last_error();
///     if (error) {
///         printf("Level load failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn fps_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code (`Ok` if the last call succeeded).
///
/// Error codes are stored per-thread, so each thread has its own error state.
#[no_mangle]
pub extern "C" fn fps_sim_get_last_error_code() -> FpsSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
