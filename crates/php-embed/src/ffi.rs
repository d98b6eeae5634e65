//! Raw bindings to the C shim over libphp's embed SAPI.
//!
//! Mirrors the shim's `embed.h` one to one. All four entry points are
//! process-global and non-reentrant; safe callers go through
//! [`crate::Runtime`], which provides the required serialization. Linking
//! the shim and libphp into the final binary is the embedder's build
//! concern, not this crate's.

use std::os::raw::{c_char, c_int};

extern "C" {
    /// Execute a PHP script file; returns the exit status code. The path is
    /// opened by the engine itself, so a missing file comes back as the
    /// engine's own nonzero status.
    pub fn phpx_execute_script(
        script_path: *const c_char,
        argc: c_int,
        argv: *mut *mut c_char,
    ) -> c_int;

    /// Execute PHP code passed as a string, like `php -r`; returns the exit
    /// status code.
    pub fn phpx_execute_code(code: *const c_char, argc: c_int, argv: *mut *mut c_char) -> c_int;

    /// PHP version string. Engine-owned, valid for the process lifetime;
    /// callers must not free or mutate it.
    pub fn phpx_get_version() -> *const c_char;

    /// PHP version id, e.g. `80300` for 8.3.0.
    pub fn phpx_get_version_id() -> c_int;
}
