//! String and argument-vector marshaling across the C call boundary.
//!
//! The engine consumes byte-oriented, NUL-terminated strings; nothing here
//! assumes any higher-level text encoding. Values crossing the boundary fall
//! into two ownership classes: buffers built by this module are owned on the
//! Rust side and only borrowed by the engine for the duration of one call;
//! strings handed back by the engine (the version text) are engine-owned for
//! the whole process lifetime and are never freed here.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

use crate::error::EncodingError;

/// A byte string validated for the engine's C string contract.
///
/// Construction rejects embedded NUL with [`EncodingError`] instead of
/// truncating at the first terminator.
#[derive(Debug)]
pub struct EngineText(CString);

impl EngineText {
    /// Validate `text` for crossing the boundary. `what` names the input in
    /// the error ("script path", "inline code", ...).
    pub fn new(what: &'static str, text: impl Into<Vec<u8>>) -> Result<Self, EncodingError> {
        match CString::new(text.into()) {
            Ok(c) => Ok(Self(c)),
            Err(e) => Err(EncodingError {
                what,
                offset: e.nul_position(),
            }),
        }
    }

    /// Borrow as a C string for one engine call.
    pub fn as_c(&self) -> &CStr {
        &self.0
    }

    /// Raw pointer for one engine call. Valid while `self` is alive; the
    /// engine must not retain or free it.
    pub fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr()
    }
}

/// An `argc`/`argv` pair in conventional process-argument shape.
///
/// Element 0 is the script or program name as the interpreted code will see
/// it; the rest are positional arguments in caller order. The pointer array
/// carries a trailing NULL, matching C `main` conventions. Storage is owned
/// by this value, so the raw pointers stay valid exactly as long as it
/// lives; the engine borrows them for one call and must not retain or free
/// them.
#[derive(Debug)]
pub struct ArgVec {
    owned: Vec<CString>,
    ptrs: Vec<*mut c_char>,
}

impl ArgVec {
    /// Build the vector from `argv0` plus the caller's positional arguments,
    /// validating every element for embedded NUL.
    pub fn new(argv0: impl Into<Vec<u8>>, args: &[String]) -> Result<Self, EncodingError> {
        let mut owned = Vec::with_capacity(args.len() + 1);
        owned.push(to_cstring("argv[0]", argv0.into())?);
        for arg in args {
            owned.push(to_cstring("argument", arg.clone().into_bytes())?);
        }

        let mut ptrs: Vec<*mut c_char> = owned
            .iter()
            .map(|s| s.as_ptr() as *mut c_char)
            .collect();
        ptrs.push(std::ptr::null_mut());

        Ok(Self { owned, ptrs })
    }

    /// Argument count, excluding the NULL terminator.
    pub fn argc(&self) -> c_int {
        self.owned.len() as c_int
    }

    /// Pointer to the argument array. Valid while `self` is alive; the
    /// engine gets it for one call only.
    pub fn as_argv(&self) -> *mut *mut c_char {
        self.ptrs.as_ptr() as *mut *mut c_char
    }

    /// The marshaled elements as Rust strings, for recording doubles and
    /// diagnostics.
    pub fn to_strings(&self) -> Vec<String> {
        self.owned
            .iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }
}

fn to_cstring(what: &'static str, bytes: Vec<u8>) -> Result<CString, EncodingError> {
    CString::new(bytes).map_err(|e| EncodingError {
        what,
        offset: e.nul_position(),
    })
}
