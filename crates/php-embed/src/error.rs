//! Error types and sentinel statuses for the embed boundary.
//!
//! Boundary failures are distinct from anything the interpreted code does:
//! script-level failures (missing file, parse error, uncaught exception)
//! travel through the engine's own exit status untouched, while the errors
//! here cover the boundary itself and map to negative sentinel statuses
//! outside the engine's 0–255 exit-code range.

use thiserror::Error;

/// Sentinel status returned when the engine could not be brought up for an
/// invocation (includes attempts after the runtime terminated).
pub const STATUS_INIT_FAILURE: i32 = -1;

/// Sentinel status returned when input text violated the engine's string
/// contract and never reached the engine.
pub const STATUS_ENCODING_FAILURE: i32 = -2;

/// Failure to bring the engine up.
///
/// Fatal to the process as far as embedding goes: startup failures are
/// linkage or configuration problems, and a terminated runtime stays
/// terminated, so no retry is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// The engine refused to start.
    #[error("engine startup failed: {0}")]
    Startup(String),

    /// Another live engine instance already exists in this process.
    #[error("an engine instance is already live in this process")]
    AlreadyRunning,

    /// The engine was shut down earlier in this process; the embed SAPI
    /// cannot be re-initialized once torn down.
    #[error("engine already terminated in this process")]
    AlreadyTerminated,
}

/// Failure to tear the engine down cleanly. Reported, never retried; the
/// runtime still latches into its terminated state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShutdownError {
    /// The engine reported an unclean teardown.
    #[error("engine teardown failed: {0}")]
    Teardown(String),
}

/// Input text cannot cross the boundary as a C string.
///
/// The engine consumes NUL-terminated byte strings, so an embedded NUL in a
/// script path, code body, or argument would silently truncate; the
/// marshaling layer rejects it up front instead. Fails the single call only
/// and leaves the lifecycle untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("embedded NUL byte at offset {offset} in {what}")]
pub struct EncodingError {
    pub(crate) what: &'static str,
    pub(crate) offset: usize,
}

impl EncodingError {
    /// Which input the offending byte was found in.
    pub fn what(&self) -> &'static str {
        self.what
    }

    /// Byte offset of the first embedded NUL.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Everything that can fail on the execute path before the engine runs.
///
/// Script-level failures are not represented here; they come back as the
/// engine's own exit status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// The engine could not be (or can no longer be) initialized.
    #[error(transparent)]
    Init(#[from] InitError),

    /// The request's text never made it across the boundary.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl ExecError {
    /// The sentinel exit status standing in for this failure when the caller
    /// asked for the infallible integer-status contract.
    pub fn status(&self) -> i32 {
        match self {
            ExecError::Init(_) => STATUS_INIT_FAILURE,
            ExecError::Encoding(_) => STATUS_ENCODING_FAILURE,
        }
    }
}
