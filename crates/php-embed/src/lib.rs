#![warn(missing_docs)]

//! Host-side embedding boundary for the PHP interpreter.
//!
//! This crate wraps the C shim over libphp's embed SAPI behind a small,
//! panic-free surface: run a script file, run an inline code string, query
//! the engine version. The embedded engine is process-global, non-reentrant,
//! and not thread-safe, so everything funnels through [`Runtime`], which
//! owns the lifecycle state machine and the one exclusive lock serializing
//! invocations.
//!
//! The real backend links libphp and is only compiled with the `php` cargo
//! feature; everything else (lifecycle rules, marshaling, the execute
//! path) builds and tests without it, against doubles from [`testutils`].

mod engine;
mod error;
mod executor;
mod marshal;
mod runtime;
mod version;

#[cfg(feature = "php")]
pub mod ffi;
pub mod testutils;

pub use engine::Engine;
#[cfg(feature = "php")]
pub use engine::PhpEngine;
pub use error::{
    EncodingError, ExecError, InitError, STATUS_ENCODING_FAILURE, STATUS_INIT_FAILURE,
    ShutdownError,
};
pub use executor::{Invocation, Outcome, Source};
pub use marshal::{ArgVec, EngineText};
#[cfg(feature = "php")]
pub use runtime::php_runtime;
pub use runtime::Runtime;
pub use version::VersionInfo;
