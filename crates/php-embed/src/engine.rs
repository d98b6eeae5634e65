//! The engine seam: the trait every invocation goes through, and the
//! libphp-backed implementation behind the `php` feature.

use crate::error::{InitError, ShutdownError};
use crate::marshal::{ArgVec, EngineText};
use crate::version::VersionInfo;

/// Backend seam for the embedded interpreter.
///
/// The production backend is [`PhpEngine`]; tests substitute recording
/// doubles so lifecycle and serialization rules can be exercised without
/// linking libphp. Except for [`version`](Engine::version), every method is
/// called with the runtime's exclusive lock held and never concurrently.
pub trait Engine: Send + Sync + 'static {
    /// Bring the engine up. Called at most once per runtime.
    fn startup(&self) -> Result<(), InitError>;

    /// Tear the engine down. Called at most once, and only after a
    /// successful [`startup`](Engine::startup).
    fn shutdown(&self) -> Result<(), ShutdownError>;

    /// Run a script file to completion; returns the engine's exit status.
    fn run_script(&self, path: &EngineText, args: &ArgVec) -> i32;

    /// Run inline code to completion; returns the engine's exit status.
    fn run_code(&self, code: &EngineText, args: &ArgVec) -> i32;

    /// Version facts of the linked engine. Static metadata of the build, so
    /// this must work in every lifecycle state, without `startup`.
    fn version(&self) -> VersionInfo;
}

#[cfg(feature = "php")]
mod php {
    use std::ffi::CStr;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tracing::debug;

    use super::Engine;
    use crate::error::{InitError, ShutdownError};
    use crate::ffi;
    use crate::marshal::{ArgVec, EngineText};
    use crate::version::VersionInfo;

    // At most one live PHP engine per process, and the latch is never
    // cleared: the embed SAPI cannot be re-initialized once torn down.
    static PROCESS_LATCH: AtomicBool = AtomicBool::new(false);

    /// The libphp-backed engine, speaking the shim ABI in [`crate::ffi`].
    ///
    /// A process-wide singleton: constructing a second value is fine, but
    /// only one can ever pass [`startup`](Engine::startup), and none can
    /// after a shutdown.
    #[derive(Debug, Default)]
    pub struct PhpEngine {
        _priv: (),
    }

    impl PhpEngine {
        /// Handle to the linked engine. Does not touch the engine itself.
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Engine for PhpEngine {
        fn startup(&self) -> Result<(), InitError> {
            if PROCESS_LATCH.swap(true, Ordering::SeqCst) {
                return Err(InitError::AlreadyRunning);
            }
            // The shim folds the SAPI's per-request startup into each
            // execute entry point; claiming the process latch is all the
            // host-side startup there is.
            debug!("php engine claimed for this process");
            Ok(())
        }

        fn shutdown(&self) -> Result<(), ShutdownError> {
            // Teardown is likewise folded into the shim's execute calls.
            // The latch stays set so no later startup can succeed.
            debug!("php engine released; process latch stays set");
            Ok(())
        }

        fn run_script(&self, path: &EngineText, args: &ArgVec) -> i32 {
            unsafe { ffi::phpx_execute_script(path.as_ptr(), args.argc(), args.as_argv()) }
        }

        fn run_code(&self, code: &EngineText, args: &ArgVec) -> i32 {
            unsafe { ffi::phpx_execute_code(code.as_ptr(), args.argc(), args.as_argv()) }
        }

        fn version(&self) -> VersionInfo {
            // Engine-owned static string, valid for the process lifetime;
            // borrowed here, never freed.
            let string = unsafe { CStr::from_ptr(ffi::phpx_get_version()) }
                .to_string_lossy()
                .into_owned();
            let id = unsafe { ffi::phpx_get_version_id() };
            VersionInfo { string, id }
        }
    }
}

#[cfg(feature = "php")]
pub use php::PhpEngine;
