//! Lifecycle management and serialized access to the embedded engine.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::{ExecError, InitError, ShutdownError};
use crate::executor::{Invocation, Outcome, Source, INLINE_ARGV0};
use crate::marshal::{ArgVec, EngineText};
use crate::version::VersionInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Uninitialized,
    Initialized,
    ShuttingDown,
    Terminated,
}

/// Host-side handle to the embedded engine.
///
/// One exclusive lock spans lifecycle checks, marshaling, and the entire
/// duration of every invocation: the wrapped engine is non-reentrant and not
/// thread-safe, so a second caller blocks until the in-flight run returns.
/// There is no cancellation or timeout; the engine offers none and this
/// boundary does not fabricate one.
///
/// The real engine is a process-wide singleton (enforced by the backend);
/// independent `Runtime` values exist so tests can run isolated doubles.
pub struct Runtime<E> {
    engine: E,
    state: Mutex<LifecycleState>,
}

impl<E: Engine> Runtime<E> {
    /// Wrap `engine` without touching it. Startup happens at the first
    /// explicit [`ensure_initialized`](Runtime::ensure_initialized) or
    /// implicitly on the first invocation.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    /// Bring the engine up if it is not already.
    ///
    /// Idempotent and safe under concurrent first use: the lock guarantees
    /// exactly one true startup, and every later caller observes the
    /// initialized state and returns success. Fails with
    /// [`InitError::AlreadyTerminated`] once the runtime has shut down.
    pub fn ensure_initialized(&self) -> Result<(), InitError> {
        let mut state = self.lock_state();
        self.ensure_initialized_locked(&mut state)
    }

    fn ensure_initialized_locked(
        &self,
        state: &mut MutexGuard<'_, LifecycleState>,
    ) -> Result<(), InitError> {
        match **state {
            LifecycleState::Initialized => Ok(()),
            LifecycleState::Uninitialized => {
                self.engine.startup()?;
                **state = LifecycleState::Initialized;
                debug!("engine initialized");
                Ok(())
            }
            LifecycleState::ShuttingDown | LifecycleState::Terminated => {
                Err(InitError::AlreadyTerminated)
            }
        }
    }

    /// Tear the engine down.
    ///
    /// Blocks on the invocation lock, so any in-flight run completes and
    /// returns its result before teardown begins; no invocation ever
    /// observes a half-dead engine. The runtime then latches `Terminated`
    /// permanently, because the embed SAPI cannot be re-initialized within
    /// one process; later init or execute attempts fail. Idempotent once
    /// terminated. A runtime that never initialized terminates without
    /// touching the engine.
    pub fn shutdown(&self) -> Result<(), ShutdownError> {
        let mut state = self.lock_state();
        match *state {
            LifecycleState::ShuttingDown | LifecycleState::Terminated => Ok(()),
            LifecycleState::Uninitialized => {
                *state = LifecycleState::Terminated;
                debug!("runtime terminated without engine startup");
                Ok(())
            }
            LifecycleState::Initialized => {
                *state = LifecycleState::ShuttingDown;
                let result = self.engine.shutdown();
                *state = LifecycleState::Terminated;
                match &result {
                    Ok(()) => debug!("engine terminated"),
                    Err(err) => warn!(error = %err, "engine teardown reported failure"),
                }
                result
            }
        }
    }

    /// Run one invocation to completion and report its exit status.
    ///
    /// Never panics and never errors: boundary failures come back as the
    /// negative sentinel statuses, and everything the script itself does
    /// (missing file, parse error, explicit `exit`) comes back as the
    /// engine's own exit code, untouched.
    pub fn execute(&self, invocation: Invocation) -> Outcome {
        match self.try_execute(invocation) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "invocation failed at the boundary");
                Outcome {
                    status: err.status(),
                }
            }
        }
    }

    /// Typed variant of [`execute`](Runtime::execute) for hosts that want
    /// boundary failures as errors rather than sentinel statuses.
    ///
    /// Marshaling runs before initialization, so a malformed request fails
    /// the single call without any lifecycle side effect. Auto-initializes
    /// on first use. The lock is held from the lifecycle check until the
    /// engine call returns.
    pub fn try_execute(&self, invocation: Invocation) -> Result<Outcome, ExecError> {
        let mut state = self.lock_state();

        let Invocation { source, args } = invocation;
        let status = match source {
            Source::File(path) => {
                let bytes = path.as_os_str().as_encoded_bytes();
                let script = EngineText::new("script path", bytes)?;
                let argv = ArgVec::new(bytes, &args)?;
                self.ensure_initialized_locked(&mut state)?;
                debug!(path = %path.display(), argc = argv.argc(), "running script file");
                self.engine.run_script(&script, &argv)
            }
            Source::Code(text) => {
                let code = EngineText::new("inline code", text)?;
                let argv = ArgVec::new(INLINE_ARGV0, &args)?;
                self.ensure_initialized_locked(&mut state)?;
                debug!(argc = argv.argc(), "running inline code");
                self.engine.run_code(&code, &argv)
            }
        };

        Ok(Outcome { status })
    }

    /// Version facts of the linked engine.
    ///
    /// Valid in every lifecycle state: version metadata belongs to the
    /// build, not to a running instance, so no lock is taken.
    pub fn version(&self) -> VersionInfo {
        self.engine.version()
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        // A poisoned lock means a panic inside an engine call on another
        // thread; the state value itself is always left coherent, so
        // continue with it rather than propagating the panic.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The process-global runtime over the real engine.
///
/// Every caller gets the same logical handle, matching the engine's own
/// process-wide singleton nature. First use constructs the runtime; the
/// engine still starts lazily.
#[cfg(feature = "php")]
pub fn php_runtime() -> &'static Runtime<crate::engine::PhpEngine> {
    use std::sync::OnceLock;

    static RUNTIME: OnceLock<Runtime<crate::engine::PhpEngine>> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new(crate::engine::PhpEngine::new()))
}
