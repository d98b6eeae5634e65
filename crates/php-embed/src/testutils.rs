//! Test utilities for `php-embed`.
//!
//! Kept as a public module so external test crates can share the same
//! engine doubles (`use php_embed::testutils::*`) instead of re-rolling
//! recorders in every test file. The centerpiece is [`FakeEngine`], a
//! recording stand-in that satisfies [`Engine`] without linking libphp and
//! captures exactly what crossed the seam and when.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::engine::Engine;
use crate::error::{InitError, ShutdownError};
use crate::marshal::{ArgVec, EngineText};
use crate::version::VersionInfo;

/// Which fake entry point a recorded call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// `run_script`.
    Script,
    /// `run_code`.
    Code,
}

/// One recorded engine call, with its marshaled view and timing.
#[derive(Debug, Clone)]
pub struct Call {
    /// Entry point taken.
    pub kind: CallKind,
    /// Marshaled source text: the script path or the code body.
    pub text: String,
    /// Marshaled argument vector, `argv[0]` included.
    pub argv: Vec<String>,
    /// When the call entered the engine.
    pub entered: Instant,
    /// When the call left the engine.
    pub exited: Instant,
}

#[derive(Default)]
struct GateInner {
    entered: Mutex<bool>,
    entered_cv: Condvar,
    open: Mutex<bool>,
    open_cv: Condvar,
}

/// Remote control for a gated [`FakeEngine`]: lets a test observe that an
/// invocation is inside the engine and decide when it may finish.
#[derive(Clone)]
pub struct Gate(Arc<GateInner>);

impl Gate {
    /// Block until an invocation is dwelling inside the engine.
    pub fn wait_entered(&self) {
        let mut entered = self.0.entered.lock().unwrap();
        while !*entered {
            entered = self.0.entered_cv.wait(entered).unwrap();
        }
    }

    /// Let every blocked invocation finish.
    pub fn open(&self) {
        *self.0.open.lock().unwrap() = true;
        self.0.open_cv.notify_all();
    }
}

struct Inner {
    version: Mutex<VersionInfo>,
    fail_startup: Mutex<Option<InitError>>,
    fail_shutdown: Mutex<Option<ShutdownError>>,
    dwell: Mutex<Duration>,
    gate: Mutex<Option<Arc<GateInner>>>,
    startups: AtomicUsize,
    shutdowns: AtomicUsize,
    shutdown_at: Mutex<Option<Instant>>,
    statuses: Mutex<VecDeque<i32>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            version: Mutex::new(VersionInfo {
                string: "8.3.0".into(),
                id: 80300,
            }),
            fail_startup: Mutex::new(None),
            fail_shutdown: Mutex::new(None),
            dwell: Mutex::new(Duration::ZERO),
            gate: Mutex::new(None),
            startups: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            shutdown_at: Mutex::new(None),
            statuses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

/// A recording stand-in for the real engine.
///
/// Exit statuses come from a queue ([`push_status`](FakeEngine::push_status));
/// a call finding the queue empty returns 0. Every call is recorded with the
/// marshaled text and argv plus enter/exit instants, which is what the
/// serialization and shutdown-ordering tests assert on. Clones share state,
/// so tests keep a clone while the runtime owns the original.
#[derive(Clone, Default)]
pub struct FakeEngine {
    inner: Arc<Inner>,
}

impl FakeEngine {
    /// A well-behaved engine reporting version 8.3.0 / 80300.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose startup fails with `err`.
    pub fn failing_startup(err: InitError) -> Self {
        let engine = Self::new();
        *engine.inner.fail_startup.lock().unwrap() = Some(err);
        engine
    }

    /// An engine whose teardown reports `err`.
    pub fn failing_shutdown(err: ShutdownError) -> Self {
        let engine = Self::new();
        *engine.inner.fail_shutdown.lock().unwrap() = Some(err);
        engine
    }

    /// An engine whose run calls dwell inside the engine for `dwell` before
    /// returning. Used to make overlap observable.
    pub fn dwelling(dwell: Duration) -> Self {
        let engine = Self::new();
        *engine.inner.dwell.lock().unwrap() = dwell;
        engine
    }

    /// An engine whose run calls block inside the engine until the returned
    /// [`Gate`] is opened. Used to pin an invocation in flight.
    pub fn gated() -> (Self, Gate) {
        let engine = Self::new();
        let gate = Arc::new(GateInner::default());
        *engine.inner.gate.lock().unwrap() = Some(gate.clone());
        (engine, Gate(gate))
    }

    /// Override the reported version.
    pub fn set_version(&self, string: &str, id: i32) {
        *self.inner.version.lock().unwrap() = VersionInfo {
            string: string.into(),
            id,
        };
    }

    /// Queue the exit status for the next run call.
    pub fn push_status(&self, status: i32) {
        self.inner.statuses.lock().unwrap().push_back(status);
    }

    /// How many times startup ran.
    pub fn startups(&self) -> usize {
        self.inner.startups.load(Ordering::SeqCst)
    }

    /// How many times shutdown ran.
    pub fn shutdowns(&self) -> usize {
        self.inner.shutdowns.load(Ordering::SeqCst)
    }

    /// When shutdown completed, if it has.
    pub fn shutdown_at(&self) -> Option<Instant> {
        *self.inner.shutdown_at.lock().unwrap()
    }

    /// Everything that crossed the seam so far.
    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: CallKind, text: &EngineText, args: &ArgVec) -> i32 {
        let entered = Instant::now();

        let dwell = *self.inner.dwell.lock().unwrap();
        if !dwell.is_zero() {
            std::thread::sleep(dwell);
        }

        let gate = self.inner.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            *gate.entered.lock().unwrap() = true;
            gate.entered_cv.notify_all();
            let mut open = gate.open.lock().unwrap();
            while !*open {
                open = gate.open_cv.wait(open).unwrap();
            }
        }

        let status = self
            .inner
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(0);
        let exited = Instant::now();

        self.inner.calls.lock().unwrap().push(Call {
            kind,
            text: text.as_c().to_string_lossy().into_owned(),
            argv: args.to_strings(),
            entered,
            exited,
        });
        status
    }
}

impl Engine for FakeEngine {
    fn startup(&self) -> Result<(), InitError> {
        if let Some(err) = self.inner.fail_startup.lock().unwrap().clone() {
            return Err(err);
        }
        self.inner.startups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ShutdownError> {
        self.inner.shutdowns.fetch_add(1, Ordering::SeqCst);
        *self.inner.shutdown_at.lock().unwrap() = Some(Instant::now());
        match self.inner.fail_shutdown.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn run_script(&self, path: &EngineText, args: &ArgVec) -> i32 {
        self.record(CallKind::Script, path, args)
    }

    fn run_code(&self, code: &EngineText, args: &ArgVec) -> i32 {
        self.record(CallKind::Code, code, args)
    }

    fn version(&self) -> VersionInfo {
        self.inner.version.lock().unwrap().clone()
    }
}
