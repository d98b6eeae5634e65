//! Lifecycle tests: init idempotence, shutdown ordering, and the
//! terminated latch.

use std::sync::Arc;
use std::thread;

use php_embed::testutils::FakeEngine;
use php_embed::{InitError, Invocation, Runtime, STATUS_INIT_FAILURE};
use tracing_subscriber::fmt;

fn init_tracing() {
    let _ = fmt().with_test_writer().try_init();
}

#[test]
fn repeated_init_performs_one_true_startup() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    for _ in 0..5 {
        runtime.ensure_initialized().unwrap();
    }

    assert_eq!(engine.startups(), 1);
}

#[test]
fn concurrent_first_use_still_initializes_exactly_once() {
    init_tracing();
    let engine = FakeEngine::new();
    let runtime = Arc::new(Runtime::new(engine.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let runtime = runtime.clone();
            thread::spawn(move || runtime.ensure_initialized())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(engine.startups(), 1);
}

#[test]
fn first_invocation_initializes_implicitly() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    let outcome = runtime.execute(Invocation::code("echo 1;"));

    assert!(outcome.success());
    assert_eq!(engine.startups(), 1);
}

#[test]
fn startup_failure_surfaces_and_maps_to_the_init_sentinel() {
    let engine = FakeEngine::failing_startup(InitError::Startup("sapi refused".into()));
    let runtime = Runtime::new(engine.clone());

    assert_eq!(
        runtime.ensure_initialized(),
        Err(InitError::Startup("sapi refused".into()))
    );

    let outcome = runtime.execute(Invocation::code("echo 1;"));
    assert_eq!(outcome.status, STATUS_INIT_FAILURE);
    assert!(engine.calls().is_empty());
}

#[test]
fn shutdown_without_startup_latches_terminated() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    runtime.shutdown().unwrap();

    assert_eq!(engine.shutdowns(), 0);
    assert_eq!(
        runtime.ensure_initialized(),
        Err(InitError::AlreadyTerminated)
    );
}

#[test]
fn shutdown_is_idempotent_after_termination() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    runtime.ensure_initialized().unwrap();
    runtime.shutdown().unwrap();
    runtime.shutdown().unwrap();

    assert_eq!(engine.shutdowns(), 1);
}

#[test]
fn shutdown_waits_for_the_in_flight_invocation() {
    init_tracing();
    let (engine, gate) = FakeEngine::gated();
    engine.push_status(7);
    let runtime = Arc::new(Runtime::new(engine.clone()));

    let invoker = {
        let runtime = runtime.clone();
        thread::spawn(move || runtime.execute(Invocation::file("long.php")))
    };
    gate.wait_entered();

    let closer = {
        let runtime = runtime.clone();
        thread::spawn(move || runtime.shutdown())
    };

    gate.open();
    let outcome = invoker.join().unwrap();
    closer.join().unwrap().unwrap();

    // The invocation delivered its normal result, and teardown strictly
    // followed its exit from the engine.
    assert_eq!(outcome.status, 7);
    assert_eq!(engine.shutdowns(), 1);
    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    let shutdown_at = engine.shutdown_at().unwrap();
    assert!(calls[0].exited <= shutdown_at);
}

#[test]
fn unclean_teardown_is_reported_but_still_latches() {
    let engine =
        FakeEngine::failing_shutdown(php_embed::ShutdownError::Teardown("sapi hung".into()));
    let runtime = Runtime::new(engine.clone());
    runtime.ensure_initialized().unwrap();

    let err = runtime.shutdown().unwrap_err();
    assert_eq!(
        err,
        php_embed::ShutdownError::Teardown("sapi hung".into())
    );

    // Reported, not retried; the runtime is terminated regardless.
    assert_eq!(
        runtime.ensure_initialized(),
        Err(InitError::AlreadyTerminated)
    );
    assert_eq!(runtime.shutdown(), Ok(()));
    assert_eq!(engine.shutdowns(), 1);
}

#[test]
fn nothing_succeeds_after_terminated() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());
    runtime.ensure_initialized().unwrap();
    runtime.shutdown().unwrap();

    assert_eq!(
        runtime.ensure_initialized(),
        Err(InitError::AlreadyTerminated)
    );

    let err = runtime
        .try_execute(Invocation::code("echo 1;"))
        .unwrap_err();
    assert_eq!(err, InitError::AlreadyTerminated.into());
    assert_eq!(err.status(), STATUS_INIT_FAILURE);

    let outcome = runtime.execute(Invocation::file("late.php"));
    assert_eq!(outcome.status, STATUS_INIT_FAILURE);
    assert!(engine.calls().is_empty());
}
