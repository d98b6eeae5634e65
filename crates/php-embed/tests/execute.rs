//! Execute-path tests: exit-status fidelity, argv marshaling, serialized
//! engine access, and encoding rejection.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use php_embed::testutils::{CallKind, FakeEngine};
use php_embed::{ExecError, Invocation, Runtime, STATUS_ENCODING_FAILURE};

#[test]
fn engine_exit_status_passes_through_unchanged() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    engine.push_status(7);
    let outcome = runtime.execute(Invocation::file("exits_with_7.php"));
    assert_eq!(outcome.status, 7);

    // Engine-reported parse failure is whatever the engine says, never 0.
    engine.push_status(255);
    let outcome = runtime.execute(Invocation::code("<?php syntax error"));
    assert_eq!(outcome.status, 255);
    assert!(!outcome.success());

    let outcome = runtime.execute(Invocation::code("echo 'ok';"));
    assert!(outcome.success());
}

#[test]
fn script_invocations_carry_the_path_as_argv0() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    runtime.execute(Invocation::file("demo.php").args(["first", "second"]));

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, CallKind::Script);
    assert_eq!(calls[0].text, "demo.php");
    assert_eq!(calls[0].argv, vec!["demo.php", "first", "second"]);
}

#[test]
fn inline_code_runs_with_dash_argv0() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    runtime.execute(Invocation::code("var_dump($argv);").args(["only"]));

    let calls = engine.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, CallKind::Code);
    assert_eq!(calls[0].text, "var_dump($argv);");
    assert_eq!(calls[0].argv, vec!["-", "only"]);
}

#[test]
fn concurrent_invocations_never_overlap_inside_the_engine() {
    let engine = FakeEngine::dwelling(Duration::from_millis(20));
    let runtime = Arc::new(Runtime::new(engine.clone()));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let runtime = runtime.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                runtime.execute(Invocation::code(format!("echo {i};")))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().success());
    }

    let mut calls = engine.calls();
    assert_eq!(calls.len(), 4);
    calls.sort_by_key(|call| call.entered);
    for pair in calls.windows(2) {
        assert!(
            pair[0].exited <= pair[1].entered,
            "two invocations overlapped inside the engine"
        );
    }
}

#[test]
fn embedded_nul_in_code_is_rejected_before_the_engine() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    let outcome = runtime.execute(Invocation::code("echo 1;\0trailing"));

    assert_eq!(outcome.status, STATUS_ENCODING_FAILURE);
    // Nothing reached the engine and the lifecycle was not touched.
    assert!(engine.calls().is_empty());
    assert_eq!(engine.startups(), 0);
}

#[test]
fn embedded_nul_in_path_or_argument_is_rejected() {
    let engine = FakeEngine::new();
    let runtime = Runtime::new(engine.clone());

    let err = runtime
        .try_execute(Invocation::file("bad\0path.php"))
        .unwrap_err();
    match err {
        ExecError::Encoding(enc) => {
            assert_eq!(enc.what(), "script path");
            assert_eq!(enc.offset(), 3);
        }
        other => panic!("expected encoding error, got {other:?}"),
    }

    let err = runtime
        .try_execute(Invocation::code("echo 1;").args(["fine", "not\0fine"]))
        .unwrap_err();
    match err {
        ExecError::Encoding(enc) => assert_eq!(enc.what(), "argument"),
        other => panic!("expected encoding error, got {other:?}"),
    }

    assert!(engine.calls().is_empty());
}
