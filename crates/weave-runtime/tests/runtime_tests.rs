//! Integration tests for the body interpreter.
//!
//! Drives bodies produced by `weave-synth` through the interpreter
//! directly, without the façade:
//! - constructor binds the target
//! - forwarding passes arguments unchanged and returns the result
//! - hook phases run in order, skip absent hooks, absorb failures
//! - forwarded-call failures pass through unmodified
//! - argument arity/type checking at the call boundary
//! - hand-built (unverified) bodies fault instead of panicking

use std::sync::{Arc, Mutex};

use weave_emit::Body;
use weave_runtime::{CallError, Interpreter, WrapperInstance};
use weave_synth::synthesize;
use weave_types::{hook, HookError, InterfaceDesc, MethodSig, Target, TargetError, Value, ValueType};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Shared append-only event log for observing call order.
type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A worker that records its calls and doubles `compute` inputs.
struct Worker {
    log: Log,
}

impl Target for Worker {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, TargetError> {
        match method {
            "report" => {
                let Value::Int(code) = &args[0] else {
                    return Err(TargetError::new("report expects an int"));
                };
                self.log.lock().unwrap().push(format!("target:{code}"));
                Ok(Value::Unit)
            }
            "compute" => {
                let Value::Int(x) = &args[0] else {
                    return Err(TargetError::new("compute expects an int"));
                };
                Ok(Value::Int(x * 2))
            }
            "fail" => Err(TargetError::new("target exploded")),
            other => Err(TargetError::new(format!("no such method: {other}"))),
        }
    }
}

fn worker_interface() -> InterfaceDesc {
    InterfaceDesc::new(
        "IWorker",
        vec![
            MethodSig::new("report", vec![ValueType::Int], ValueType::Unit),
            MethodSig::new("compute", vec![ValueType::Int], ValueType::Int),
            MethodSig::new("fail", vec![], ValueType::Unit),
        ],
    )
    .unwrap()
}

/// Synthesize the worker type and construct a bound wrapper.
fn bound_wrapper(log: &Log) -> (Arc<weave_synth::SynthType>, WrapperInstance, Interpreter) {
    let ty = synthesize(&worker_interface()).unwrap();
    let mut wrapper = WrapperInstance::new();
    let interp = Interpreter::new();
    interp
        .construct(ty.ctor(), &mut wrapper, Arc::new(Worker { log: log.clone() }))
        .unwrap();
    (ty, wrapper, interp)
}

// ══════════════════════════════════════════════════════════════════════════════
// Construction and forwarding
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn constructor_binds_the_target() {
    let log = log();
    let (_, wrapper, _) = bound_wrapper(&log);
    assert!(wrapper.target().is_some());
    assert!(wrapper.before_hook().is_none());
    assert!(wrapper.after_hook().is_none());
}

#[test]
fn forwarding_returns_the_target_result() {
    let log = log();
    let (ty, wrapper, interp) = bound_wrapper(&log);
    let idx = ty.method_index("compute").unwrap();
    let out = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[Value::Int(5)],
        )
        .unwrap();
    assert_eq!(out, Value::Int(10));
}

#[test]
fn unit_method_forwards_arguments_unchanged() {
    let log = log();
    let (ty, wrapper, interp) = bound_wrapper(&log);
    let idx = ty.method_index("report").unwrap();
    let out = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[Value::Int(7)],
        )
        .unwrap();
    assert_eq!(out, Value::Unit);
    assert_eq!(entries(&log), vec!["target:7"]);
}

#[test]
fn forwarded_failure_passes_through_unmodified() {
    let log = log();
    let (ty, wrapper, interp) = bound_wrapper(&log);
    let idx = ty.method_index("fail").unwrap();
    let err = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[],
        )
        .unwrap_err();
    assert_eq!(err, CallError::Target(TargetError::new("target exploded")));
}

// ══════════════════════════════════════════════════════════════════════════════
// Hook phases
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn hooks_run_in_before_target_after_order() {
    let log = log();
    let (ty, mut wrapper, interp) = bound_wrapper(&log);
    let before_log = log.clone();
    let after_log = log.clone();
    wrapper.bind_hooks(
        Some(hook(move || {
            before_log.lock().unwrap().push("before".to_string());
            Ok(())
        })),
        Some(hook(move || {
            after_log.lock().unwrap().push("after".to_string());
            Ok(())
        })),
    );
    let idx = ty.method_index("report").unwrap();
    interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[Value::Int(7)],
        )
        .unwrap();
    assert_eq!(entries(&log), vec!["before", "target:7", "after"]);
}

#[test]
fn failing_before_hook_is_absorbed_and_forwarding_still_runs() {
    let log = log();
    let (ty, mut wrapper, interp) = bound_wrapper(&log);
    wrapper.bind_hooks(Some(hook(|| Err(HookError::new("before boom")))), None);
    let idx = ty.method_index("compute").unwrap();
    let out = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[Value::Int(4)],
        )
        .unwrap();
    assert_eq!(out, Value::Int(8));
    assert_eq!(
        interp.diagnostics(),
        vec!["absorbed hook failure: before boom".to_string()]
    );
}

#[test]
fn failing_after_hook_does_not_lose_the_result() {
    let log = log();
    let (ty, mut wrapper, interp) = bound_wrapper(&log);
    wrapper.bind_hooks(None, Some(hook(|| Err(HookError::new("after boom")))));
    let idx = ty.method_index("compute").unwrap();
    let out = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[Value::Int(3)],
        )
        .unwrap();
    assert_eq!(out, Value::Int(6));
    assert_eq!(interp.diagnostics().len(), 1);
}

#[test]
fn after_hook_is_skipped_when_the_forwarded_call_fails() {
    let log = log();
    let (ty, mut wrapper, interp) = bound_wrapper(&log);
    let after_log = log.clone();
    wrapper.bind_hooks(
        None,
        Some(hook(move || {
            after_log.lock().unwrap().push("after".to_string());
            Ok(())
        })),
    );
    let idx = ty.method_index("fail").unwrap();
    let err = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[],
        )
        .unwrap_err();
    assert!(matches!(err, CallError::Target(_)));
    assert!(entries(&log).is_empty(), "after phase must not run");
}

#[test]
fn absent_hooks_invoke_nothing_and_raise_nothing() {
    let log = log();
    let (ty, wrapper, interp) = bound_wrapper(&log);
    let idx = ty.method_index("compute").unwrap();
    let out = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[Value::Int(1)],
        )
        .unwrap();
    assert_eq!(out, Value::Int(2));
    assert!(interp.diagnostics().is_empty());
}

// ══════════════════════════════════════════════════════════════════════════════
// Call-boundary checking
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn arity_mismatch_rejected_before_execution() {
    let log = log();
    let (ty, wrapper, interp) = bound_wrapper(&log);
    let idx = ty.method_index("report").unwrap();
    let err = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[],
        )
        .unwrap_err();
    assert_eq!(
        err,
        CallError::ArityMismatch {
            method: "report".to_string(),
            expected: 1,
            got: 0,
        }
    );
    assert!(entries(&log).is_empty(), "target must not observe the call");
}

#[test]
fn argument_type_mismatch_rejected_before_execution() {
    let log = log();
    let (ty, wrapper, interp) = bound_wrapper(&log);
    let idx = ty.method_index("report").unwrap();
    let err = interp
        .invoke(
            ty.interface(),
            idx,
            ty.method_body(idx).unwrap(),
            &wrapper,
            &[Value::Str("seven".into())],
        )
        .unwrap_err();
    assert_eq!(
        err,
        CallError::ArgType {
            method: "report".to_string(),
            index: 0,
            expected: ValueType::Int,
            got: ValueType::Str,
        }
    );
}

#[test]
fn mistyped_target_return_is_reported() {
    struct Liar;
    impl Target for Liar {
        fn invoke(&self, _method: &str, _args: &[Value]) -> Result<Value, TargetError> {
            Ok(Value::Str("not an int".into()))
        }
    }
    let desc = InterfaceDesc::new(
        "ILiar",
        vec![MethodSig::new("compute", vec![ValueType::Int], ValueType::Int)],
    )
    .unwrap();
    let ty = synthesize(&desc).unwrap();
    let mut wrapper = WrapperInstance::new();
    let interp = Interpreter::new();
    interp.construct(ty.ctor(), &mut wrapper, Arc::new(Liar)).unwrap();
    let err = interp
        .invoke(
            ty.interface(),
            0,
            ty.method_body(0).unwrap(),
            &wrapper,
            &[Value::Int(1)],
        )
        .unwrap_err();
    assert!(matches!(err, CallError::ReturnType { .. }));
}

// ══════════════════════════════════════════════════════════════════════════════
// Hand-built bodies fault, never panic
// ══════════════════════════════════════════════════════════════════════════════

/// A body that never went through the emitter; only possible via
/// deserialization.
fn raw_body(json: &str) -> Body {
    serde_json::from_str(json).unwrap()
}

fn raw_interface() -> InterfaceDesc {
    InterfaceDesc::new(
        "IRaw",
        vec![MethodSig::new("go", vec![], ValueType::Unit)],
    )
    .unwrap()
}

#[test]
fn out_of_frame_local_faults_instead_of_panicking() {
    let body = raw_body(
        r#"{"insts":[{"load_local":5},"return"],"argc":0,"locals":0,"labels":[],"regions":[]}"#,
    );
    let wrapper = WrapperInstance::new();
    let interp = Interpreter::new();
    let err = interp
        .invoke(&raw_interface(), 0, &body, &wrapper, &[])
        .unwrap_err();
    assert!(matches!(err, CallError::Fault(_)));
}

#[test]
fn unresolved_branch_label_faults_instead_of_panicking() {
    let body = raw_body(
        r#"{"insts":[{"jump":0},"return"],"argc":0,"locals":0,"labels":[],"regions":[]}"#,
    );
    let wrapper = WrapperInstance::new();
    let interp = Interpreter::new();
    let err = interp
        .invoke(&raw_interface(), 0, &body, &wrapper, &[])
        .unwrap_err();
    assert!(matches!(err, CallError::Fault(_)));
}

#[test]
fn out_of_frame_store_faults_instead_of_panicking() {
    let body = raw_body(
        r#"{"insts":[{"load_field":"target"},{"store_local":9},"return"],"argc":0,"locals":0,"labels":[],"regions":[]}"#,
    );
    let wrapper = WrapperInstance::new();
    let interp = Interpreter::new();
    let err = interp
        .invoke(&raw_interface(), 0, &body, &wrapper, &[])
        .unwrap_err();
    assert!(matches!(err, CallError::Fault(_)));
}
