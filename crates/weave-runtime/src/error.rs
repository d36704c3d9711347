//! Runtime error types for proxy-call execution.

use std::fmt;
use weave_types::{TargetError, ValueType};

/// A proxy call failed.
///
/// `Target` is the pass-through case: the proxied object's own failure,
/// unwrapped and untranslated. Everything else is detected at the proxy
/// boundary before or during body execution.
#[derive(Debug, Clone, PartialEq)]
pub enum CallError {
    /// No method with this name on the interface.
    UnknownMethod(String),
    /// Wrong number of arguments for the signature.
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },
    /// An argument's type disagrees with the signature.
    ArgType {
        method: String,
        index: usize,
        expected: ValueType,
        got: ValueType,
    },
    /// The target returned a value of the wrong type.
    ReturnType {
        method: String,
        expected: ValueType,
        got: ValueType,
    },
    /// The forwarded call failed; the target's error, unmodified.
    Target(TargetError),
    /// Internal interpreter fault. Unreachable for verified bodies;
    /// kept as an error rather than a panic for hand-built ones.
    Fault(String),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMethod(name) => write!(f, "unknown method: {name}"),
            Self::ArityMismatch {
                method,
                expected,
                got,
            } => write!(f, "{method}: expected {expected} argument(s), got {got}"),
            Self::ArgType {
                method,
                index,
                expected,
                got,
            } => write!(
                f,
                "{method}: argument {index} has type {got}, expected {expected}"
            ),
            Self::ReturnType {
                method,
                expected,
                got,
            } => write!(f, "{method}: target returned {got}, expected {expected}"),
            Self::Target(err) => write!(f, "target error: {err}"),
            Self::Fault(msg) => write!(f, "interpreter fault: {msg}"),
        }
    }
}

impl std::error::Error for CallError {}
