//! Shared types for the weave proxy toolkit.
//!
//! This crate defines the value model, method signatures, interface
//! descriptors, and the hook/target abstractions used across all
//! synthesis stages.

mod descriptor;
mod hook;
mod value;

pub use descriptor::{InterfaceDesc, MethodSig, TypeError, MAX_PARAMS};
pub use hook::{hook, Hook, HookError, Target, TargetError};
pub use value::{Value, ValueType};

/// Result type used throughout descriptor construction.
pub type Result<T> = std::result::Result<T, TypeError>;
