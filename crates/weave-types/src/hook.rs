//! Hook and target abstractions.
//!
//! A [`Target`] is anything a proxy can forward to: one `invoke` entry
//! point, dispatched by method name. A [`Hook`] is a zero-argument
//! callable run before or after every forwarded call; hooks are always
//! optional and their absence is never an error.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A failure raised by the proxied target itself.
///
/// Targets own their failure text; the proxy passes it through without
/// wrapping or translation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TargetError(pub String);

impl TargetError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A failure raised by a before- or after-hook.
///
/// Hook failures are absorbed inside synthesized method bodies and only
/// surface through proxy diagnostics, never to the proxy caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The dispatch surface every proxied object implements.
///
/// `method` is the signature name from the interface descriptor; `args`
/// arrive in declaration order, already arity- and type-checked against
/// the signature by the runtime.
pub trait Target: Send + Sync {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, TargetError>;
}

/// A before- or after-hook: zero arguments, no meaningful return.
pub type Hook = Arc<dyn Fn() -> Result<(), HookError> + Send + Sync>;

/// Wrap a plain closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: Fn() -> Result<(), HookError> + Send + Sync + 'static,
{
    Arc::new(f)
}

impl fmt::Debug for dyn Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<target>")
    }
}
