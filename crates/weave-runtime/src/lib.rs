//! weave runtime: executes synthesized method bodies against wrapper
//! instances.
//!
//! The [`Interpreter`] is the materialized form of a synthesized type:
//! it runs verified bodies from `weave-emit` — operand stack, locals
//! frame, label-resolved branches, protected-region unwinding — with
//! the three wrapper slots (target, before hook, after hook) supplied
//! by a [`WrapperInstance`]. Hook failures raised inside a protected
//! region are absorbed: one line goes to the interpreter's captured
//! diagnostics and the proxy caller sees nothing. Forwarded-call
//! failures are never absorbed and pass through unmodified as
//! [`CallError::Target`].

mod error;
mod interp;
mod wrapper;

pub use error::CallError;
pub use interp::Interpreter;
pub use wrapper::WrapperInstance;

/// Result alias for proxy-call execution.
pub type CallResult<T> = Result<T, CallError>;
