//! weave body IR: instruction emitter and structural verifier.
//!
//! # Architecture
//!
//! A synthesized method body is a small instruction program built by
//! issuing primitives in program order against a [`BodyEmitter`]:
//! declare a local, load an argument, branch on null, open and close a
//! protected region, call, return. The emitter never reorders or
//! inspects what was already issued — sequencing correctness is the
//! caller's job, which is exactly why [`BodyEmitter::finish`] runs a
//! structural verifier before any [`Body`] escapes:
//!
//! - every defined label is marked exactly once and every branch target
//!   is in range,
//! - the body ends in a terminator and nothing falls off the end,
//! - protected regions are properly nested, fully closed, and left via
//!   a structured [`Inst::Leave`] on the success path,
//! - local and argument indices are in range,
//! - the operand stack never underflows and carries no dangling
//!   operands at a return.
//!
//! A malformed body is an [`EmitError`]; it never becomes a `Body`.

mod emitter;
mod error;
mod inst;
mod verify;

pub use emitter::BodyEmitter;
pub use error::EmitError;
pub use inst::{Body, Inst, LabelId, LocalId, Region, WrapperField};

/// Result alias for emitter operations.
pub type EmitResult<T> = Result<T, EmitError>;
