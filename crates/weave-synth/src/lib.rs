//! weave type synthesis: interface descriptors to verified dispatch
//! tables.
//!
//! # Architecture
//!
//! Synthesis runs in two layers, one invocation per unit of work:
//!
//! 1. the member synthesizer produces one complete, verified body per
//!    interface method (plus the fixed constructor shape), using only
//!    the emitter primitives from `weave-emit`;
//! 2. the type synthesizer allocates a fresh [`TypeAssembler`] per
//!    call, walks the interface methods in declaration order, registers
//!    each emitted body under its dispatch-table index, and finalizes
//!    the result into an immutable [`SynthType`].
//!
//! A [`TypeCache`] keyed by the sha2 fingerprint of the descriptor's
//! canonical JSON bytes lets repeat builds share the synthesized type;
//! only the wrapper instance is fresh per build.

mod cache;
mod error;
mod member;
mod typegen;

pub use cache::{fingerprint, TypeCache};
pub use error::SynthError;
pub use member::{synthesize_ctor, synthesize_method};
pub use typegen::{synthesize, SynthType, TypeAssembler};

/// Result alias for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
