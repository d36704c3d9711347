//! Façade error types.

use thiserror::Error;
use weave_runtime::CallError;
use weave_synth::SynthError;

/// Errors surfaced by [`crate::ProxyBuilder::build`].
///
/// All of these are reported at build time; nothing here is deferred
/// to the first proxy call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// Type synthesis failed (malformed member body, invalid
    /// descriptor).
    #[error(transparent)]
    Synthesis(#[from] SynthError),

    /// The constructor body failed while binding the target.
    #[error("constructor execution failed: {0}")]
    Construct(#[from] CallError),
}
