//! Synthesis error types.

use thiserror::Error;
use weave_emit::EmitError;
use weave_types::TypeError;

/// Errors that can occur while synthesizing a type.
///
/// Any of these is fatal to the build call that triggered it; no
/// partially usable type is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// A member body came out structurally malformed.
    #[error("malformed body for `{method}`: {source}")]
    Body {
        method: String,
        #[source]
        source: EmitError,
    },

    /// The interface descriptor itself is invalid.
    #[error("invalid descriptor: {0}")]
    Descriptor(#[from] TypeError),

    /// The descriptor could not be serialized for fingerprinting.
    #[error("descriptor fingerprint failed: {0}")]
    Fingerprint(String),

    /// An internal consistency check failed at finalization.
    #[error("internal synthesis error: {0}")]
    Internal(String),
}

impl SynthError {
    pub(crate) fn body(method: &str, source: EmitError) -> Self {
        Self::Body {
            method: method.to_string(),
            source,
        }
    }
}
