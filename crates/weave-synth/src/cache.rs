//! Descriptor fingerprinting and the synthesized-type cache.
//!
//! The cache key is sha2-256 over the canonical JSON bytes of the
//! descriptor — method names, parameter types, and return types all
//! participate, so two interfaces that differ anywhere get distinct
//! types. Reuse shares the `Arc<SynthType>`; callers still construct a
//! fresh wrapper instance per build.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use weave_types::InterfaceDesc;

use crate::error::SynthError;
use crate::typegen::{self, SynthType};
use crate::SynthResult;

/// Hex sha2-256 fingerprint of a descriptor's canonical JSON bytes.
pub fn fingerprint(interface: &InterfaceDesc) -> SynthResult<String> {
    let bytes = serde_json::to_vec(interface)
        .map_err(|e| SynthError::Fingerprint(e.to_string()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        // infallible for String
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

/// Shared cache of synthesized types, keyed by descriptor fingerprint.
#[derive(Clone, Default)]
pub struct TypeCache {
    inner: Arc<Mutex<HashMap<String, Arc<SynthType>>>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the type for `interface`, synthesizing on first use.
    ///
    /// Synthesis runs outside the lock; if two callers race on the
    /// same descriptor the second result wins the slot, which is
    /// harmless because synthesis is deterministic.
    pub fn get_or_synthesize(&self, interface: &InterfaceDesc) -> SynthResult<Arc<SynthType>> {
        let key = fingerprint(interface)?;
        if let Some(ty) = self.inner.lock().expect("cache lock").get(&key) {
            return Ok(Arc::clone(ty));
        }
        let ty = typegen::synthesize(interface)?;
        self.inner
            .lock()
            .expect("cache lock")
            .insert(key, Arc::clone(&ty));
        Ok(ty)
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
