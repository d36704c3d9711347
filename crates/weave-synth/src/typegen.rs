//! Type synthesis: end-to-end construction of one [`SynthType`] per
//! interface descriptor.
//!
//! Each `synthesize` call allocates its own [`TypeAssembler`] — the
//! isolated generation container, used once and abandoned — so
//! concurrent calls never share mutable generation state.

use std::sync::Arc;

use weave_emit::{Body, Inst};
use weave_types::{InterfaceDesc, MethodSig};

use crate::error::SynthError;
use crate::member;
use crate::SynthResult;

/// A synthesized type: the interface it implements, a constructor body,
/// and one method body per interface method, indexed in declaration
/// order. Immutable after finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthType {
    interface: InterfaceDesc,
    ctor: Body,
    methods: Vec<Body>,
}

impl SynthType {
    pub fn interface(&self) -> &InterfaceDesc {
        &self.interface
    }

    pub fn ctor(&self) -> &Body {
        &self.ctor
    }

    /// Body for the method at `index` in dispatch-table order.
    pub fn method_body(&self, index: usize) -> Option<&Body> {
        self.methods.get(index)
    }

    /// Signature of the method at `index`.
    pub fn method_sig(&self, index: usize) -> Option<&MethodSig> {
        self.interface.methods().get(index)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Dispatch-table index for a method name.
    pub fn method_index(&self, name: &str) -> Option<usize> {
        self.interface.method_index(name)
    }
}

/// The isolated, throwaway generation container for one `synthesize`
/// call. Collects member bodies, then finalizes them into a
/// [`SynthType`] or fails without yielding anything usable.
pub struct TypeAssembler {
    interface: InterfaceDesc,
    ctor: Option<Body>,
    methods: Vec<Body>,
}

impl TypeAssembler {
    /// Open a fresh container for one interface.
    pub fn new(interface: InterfaceDesc) -> Self {
        Self {
            interface,
            ctor: None,
            methods: Vec::new(),
        }
    }

    /// Register the constructor body.
    pub fn set_ctor(&mut self, body: Body) {
        self.ctor = Some(body);
    }

    /// Register the next method body, in declaration order.
    pub fn add_method(&mut self, body: Body) {
        self.methods.push(body);
    }

    /// Finalize into an immutable [`SynthType`].
    ///
    /// Fails when the container is structurally inconsistent:
    /// missing constructor, method count diverging from the
    /// descriptor, a body whose arity disagrees with its signature, or
    /// a forwarding call aimed outside the dispatch table.
    pub fn finalize(self) -> SynthResult<SynthType> {
        let ctor = self
            .ctor
            .ok_or_else(|| SynthError::Internal("no constructor registered".to_string()))?;
        if ctor.argc() != 1 {
            return Err(SynthError::Internal(format!(
                "constructor takes {} arguments, expected 1",
                ctor.argc()
            )));
        }

        let declared = self.interface.method_count();
        if self.methods.len() != declared {
            return Err(SynthError::Internal(format!(
                "{} method bodies registered for {} declared methods",
                self.methods.len(),
                declared
            )));
        }

        for (index, (sig, body)) in self
            .interface
            .methods()
            .iter()
            .zip(&self.methods)
            .enumerate()
        {
            if body.argc() as usize != sig.arity() {
                return Err(SynthError::Internal(format!(
                    "body {index} takes {} arguments but `{sig}` declares {}",
                    body.argc(),
                    sig.arity()
                )));
            }
            for inst in body.insts() {
                if let Inst::CallVirtual { method, .. } = inst {
                    if *method as usize >= declared {
                        return Err(SynthError::Internal(format!(
                            "body {index} forwards to method {method}, table has {declared}"
                        )));
                    }
                }
            }
        }

        Ok(SynthType {
            interface: self.interface,
            ctor,
            methods: self.methods,
        })
    }
}

/// Synthesize the type for one interface descriptor.
///
/// Walks the methods in declaration order, emits the constructor and
/// one body per method, and finalizes. Any malformed member fails the
/// whole call.
pub fn synthesize(interface: &InterfaceDesc) -> SynthResult<Arc<SynthType>> {
    let mut assembler = TypeAssembler::new(interface.clone());

    assembler.set_ctor(member::synthesize_ctor()?);

    for (index, sig) in interface.methods().iter().enumerate() {
        assembler.add_method(member::synthesize_method(sig, index as u16)?);
    }

    Ok(Arc::new(assembler.finalize()?))
}
