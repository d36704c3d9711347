//! Interface and method descriptors.
//!
//! An [`InterfaceDesc`] is the contract to proxy: an ordered list of
//! [`MethodSig`]s. Synthesis walks the methods in declaration order, so
//! the dispatch-table index of a method is simply its position here.
//! Descriptors are immutable once constructed and serializable — their
//! canonical JSON bytes are the input to the type-cache fingerprint.

use crate::value::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of parameters a proxied method may declare.
///
/// Argument indices travel through the body IR as `u8`/`u16` operands,
/// so the bound is far below either limit on purpose.
pub const MAX_PARAMS: usize = 64;

/// Errors raised while constructing a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Interface name is empty.
    #[error("interface name must not be empty")]
    EmptyInterfaceName,

    /// Two methods share a name; dispatch is by name, so names are unique.
    #[error("duplicate method name: {0}")]
    DuplicateMethod(String),

    /// A method declares more than [`MAX_PARAMS`] parameters.
    #[error("method {name} declares {count} parameters (max {MAX_PARAMS})")]
    TooManyParams { name: String, count: usize },
}

/// One method's signature: name, ordered parameter types, return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<ValueType>,
    pub ret: ValueType,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, ret: ValueType) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// An interface: a named, ordered set of method signatures.
///
/// Method order is declaration order and is the synthesis order; the
/// position of a signature in `methods` is its dispatch-table index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDesc {
    name: String,
    methods: Vec<MethodSig>,
}

impl InterfaceDesc {
    /// Build a descriptor, validating the method set.
    pub fn new(name: impl Into<String>, methods: Vec<MethodSig>) -> crate::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::EmptyInterfaceName);
        }
        for (i, m) in methods.iter().enumerate() {
            if m.params.len() > MAX_PARAMS {
                return Err(TypeError::TooManyParams {
                    name: m.name.clone(),
                    count: m.params.len(),
                });
            }
            if methods[..i].iter().any(|prev| prev.name == m.name) {
                return Err(TypeError::DuplicateMethod(m.name.clone()));
            }
        }
        Ok(Self { name, methods })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Dispatch-table index of a method, by name.
    pub fn method_index(&self, name: &str) -> Option<usize> {
        self.methods.iter().position(|m| m.name == name)
    }

    /// Signature lookup by name.
    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl fmt::Display for InterfaceDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} methods)", self.name, self.methods.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str) -> MethodSig {
        MethodSig::new(name, vec![ValueType::Int], ValueType::Unit)
    }

    #[test]
    fn test_descriptor_preserves_declaration_order() {
        let desc = InterfaceDesc::new("IWorker", vec![sig("b"), sig("a"), sig("c")]).unwrap();
        let names: Vec<_> = desc.methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(desc.method_index("a"), Some(1));
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let err = InterfaceDesc::new("IWorker", vec![sig("go"), sig("go")]).unwrap_err();
        assert_eq!(err, TypeError::DuplicateMethod("go".to_string()));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = InterfaceDesc::new("", vec![sig("go")]).unwrap_err();
        assert_eq!(err, TypeError::EmptyInterfaceName);
    }

    #[test]
    fn test_too_many_params_rejected() {
        let wide = MethodSig::new("wide", vec![ValueType::Int; MAX_PARAMS + 1], ValueType::Unit);
        let err = InterfaceDesc::new("IWorker", vec![wide]).unwrap_err();
        assert!(matches!(err, TypeError::TooManyParams { count, .. } if count == MAX_PARAMS + 1));
    }

    #[test]
    fn test_method_sig_display() {
        let m = MethodSig::new("report", vec![ValueType::Int], ValueType::Unit);
        assert_eq!(format!("{m}"), "report(int) -> unit");
    }

    #[test]
    fn test_descriptor_json_is_deterministic() {
        let desc = InterfaceDesc::new("IWorker", vec![sig("a"), sig("b")]).unwrap();
        let first = serde_json::to_string(&desc).unwrap();
        for _ in 0..50 {
            let again = serde_json::to_string(&desc).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_descriptor_json_round_trip() {
        let desc = InterfaceDesc::new("IWorker", vec![sig("a")]).unwrap();
        let json = serde_json::to_string(&desc).unwrap();
        let back: InterfaceDesc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }
}
