//! weave façade: fluent proxy configuration and construction.
//!
//! ```no_run
//! use std::sync::Arc;
//! use weave_proxy::{hook, InterfaceDesc, MethodSig, ProxyBuilder, Value, ValueType};
//! # use weave_proxy::{Target, TargetError};
//! # struct Worker;
//! # impl Target for Worker {
//! #     fn invoke(&self, _m: &str, _a: &[Value]) -> Result<Value, TargetError> {
//! #         Ok(Value::Unit)
//! #     }
//! # }
//!
//! let desc = InterfaceDesc::new(
//!     "IWorker",
//!     vec![MethodSig::new("report", vec![ValueType::Int], ValueType::Unit)],
//! )?;
//! let proxy = ProxyBuilder::for_interface(desc)
//!     .before(hook(|| {
//!         println!("pre action");
//!         Ok(())
//!     }))
//!     .build(Arc::new(Worker))?;
//! proxy.call("report", &[Value::Int(7)])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! `build` may be called repeatedly on one builder: every call yields
//! an independent proxy, and the synthesized type is shared through
//! the builder's type cache.

mod builder;
mod config;
mod error;

pub use builder::{Proxy, ProxyBuilder};
pub use config::ProxyConfig;
pub use error::BuildError;

pub use weave_runtime::CallError;
pub use weave_types::{
    hook, Hook, HookError, InterfaceDesc, MethodSig, Target, TargetError, Value, ValueType,
};
