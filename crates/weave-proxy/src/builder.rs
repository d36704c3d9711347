//! The fluent builder and the proxy handle it produces.

use std::sync::Arc;

use weave_runtime::{CallError, CallResult, Interpreter, WrapperInstance};
use weave_synth::{SynthType, TypeCache};
use weave_types::{Hook, InterfaceDesc, Target, TargetError, Value};

use crate::config::ProxyConfig;
use crate::error::BuildError;

/// Collects the interface, the hook configuration, and a type cache;
/// `build` turns them into a [`Proxy`] bound to one target.
///
/// Each fluent call replaces the corresponding hook registration.
/// `build` may be called any number of times: proxies are independent,
/// and the synthesized type is shared through the cache.
pub struct ProxyBuilder {
    interface: InterfaceDesc,
    config: ProxyConfig,
    cache: TypeCache,
}

impl ProxyBuilder {
    /// Start a builder for one interface, with no hooks and a private
    /// type cache.
    pub fn for_interface(interface: InterfaceDesc) -> Self {
        Self {
            interface,
            config: ProxyConfig::new(),
            cache: TypeCache::new(),
        }
    }

    /// Register the before-hook, replacing any previous registration.
    pub fn before(mut self, hook: Hook) -> Self {
        self.config = self.config.with_before(hook);
        self
    }

    /// Register the after-hook, replacing any previous registration.
    pub fn after(mut self, hook: Hook) -> Self {
        self.config = self.config.with_after(hook);
        self
    }

    /// Share a type cache with other builders.
    pub fn with_cache(mut self, cache: TypeCache) -> Self {
        self.cache = cache;
        self
    }

    /// Synthesize (or reuse) the type, bind `target` and the currently
    /// registered hooks into a fresh wrapper, and return the proxy.
    pub fn build(&self, target: Arc<dyn Target>) -> Result<Proxy, BuildError> {
        let ty = self.cache.get_or_synthesize(&self.interface)?;

        let mut wrapper = WrapperInstance::new();
        let interp = Interpreter::new();
        interp.construct(ty.ctor(), &mut wrapper, target)?;
        wrapper.bind_hooks(self.config.before().cloned(), self.config.after().cloned());

        Ok(Proxy {
            ty,
            wrapper,
            interp,
        })
    }
}

/// A built proxy, typed as the interface it was synthesized for.
///
/// `Proxy` implements [`Target`] itself, so it can stand wherever the
/// original target stood. The wrapper slots are set once at build
/// time and read-only afterward; no lock is held while a hook or the
/// target runs, so hooks may call back into the same proxy and
/// concurrent calls proceed independently.
pub struct Proxy {
    ty: Arc<SynthType>,
    wrapper: WrapperInstance,
    interp: Interpreter,
}

impl Proxy {
    /// The interface this proxy implements.
    pub fn interface(&self) -> &InterfaceDesc {
        self.ty.interface()
    }

    /// The shared synthesized type backing this proxy.
    pub fn synth_type(&self) -> &Arc<SynthType> {
        &self.ty
    }

    /// Invoke an interface method: before-hook phase, forwarded call,
    /// after-hook phase, forwarded result.
    pub fn call(&self, method: &str, args: &[Value]) -> CallResult<Value> {
        let index = self
            .ty
            .method_index(method)
            .ok_or_else(|| CallError::UnknownMethod(method.to_string()))?;
        let body = self
            .ty
            .method_body(index)
            .ok_or_else(|| CallError::Fault(format!("no body at index {index}")))?;

        self.interp
            .invoke(self.ty.interface(), index, body, &self.wrapper, args)
    }

    /// Absorbed hook-failure diagnostics, in call order.
    pub fn diagnostics(&self) -> Vec<String> {
        self.interp.diagnostics()
    }
}

impl Target for Proxy {
    /// Forward through the proxy machinery, so a proxy can be proxied
    /// or used anywhere a target is expected. Non-target call errors
    /// (unknown method, arity) surface as target errors here.
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, TargetError> {
        self.call(method, args).map_err(|err| match err {
            CallError::Target(inner) => inner,
            other => TargetError::new(other.to_string()),
        })
    }
}
