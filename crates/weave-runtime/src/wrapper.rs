//! The wrapper data holder: the fixed base shape every synthesized
//! type reads at call time.

use std::sync::Arc;
use weave_types::{Hook, Target};

/// One wrapper instance: a target slot and two optional hook slots.
///
/// Constructed empty; the synthesized constructor body stores the
/// target, and the façade binds the hooks once at build time. From the
/// proxy's perspective the slots are read-only afterward — the storage
/// is technically mutable, but nothing mutates it after construction.
#[derive(Default)]
pub struct WrapperInstance {
    target: Option<Arc<dyn Target>>,
    before_hook: Option<Hook>,
    after_hook: Option<Hook>,
}

impl WrapperInstance {
    /// A wrapper with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&Arc<dyn Target>> {
        self.target.as_ref()
    }

    pub fn before_hook(&self) -> Option<&Hook> {
        self.before_hook.as_ref()
    }

    pub fn after_hook(&self) -> Option<&Hook> {
        self.after_hook.as_ref()
    }

    pub(crate) fn set_target(&mut self, target: Arc<dyn Target>) {
        self.target = Some(target);
    }

    pub(crate) fn set_before_hook(&mut self, hook: Option<Hook>) {
        self.before_hook = hook;
    }

    pub(crate) fn set_after_hook(&mut self, hook: Option<Hook>) {
        self.after_hook = hook;
    }

    /// Bind both hook slots. Called once by the façade after
    /// construction; a `None` slot is simply skipped at call time.
    pub fn bind_hooks(&mut self, before: Option<Hook>, after: Option<Hook>) {
        self.set_before_hook(before);
        self.set_after_hook(after);
    }
}
