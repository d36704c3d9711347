//! Immutable proxy configuration.

use weave_types::Hook;

/// The hook pair a proxy is built with.
///
/// A plain value object: the builder's fluent methods replace whole
/// configurations rather than mutating shared registration state, so a
/// config captured by one `build` call can never be changed by a later
/// registration.
#[derive(Clone, Default)]
pub struct ProxyConfig {
    before: Option<Hook>,
    after: Option<Hook>,
}

impl ProxyConfig {
    /// No hooks registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the before-hook.
    pub fn with_before(self, hook: Hook) -> Self {
        Self {
            before: Some(hook),
            ..self
        }
    }

    /// Replace the after-hook.
    pub fn with_after(self, hook: Hook) -> Self {
        Self {
            after: Some(hook),
            ..self
        }
    }

    pub fn before(&self) -> Option<&Hook> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Hook> {
        self.after.as_ref()
    }
}
