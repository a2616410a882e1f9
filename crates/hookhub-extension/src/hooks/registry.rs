//! Hook point: the per-kind registry of currently attached hook instances.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use super::base::ExtensionHook;
use crate::ids::HookId;

/// Ordered collection of the active hooks of one kind.
///
/// Each hook kind owns exactly one `HookPoint`, created once by the host
/// and shared with every hook of that kind. Insertion order is attach
/// order; removal keeps the relative order of the remaining hooks.
#[derive(Debug)]
pub struct HookPoint<H: ExtensionHook> {
    /// Name used in log output.
    name: String,
    /// Active hooks in attach order.
    hooks: RwLock<Vec<Arc<H>>>,
}

impl<H: ExtensionHook> HookPoint<H> {
    /// Creates an empty hook point.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Returns the hook point's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a hook to the list of active hooks. A hook already present is
    /// not added twice.
    pub fn add_hook(&self, hook: Arc<H>) {
        let mut hooks = self.hooks.write().unwrap_or_else(|e| e.into_inner());
        let id = hook.id();

        if hooks.iter().any(|h| h.id() == id) {
            warn!(hook_point = %self.name, hook_id = %id, "Hook already registered");
            return;
        }

        hooks.push(hook);
        debug!(hook_point = %self.name, hook_id = %id, active = hooks.len(), "Hook added");
    }

    /// Removes a hook from the list of active hooks.
    ///
    /// Returns `false` if the hook was not present.
    pub fn remove_hook(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.write().unwrap_or_else(|e| e.into_inner());

        match hooks.iter().position(|h| h.id() == id) {
            Some(index) => {
                hooks.remove(index);
                debug!(hook_point = %self.name, hook_id = %id, active = hooks.len(), "Hook removed");
                true
            }
            None => {
                debug!(hook_point = %self.name, hook_id = %id, "Hook not registered");
                false
            }
        }
    }

    /// Returns a snapshot of the active hooks in attach order.
    pub fn hooks(&self) -> Vec<Arc<H>> {
        self.hooks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns whether a hook is currently registered.
    pub fn contains(&self, id: HookId) -> bool {
        self.hooks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|h| h.id() == id)
    }

    /// Returns the number of active hooks.
    pub fn len(&self) -> usize {
        self.hooks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns whether no hooks are active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
