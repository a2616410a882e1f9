//! Extension trait and the per-extension context that owns its hooks.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use serde_json::{Map, Value};

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use crate::hooks::base::ExtensionHook;
use crate::host::HookHost;
use crate::info::ExtensionInfo;
use crate::js::JsExtension;
use crate::settings::ExtensionSettings;

/// Trait implemented by every extension.
///
/// `initialize` attaches the extension's hooks through the context;
/// `shutdown` detaches them. The default `shutdown` detaches every hook
/// the context still holds.
pub trait Extension: Send + Sync + fmt::Debug {
    /// Returns extension metadata.
    fn info(&self) -> ExtensionInfo;

    /// Settings values used until the extension's settings are changed.
    fn default_settings(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Ids of extensions that must be enabled before this one.
    fn requirements(&self) -> Vec<String> {
        Vec::new()
    }

    /// Client-side extensions initialized on matching pages.
    fn js_extensions(&self) -> Vec<JsExtension> {
        Vec::new()
    }

    /// Called when the extension is enabled.
    fn initialize(&self, ctx: &ExtensionContext) -> AppResult<()>;

    /// Called when the extension is disabled.
    fn shutdown(&self, ctx: &ExtensionContext) -> AppResult<()> {
        ctx.shutdown_hooks()
    }
}

/// Runtime state of one enabled extension. Owns every hook the extension
/// attached.
#[derive(Debug)]
pub struct ExtensionContext {
    info: Arc<ExtensionInfo>,
    host: Arc<HookHost>,
    settings: ExtensionSettings,
    hooks: Mutex<Vec<Arc<dyn ExtensionHook>>>,
}

impl ExtensionContext {
    /// Creates a context with no hooks.
    pub fn new(info: ExtensionInfo, host: Arc<HookHost>) -> Self {
        Self {
            info: Arc::new(info),
            host,
            settings: ExtensionSettings::default(),
            hooks: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the settings with ones backed by `defaults`.
    pub fn with_default_settings(mut self, defaults: Map<String, Value>) -> Self {
        self.settings = ExtensionSettings::new(defaults);
        self
    }

    /// Returns the extension's settings.
    pub fn settings(&self) -> &ExtensionSettings {
        &self.settings
    }

    /// Returns the extension's metadata.
    pub fn info(&self) -> &Arc<ExtensionInfo> {
        &self.info
    }

    /// Returns the shared hook host.
    pub fn host(&self) -> &Arc<HookHost> {
        &self.host
    }

    /// Takes ownership of a freshly attached hook.
    pub fn track(&self, hook: Arc<dyn ExtensionHook>) {
        let mut hooks = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
        debug!(
            extension_id = %self.info.id,
            hook_id = %hook.id(),
            hook_kind = %hook.kind(),
            "Hook tracked"
        );
        hooks.push(hook);
    }

    /// Returns the hooks this extension owns, in attach order.
    pub fn hooks(&self) -> Vec<Arc<dyn ExtensionHook>> {
        self.hooks.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Shuts down every hook that is still initialized.
    ///
    /// Every hook is attempted even if an earlier one fails; the first
    /// error is returned.
    pub fn shutdown_hooks(&self) -> AppResult<()> {
        let hooks: Vec<Arc<dyn ExtensionHook>> = {
            let mut guard = self.hooks.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *guard)
        };

        let mut first_error: Option<AppError> = None;
        let mut detached = 0usize;

        for hook in hooks.iter().filter(|h| h.is_initialized()) {
            match hook.shutdown() {
                Ok(()) => detached += 1,
                Err(e) => {
                    warn!(
                        extension_id = %self.info.id,
                        hook_id = %hook.id(),
                        hook_kind = %hook.kind(),
                        error = %e,
                        "Hook shutdown failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        info!(extension_id = %self.info.id, detached = detached, "Extension hooks shut down");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
