//! Extension manager: enables and disables extensions atomically.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{error, info, warn};

use hookhub_core::config::extension::ExtensionConfig;
use hookhub_core::error::{AppError, ErrorKind};
use hookhub_core::result::AppResult;

use crate::extension::{Extension, ExtensionContext};
use crate::hooks::applies_to::AppliesTo;
use crate::host::HookHost;
use crate::host::urls::DynamicUrls;
use crate::info::ExtensionInfo;
use crate::js::JsExtension;

/// An enabled extension together with the context owning its hooks.
#[derive(Debug)]
struct EnabledExtension {
    extension: Arc<dyn Extension>,
    context: Arc<ExtensionContext>,
}

/// Manages the enable/disable lifecycle of extensions.
#[derive(Debug)]
pub struct ExtensionManager {
    /// Registries shared by every extension's hooks.
    host: Arc<HookHost>,
    /// URL table extension URL hooks mount patterns in.
    dynamic_urls: Arc<DynamicUrls>,
    /// Extension ID → enabled extension.
    enabled: RwLock<HashMap<String, EnabledExtension>>,
}

impl ExtensionManager {
    /// Creates a manager whose URL table is mounted under the configured
    /// prefix.
    pub fn new(config: &ExtensionConfig) -> Self {
        let dynamic_urls = Arc::new(DynamicUrls::new(config.url_prefix.clone()));
        let host = Arc::new(HookHost::new(dynamic_urls.clone()));

        Self {
            host,
            dynamic_urls,
            enabled: RwLock::new(HashMap::new()),
        }
    }

    /// Enables an extension by running its `initialize`.
    ///
    /// Enabling is all-or-nothing: if `initialize` fails, every hook it had
    /// already attached is shut down before the error is returned.
    pub fn enable(&self, extension: Arc<dyn Extension>) -> AppResult<Arc<ExtensionContext>> {
        let info = extension.info();
        let extension_id = info.id.clone();

        if self.is_enabled(&extension_id) {
            return Err(AppError::conflict(format!(
                "Extension '{extension_id}' is already enabled"
            )));
        }

        for required in extension.requirements() {
            if !self.is_enabled(&required) {
                error!(
                    extension_id = %extension_id,
                    requirement = %required,
                    "Required extension is not enabled"
                );
                return Err(AppError::configuration(format!(
                    "Extension '{extension_id}' requires '{required}', which is not enabled"
                )));
            }
        }

        let context = Arc::new(
            ExtensionContext::new(info.clone(), self.host.clone())
                .with_default_settings(extension.default_settings()),
        );

        if let Err(e) = extension.initialize(&context) {
            error!(extension_id = %extension_id, error = %e, "Extension initialization failed");
            if let Err(rollback) = context.shutdown_hooks() {
                warn!(
                    extension_id = %extension_id,
                    error = %rollback,
                    "Rollback of partially attached hooks failed"
                );
            }
            return Err(e);
        }

        let mut enabled = self.enabled.write().unwrap_or_else(|e| e.into_inner());
        if enabled.contains_key(&extension_id) {
            drop(enabled);
            context.shutdown_hooks()?;
            return Err(AppError::conflict(format!(
                "Extension '{extension_id}' is already enabled"
            )));
        }

        enabled.insert(
            extension_id.clone(),
            EnabledExtension {
                extension,
                context: context.clone(),
            },
        );

        info!(
            extension_id = %extension_id,
            name = %info.name,
            version = %info.version,
            hooks = context.hooks().len(),
            "Extension enabled"
        );

        Ok(context)
    }

    /// Disables an extension, detaching every hook it attached.
    ///
    /// An extension that another enabled extension requires cannot be
    /// disabled.
    pub fn disable(&self, extension_id: &str) -> AppResult<()> {
        let entry = {
            let mut enabled = self.enabled.write().unwrap_or_else(|e| e.into_inner());
            if !enabled.contains_key(extension_id) {
                return Err(AppError::not_found(format!(
                    "Extension '{extension_id}' is not enabled"
                )));
            }

            let dependents: Vec<&str> = enabled
                .iter()
                .filter(|(_, e)| e.extension.requirements().iter().any(|r| r == extension_id))
                .map(|(id, _)| id.as_str())
                .collect();
            if !dependents.is_empty() {
                return Err(AppError::conflict(format!(
                    "Extension '{extension_id}' is required by {}",
                    dependents.join(", ")
                )));
            }

            enabled.remove(extension_id).ok_or_else(|| {
                AppError::not_found(format!("Extension '{extension_id}' is not enabled"))
            })?
        };

        let shutdown = entry.extension.shutdown(&entry.context);

        // Hooks the extension's own shutdown left attached are still ours
        // to release.
        let released = entry.context.shutdown_hooks();
        shutdown.and(released)?;

        info!(extension_id = %extension_id, "Extension disabled");
        Ok(())
    }

    /// Disables every enabled extension.
    ///
    /// Failures are logged and the remaining extensions are still
    /// disabled; the first error is returned.
    pub fn disable_all(&self) -> AppResult<()> {
        let mut first_error: Option<AppError> = None;
        let mut remaining: Vec<String> = self
            .enabled_extensions()
            .into_iter()
            .map(|info| info.id)
            .collect();

        // Extensions still required by others are retried after their
        // dependents are gone.
        while !remaining.is_empty() {
            let before = remaining.len();
            let mut blocked = Vec::new();

            for extension_id in remaining {
                match self.disable(&extension_id) {
                    Ok(()) => {}
                    Err(e) if e.is(ErrorKind::Conflict) => blocked.push(extension_id),
                    Err(e) => {
                        error!(extension_id = %extension_id, error = %e, "Error disabling extension");
                        first_error.get_or_insert(e);
                    }
                }
            }

            if blocked.len() == before {
                for extension_id in &blocked {
                    error!(extension_id = %extension_id, "Extension could not be disabled");
                }
                first_error.get_or_insert_with(|| {
                    AppError::conflict(format!(
                        "Extensions still required: {}",
                        blocked.join(", ")
                    ))
                });
                break;
            }
            remaining = blocked;
        }

        info!("All extensions disabled");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns whether an extension is enabled.
    pub fn is_enabled(&self, extension_id: &str) -> bool {
        self.enabled
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(extension_id)
    }

    /// Returns metadata of every enabled extension, sorted by id.
    pub fn enabled_extensions(&self) -> Vec<ExtensionInfo> {
        let enabled = self.enabled.read().unwrap_or_else(|e| e.into_inner());
        let mut infos: Vec<ExtensionInfo> = enabled
            .values()
            .map(|e| e.context.info().as_ref().clone())
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Returns the context of an enabled extension.
    pub fn context(&self, extension_id: &str) -> Option<Arc<ExtensionContext>> {
        self.enabled
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(extension_id)
            .map(|e| e.context.clone())
    }

    /// Returns the client-side extensions of every enabled extension that
    /// apply to the page `url_name`, ordered by extension id.
    pub fn js_extensions_for(&self, url_name: Option<&str>) -> Vec<(ExtensionInfo, JsExtension)> {
        let enabled = self.enabled.read().unwrap_or_else(|e| e.into_inner());
        let mut found: Vec<(ExtensionInfo, JsExtension)> = enabled
            .values()
            .flat_map(|e| {
                let info = e.context.info().as_ref().clone();
                e.extension
                    .js_extensions()
                    .into_iter()
                    .filter(move |js| js.applies_to(url_name))
                    .map(move |js| (info.clone(), js))
            })
            .collect();
        found.sort_by(|a, b| a.0.id.cmp(&b.0.id));
        found
    }

    /// Returns the shared hook registries.
    pub fn host(&self) -> &Arc<HookHost> {
        &self.host
    }

    /// Returns the dynamic URL table.
    pub fn dynamic_urls(&self) -> &Arc<DynamicUrls> {
        &self.dynamic_urls
    }
}

impl Default for ExtensionManager {
    fn default() -> Self {
        Self::new(&ExtensionConfig::default())
    }
}
