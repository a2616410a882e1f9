//! URL hook: mounts an extension's URL patterns in the dynamic URL table.

use std::sync::Arc;

use tracing::info;

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use super::base::{ExtensionHook, HookKind, HookState};
use crate::extension::ExtensionContext;
use crate::host::HookHost;
use crate::host::urls::{RouteTable, UrlPattern};

/// Adds URL patterns while attached and removes exactly those patterns on
/// shutdown.
#[derive(Debug)]
pub struct UrlHook {
    state: HookState,
    host: Arc<HookHost>,
    patterns: Vec<UrlPattern>,
}

impl UrlHook {
    /// Attaches `patterns` on behalf of the extension owning `ctx`.
    pub fn attach(ctx: &ExtensionContext, patterns: Vec<UrlPattern>) -> AppResult<Arc<Self>> {
        if patterns.is_empty() {
            return Err(AppError::configuration(format!(
                "URL hook of extension '{}' has no patterns",
                ctx.info().id
            )));
        }
        for pattern in &patterns {
            pattern.validate()?;
        }

        // Each attach owns fresh pattern identities, even for cloned patterns.
        let patterns: Vec<UrlPattern> = patterns.iter().map(UrlPattern::restamped).collect();

        let hook = Arc::new(Self {
            state: HookState::new(ctx.info().clone()),
            host: ctx.host().clone(),
            patterns,
        });

        hook.host.dynamic_urls.add_patterns(&hook.patterns);
        hook.host.url_hooks.add_hook(hook.clone());
        hook.state.mark_initialized();
        ctx.track(hook.clone());

        info!(
            extension_id = %ctx.info().id,
            hook_id = %hook.id(),
            patterns = hook.patterns.len(),
            "URL hook attached"
        );

        Ok(hook)
    }

    /// Returns the patterns this hook added.
    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }
}

impl ExtensionHook for UrlHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn kind(&self) -> HookKind {
        HookKind::Url
    }

    fn shutdown(&self) -> AppResult<()> {
        self.state.begin_shutdown(&self.kind())?;
        self.host.url_hooks.remove_hook(self.id());
        self.host.dynamic_urls.remove_patterns(&self.patterns);

        info!(
            extension_id = %self.state.extension().id,
            hook_id = %self.id(),
            "URL hook shut down"
        );
        Ok(())
    }
}
