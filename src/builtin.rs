//! Extensions compiled into the `hookhub` binary.

use std::sync::Arc;

use hookhub_extension::prelude::*;

/// Mounts the web API account login/logout routes.
#[derive(Debug, Default)]
pub struct AccountExtension;

impl Extension for AccountExtension {
    fn info(&self) -> ExtensionInfo {
        extension_info!(
            id: "account",
            name: "Account",
            version: env!("CARGO_PKG_VERSION"),
            description: "Web API account login and logout routes",
            author: "HookHub Team"
        )
    }

    fn initialize(&self, ctx: &ExtensionContext) -> AppResult<()> {
        UrlHook::attach(
            ctx,
            vec![
                UrlPattern::named("/account/login/", "account-login"),
                UrlPattern::named("/account/logout/", "account-logout"),
            ],
        )?;
        Ok(())
    }
}

/// Returns the built-in extension with this id.
pub fn lookup(extension_id: &str) -> Option<Arc<dyn Extension>> {
    match extension_id {
        "account" => Some(Arc::new(AccountExtension)),
        _ => None,
    }
}
