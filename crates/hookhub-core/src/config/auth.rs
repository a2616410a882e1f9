//! Web API authentication configuration.

use serde::{Deserialize, Serialize};

/// Identifier of the backend used when no backends are configured.
pub const DEFAULT_AUTH_BACKEND: &str = "hookhub_auth::basic::BasicAuthBackend";

/// Authentication backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Ordered backend identifiers, tried first to last.
    ///
    /// An empty list falls back to [`DEFAULT_AUTH_BACKEND`].
    #[serde(default)]
    pub backends: Vec<String>,
    /// Realm advertised in the HTTP Basic challenge.
    #[serde(default = "default_realm")]
    pub realm: String,
}

impl AuthConfig {
    /// Returns the configured backend identifiers, or the built-in default
    /// when none are configured.
    pub fn backend_ids(&self) -> Vec<String> {
        if self.backends.is_empty() {
            vec![DEFAULT_AUTH_BACKEND.to_string()]
        } else {
            self.backends.clone()
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backends: Vec::new(),
            realm: default_realm(),
        }
    }
}

fn default_realm() -> String {
    "Web API".to_string()
}
