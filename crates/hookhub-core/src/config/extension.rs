//! Extension system configuration.

use serde::{Deserialize, Serialize};

/// Extension system configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extension ids the host enables at startup.
    #[serde(default)]
    pub enabled: Vec<String>,
    /// Parent URL under which extension URL patterns are mounted.
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            url_prefix: default_url_prefix(),
        }
    }
}

fn default_url_prefix() -> String {
    "/".to_string()
}
