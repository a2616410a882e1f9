//! Extension metadata.

use serde::{Deserialize, Serialize};

/// Metadata describing an extension.
///
/// Hooks keep an `Arc<ExtensionInfo>` to name their owner; the owning
/// [`ExtensionContext`](crate::extension::ExtensionContext) is what holds
/// the hooks, never the other way around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    /// Unique extension identifier.
    pub id: String,
    /// Human-readable extension name.
    pub name: String,
    /// Extension version string.
    pub version: String,
    /// Extension description.
    #[serde(default)]
    pub description: String,
    /// Author or maintainer.
    #[serde(default)]
    pub author: String,
}

impl ExtensionInfo {
    /// Creates metadata with only the required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: String::new(),
            author: String::new(),
        }
    }
}
