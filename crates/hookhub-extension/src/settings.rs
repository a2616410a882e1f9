//! Per-extension settings with defaults declared by the extension.

use std::sync::RwLock;

use serde_json::{Map, Value};
use tracing::debug;

/// Settings of one extension.
///
/// Reads fall back to the extension's default settings for keys that were
/// never set.
#[derive(Debug, Default)]
pub struct ExtensionSettings {
    defaults: Map<String, Value>,
    values: RwLock<Map<String, Value>>,
}

impl ExtensionSettings {
    /// Creates settings holding only the given defaults.
    pub fn new(defaults: Map<String, Value>) -> Self {
        Self {
            defaults,
            values: RwLock::new(Map::new()),
        }
    }

    /// Returns the value for `key`, or its default.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .or_else(|| self.defaults.get(key))
            .cloned()
    }

    /// Returns whether `key` was set or has a default.
    pub fn contains(&self, key: &str) -> bool {
        self.defaults.contains_key(key)
            || self
                .values
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .contains_key(key)
    }

    /// Sets `key`, returning the previously set value.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        debug!(key = %key, "Extension setting changed");
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, value)
    }

    /// Clears a set value so the default applies again.
    pub fn reset(&self, key: &str) -> Option<Value> {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key)
    }

    /// Returns the default settings.
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Returns defaults overlaid with every set value.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut merged = self.defaults.clone();
        for (key, value) in self.values.read().unwrap_or_else(|e| e.into_inner()).iter() {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defaults() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("page_size".to_string(), json!(25));
        map
    }

    #[test]
    fn test_get_falls_back_to_default() {
        let settings = ExtensionSettings::new(defaults());
        assert_eq!(settings.get("page_size"), Some(json!(25)));
        assert!(settings.get("missing").is_none());
        assert!(settings.contains("page_size"));
        assert!(!settings.contains("missing"));
    }

    #[test]
    fn test_set_overrides_until_reset() {
        let settings = ExtensionSettings::new(defaults());
        assert!(settings.set("page_size", json!(50)).is_none());
        assert_eq!(settings.get("page_size"), Some(json!(50)));
        assert_eq!(settings.defaults().get("page_size"), Some(&json!(25)));

        assert_eq!(settings.reset("page_size"), Some(json!(50)));
        assert_eq!(settings.get("page_size"), Some(json!(25)));
    }

    #[test]
    fn test_to_map_overlays_values() {
        let settings = ExtensionSettings::new(defaults());
        settings.set("theme", json!("dark"));
        let map = settings.to_map();
        assert_eq!(map.get("page_size"), Some(&json!(25)));
        assert_eq!(map.get("theme"), Some(&json!("dark")));
    }
}
