//! Client-side extension descriptors an extension ships with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hooks::applies_to::AppliesTo;

/// Describes a JavaScript model the host initializes on matching pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsExtension {
    /// Name of the JavaScript model class.
    pub model_class: String,
    /// URL names of the pages it is initialized on. `None` means every page.
    #[serde(default)]
    pub apply_to: Option<Vec<String>>,
    /// Extra data passed to the model instance.
    #[serde(default)]
    pub model_data: Map<String, Value>,
}

impl JsExtension {
    /// Creates a descriptor applying to every page.
    pub fn new(model_class: impl Into<String>) -> Self {
        Self {
            model_class: model_class.into(),
            apply_to: None,
            model_data: Map::new(),
        }
    }

    /// Restricts the descriptor to the given URL names.
    pub fn apply_to<I, S>(mut self, url_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_to = Some(url_names.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a model data entry.
    pub fn with_model_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.model_data.insert(key.into(), value);
        self
    }
}

impl AppliesTo for JsExtension {
    fn applies_to(&self, url_name: Option<&str>) -> bool {
        match &self.apply_to {
            None => true,
            Some(names) => url_name.is_some_and(|name| names.iter().any(|n| n == name)),
        }
    }
}
