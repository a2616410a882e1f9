//! Render context and template renderer used by template hooks.

use minijinja::Environment;
use serde_json::{Map, Value};
use tracing::debug;

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

/// Layered key/value context passed to a template renderer.
///
/// Bindings are written to the top layer; lookups search from the top
/// down. A hook pushes a layer before rendering and pops it afterwards so
/// its bindings never reach sibling renders.
#[derive(Debug, Clone)]
pub struct RenderContext {
    layers: Vec<Map<String, Value>>,
}

impl RenderContext {
    /// Creates a context with a single empty base layer.
    pub fn new() -> Self {
        Self {
            layers: vec![Map::new()],
        }
    }

    /// Creates a context whose base layer holds `values`.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            layers: vec![values],
        }
    }

    /// Pushes a new empty layer.
    pub fn push(&mut self) {
        self.layers.push(Map::new());
    }

    /// Pops the top layer. The base layer is never popped.
    pub fn pop(&mut self) -> Option<Map<String, Value>> {
        if self.layers.len() > 1 {
            self.layers.pop()
        } else {
            None
        }
    }

    /// Binds `key` in the top layer.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        if let Some(top) = self.layers.last_mut() {
            top.insert(key.into(), value);
        }
    }

    /// Looks up `key`, innermost layer first.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.layers.iter().rev().find_map(|layer| layer.get(key))
    }

    /// Returns the number of layers, base layer included.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Merges all layers into one map, inner layers shadowing outer ones.
    pub fn flatten(&self) -> Map<String, Value> {
        let mut merged = Map::new();
        for layer in &self.layers {
            for (key, value) in layer {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Template rendering collaborator.
pub trait TemplateRenderer: Send + Sync {
    /// Renders the named template with the given context.
    fn render(&self, template_name: &str, context: &RenderContext) -> AppResult<String>;
}

/// [`TemplateRenderer`] backed by a `minijinja` environment.
#[derive(Debug)]
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer with no templates.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        Self { env }
    }

    /// Registers a template under `name`.
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> AppResult<()> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|e| AppError::template(format!("Invalid template '{name}': {e}")))?;
        debug!(template = %name, "Template registered");
        Ok(())
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template_name: &str, context: &RenderContext) -> AppResult<String> {
        let template = self.env.get_template(template_name).map_err(|e| {
            AppError::template(format!("Template '{template_name}' not found: {e}"))
        })?;

        template
            .render(context.flatten())
            .map_err(|e| AppError::template(format!("Failed to render '{template_name}': {e}")))
    }
}
