//! Hook system: the base contract, the per-kind registry and the built-in
//! hook kinds.

pub mod applies_to;
pub mod base;
pub mod datagrid;
pub mod registry;
pub mod signal;
pub mod template;
pub mod url;

pub use applies_to::{AppliesTo, UrlFilter};
pub use base::{ExtensionHook, HookKind, HookState};
pub use datagrid::DataGridColumnsHook;
pub use registry::HookPoint;
pub use signal::SignalHook;
pub use template::{
    EXTENSION_CONTEXT_KEY, TemplateHook, TemplateIndex, render_template_hooks,
    render_template_hooks_for,
};
pub use url::UrlHook;
