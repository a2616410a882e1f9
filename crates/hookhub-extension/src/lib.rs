//! # hookhub-extension
//!
//! Extension hook registry for HookHub. Provides:
//!
//! - A per-kind hook registry ([`HookPoint`]) and the base hook contract
//! - Built-in hook kinds: URL patterns, signal receivers, named template
//!   insertion points, and data-grid columns
//! - The collaborators those hooks attach to (dynamic URL table, signals,
//!   render context and renderer, data-grid column registry)
//! - Extension settings and client-side extension descriptors
//! - Extension lifecycle and the [`ExtensionManager`] that enables and
//!   disables extensions atomically

pub mod extension;
pub mod hooks;
pub mod host;
pub mod ids;
pub mod info;
pub mod js;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod settings;

pub use extension::{Extension, ExtensionContext};
pub use hooks::{
    AppliesTo, DataGridColumnsHook, ExtensionHook, HookKind, HookPoint, SignalHook, TemplateHook,
    UrlFilter, UrlHook,
};
pub use host::HookHost;
pub use info::ExtensionInfo;
pub use js::JsExtension;
pub use manager::ExtensionManager;
pub use settings::ExtensionSettings;
