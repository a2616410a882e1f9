//! Prelude for convenient imports when writing extensions.

pub use hookhub_core::result::AppResult;

pub use crate::extension::{Extension, ExtensionContext};
pub use crate::hooks::{
    AppliesTo, DataGridColumnsHook, ExtensionHook, SignalHook, TemplateHook, UrlFilter, UrlHook,
};
pub use crate::host::{Column, ColumnRegistry, Signal, SignalCallback, SignalEvent, UrlPattern};
pub use crate::info::ExtensionInfo;
pub use crate::js::JsExtension;

pub use crate::extension_info;
