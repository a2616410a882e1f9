//! Host-side collaborators hooks attach to, and the [`HookHost`] that
//! owns one registry per hook kind.

pub mod datagrid;
pub mod render;
pub mod signals;
pub mod urls;

use std::fmt;
use std::sync::Arc;

use crate::hooks::datagrid::DataGridColumnsHook;
use crate::hooks::registry::HookPoint;
use crate::hooks::signal::SignalHook;
use crate::hooks::template::{TemplateHook, TemplateIndex};
use crate::hooks::url::UrlHook;

pub use datagrid::{Column, ColumnRegistry, DataGrid};
pub use render::{MiniJinjaRenderer, RenderContext, TemplateRenderer};
pub use signals::{Signal, SignalCallback, SignalEvent};
pub use urls::{DynamicUrls, ResolverMatch, RouteTable, UrlPattern};

/// Process-scoped hook state shared by every extension: the per-kind
/// registries, the template name index and the dynamic URL table.
///
/// Created once by the host and shared through `Arc`.
pub struct HookHost {
    /// Active URL hooks.
    pub url_hooks: HookPoint<UrlHook>,
    /// Active signal hooks.
    pub signal_hooks: HookPoint<SignalHook>,
    /// Active template hooks.
    pub template_hooks: HookPoint<TemplateHook>,
    /// Template hooks grouped by insertion point name.
    pub template_index: TemplateIndex,
    /// Active data-grid column hooks.
    pub datagrid_hooks: HookPoint<DataGridColumnsHook>,
    /// Table extension URL patterns are added to.
    pub dynamic_urls: Arc<dyn RouteTable>,
}

impl HookHost {
    /// Creates empty registries around the given URL table.
    pub fn new(dynamic_urls: Arc<dyn RouteTable>) -> Self {
        Self {
            url_hooks: HookPoint::new("url"),
            signal_hooks: HookPoint::new("signal"),
            template_hooks: HookPoint::new("template"),
            template_index: TemplateIndex::new(),
            datagrid_hooks: HookPoint::new("datagrid_columns"),
            dynamic_urls,
        }
    }

    /// Returns every template hook attached under `name`, in attach order.
    pub fn template_hooks_by_name(&self, name: &str) -> Vec<Arc<TemplateHook>> {
        self.template_index.by_name(name)
    }
}

impl fmt::Debug for HookHost {
    // Hooks hold the host, so only counts are printed here.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookHost")
            .field("url_hooks", &self.url_hooks.len())
            .field("signal_hooks", &self.signal_hooks.len())
            .field("template_hooks", &self.template_hooks.len())
            .field("template_names", &self.template_index.names())
            .field("datagrid_hooks", &self.datagrid_hooks.len())
            .finish()
    }
}
