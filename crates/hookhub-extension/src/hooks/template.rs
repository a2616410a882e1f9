//! Template hook: contributes a rendered template to a named insertion
//! point, optionally only on some pages.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use tracing::{debug, info};

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use super::applies_to::{AppliesTo, UrlFilter};
use super::base::{ExtensionHook, HookKind, HookState};
use crate::extension::ExtensionContext;
use crate::host::HookHost;
use crate::host::render::{RenderContext, TemplateRenderer};
use crate::host::urls::ResolverMatch;

/// Context key the contributing extension is bound to while rendering.
pub const EXTENSION_CONTEXT_KEY: &str = "extension";

/// Template hooks grouped by insertion point name, each group in attach
/// order. Several hooks may share a name.
#[derive(Debug, Default)]
pub struct TemplateIndex {
    by_name: RwLock<IndexMap<String, Vec<Arc<TemplateHook>>>>,
}

impl TemplateIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the hooks attached under `name`; empty if none.
    pub fn by_name(&self, name: &str) -> Vec<Arc<TemplateHook>> {
        self.by_name
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the names that currently have at least one hook.
    pub fn names(&self) -> Vec<String> {
        self.by_name
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    fn insert(&self, hook: Arc<TemplateHook>) {
        let mut by_name = self.by_name.write().unwrap_or_else(|e| e.into_inner());
        by_name.entry(hook.name.clone()).or_default().push(hook);
    }

    fn remove(&self, hook: &TemplateHook) {
        let mut by_name = self.by_name.write().unwrap_or_else(|e| e.into_inner());
        let id = hook.id();

        if let Some(hooks) = by_name.get_mut(&hook.name) {
            hooks.retain(|h| h.id() != id);
            if hooks.is_empty() {
                by_name.shift_remove(&hook.name);
            }
        } else {
            debug!(name = %hook.name, hook_id = %id, "Template hook not indexed");
        }
    }
}

/// Renders `template_name` at the insertion point `name`.
#[derive(Debug)]
pub struct TemplateHook {
    state: HookState,
    host: Arc<HookHost>,
    name: String,
    template_name: String,
    filter: UrlFilter,
}

impl TemplateHook {
    /// Attaches a template to the insertion point `name`, restricted to the
    /// pages in `filter`.
    pub fn attach(
        ctx: &ExtensionContext,
        name: impl Into<String>,
        template_name: impl Into<String>,
        filter: UrlFilter,
    ) -> AppResult<Arc<Self>> {
        let name = name.into();
        let template_name = template_name.into();
        if name.is_empty() || template_name.is_empty() {
            return Err(AppError::configuration(format!(
                "Template hook of extension '{}' needs a name and a template",
                ctx.info().id
            )));
        }

        let hook = Arc::new(Self {
            state: HookState::new(ctx.info().clone()),
            host: ctx.host().clone(),
            name,
            template_name,
            filter,
        });

        hook.host.template_hooks.add_hook(hook.clone());
        hook.host.template_index.insert(hook.clone());
        hook.state.mark_initialized();
        ctx.track(hook.clone());

        info!(
            extension_id = %ctx.info().id,
            hook_id = %hook.id(),
            name = %hook.name,
            template = %hook.template_name,
            "Template hook attached"
        );

        Ok(hook)
    }

    /// Returns the insertion point name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the template rendered by this hook.
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Renders the hook's template.
    ///
    /// The contributing extension is bound under [`EXTENSION_CONTEXT_KEY`]
    /// in a pushed layer that is popped again whether or not rendering
    /// succeeds.
    pub fn render_to_string(
        &self,
        renderer: &dyn TemplateRenderer,
        context: &mut RenderContext,
    ) -> AppResult<String> {
        context.push();
        let result = self.render_scoped(renderer, context);
        context.pop();
        result
    }

    fn render_scoped(
        &self,
        renderer: &dyn TemplateRenderer,
        context: &mut RenderContext,
    ) -> AppResult<String> {
        let extension = serde_json::to_value(self.state.extension().as_ref())?;
        context.insert(EXTENSION_CONTEXT_KEY, extension);
        renderer.render(&self.template_name, context)
    }
}

impl AppliesTo for TemplateHook {
    fn applies_to(&self, url_name: Option<&str>) -> bool {
        self.filter.applies_to(url_name)
    }
}

impl ExtensionHook for TemplateHook {
    fn state(&self) -> &HookState {
        &self.state
    }

    fn kind(&self) -> HookKind {
        HookKind::Template
    }

    fn shutdown(&self) -> AppResult<()> {
        self.state.begin_shutdown(&self.kind())?;
        self.host.template_hooks.remove_hook(self.id());
        self.host.template_index.remove(self);

        info!(
            extension_id = %self.state.extension().id,
            hook_id = %self.id(),
            name = %self.name,
            "Template hook shut down"
        );
        Ok(())
    }
}

/// Renders every hook attached under `name` that applies to `url_name`,
/// concatenated in attach order.
pub fn render_template_hooks(
    host: &HookHost,
    name: &str,
    url_name: Option<&str>,
    renderer: &dyn TemplateRenderer,
    context: &mut RenderContext,
) -> AppResult<String> {
    render_where(host, name, |hook| hook.applies_to(url_name), renderer, context)
}

/// Renders every hook attached under `name` that applies to the resolved
/// request, concatenated in attach order.
pub fn render_template_hooks_for(
    host: &HookHost,
    name: &str,
    resolved: &ResolverMatch,
    renderer: &dyn TemplateRenderer,
    context: &mut RenderContext,
) -> AppResult<String> {
    render_where(
        host,
        name,
        |hook| hook.applies_to_match(resolved),
        renderer,
        context,
    )
}

fn render_where<P>(
    host: &HookHost,
    name: &str,
    applies: P,
    renderer: &dyn TemplateRenderer,
    context: &mut RenderContext,
) -> AppResult<String>
where
    P: Fn(&TemplateHook) -> bool,
{
    let mut output = String::new();
    for hook in host.template_hooks_by_name(name) {
        if applies(&*hook) {
            output.push_str(&hook.render_to_string(renderer, context)?);
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::render::MiniJinjaRenderer;
    use crate::host::urls::DynamicUrls;
    use crate::info::ExtensionInfo;
    use hookhub_core::error::ErrorKind;
    use serde_json::json;

    fn context(host: &Arc<HookHost>, id: &str) -> ExtensionContext {
        ExtensionContext::new(ExtensionInfo::new(id, id.to_uppercase(), "1.0"), host.clone())
    }

    fn host() -> Arc<HookHost> {
        Arc::new(HookHost::new(Arc::new(DynamicUrls::new("/"))))
    }

    /// Renderer that always fails after checking the extension binding.
    struct FailingRenderer;

    impl TemplateRenderer for FailingRenderer {
        fn render(&self, _template_name: &str, context: &RenderContext) -> AppResult<String> {
            assert!(context.get(EXTENSION_CONTEXT_KEY).is_some());
            Err(AppError::template("boom"))
        }
    }

    #[test]
    fn test_by_name_preserves_attach_order() {
        let host = host();
        let ctx = context(&host, "ext");
        let hooks: Vec<_> = (0..3)
            .map(|i| {
                TemplateHook::attach(&ctx, "sidebar", format!("t{i}.html"), UrlFilter::any())
                    .unwrap()
            })
            .collect();
        TemplateHook::attach(&ctx, "footer", "f.html", UrlFilter::any()).unwrap();

        let names: Vec<_> = host
            .template_hooks_by_name("sidebar")
            .iter()
            .map(|h| h.template_name().to_string())
            .collect();
        assert_eq!(names, vec!["t0.html", "t1.html", "t2.html"]);

        hooks[1].shutdown().unwrap();
        let remaining: Vec<_> = host
            .template_hooks_by_name("sidebar")
            .iter()
            .map(|h| h.id())
            .collect();
        assert_eq!(remaining, vec![hooks[0].id(), hooks[2].id()]);
        assert!(host.template_hooks_by_name("missing").is_empty());
        assert_eq!(host.template_hooks.len(), 3);
    }

    #[test]
    fn test_last_hook_removes_name() {
        let host = host();
        let ctx = context(&host, "ext");
        let hook = TemplateHook::attach(&ctx, "sidebar", "t.html", UrlFilter::any()).unwrap();
        hook.shutdown().unwrap();
        assert!(host.template_index.names().is_empty());
        assert!(host.template_hooks.is_empty());
    }

    #[test]
    fn test_applies_to_allow_list() {
        let host = host();
        let ctx = context(&host, "ext");
        let hook =
            TemplateHook::attach(&ctx, "sidebar", "t.html", UrlFilter::only(["page-a"])).unwrap();

        assert!(hook.applies_to(Some("page-a")));
        assert!(!hook.applies_to(Some("page-b")));
        assert!(!hook.applies_to(Some("")));
    }

    #[test]
    fn test_render_binds_extension_and_pops() {
        let host = host();
        let ctx = context(&host, "stats");
        let hook = TemplateHook::attach(&ctx, "sidebar", "side.html", UrlFilter::any()).unwrap();

        let mut renderer = MiniJinjaRenderer::new();
        renderer
            .add_template("side.html", "{{ extension.name }} for {{ user }}")
            .unwrap();

        let mut render_ctx = RenderContext::new();
        render_ctx.insert("user", json!("alice"));

        let output = hook.render_to_string(&renderer, &mut render_ctx).unwrap();
        assert_eq!(output, "STATS for alice");
        assert_eq!(render_ctx.depth(), 1);
        assert!(render_ctx.get(EXTENSION_CONTEXT_KEY).is_none());
    }

    #[test]
    fn test_render_failure_still_pops() {
        let host = host();
        let ctx = context(&host, "ext");
        let hook = TemplateHook::attach(&ctx, "sidebar", "side.html", UrlFilter::any()).unwrap();

        let mut render_ctx = RenderContext::new();
        let err = hook
            .render_to_string(&FailingRenderer, &mut render_ctx)
            .unwrap_err();
        assert!(err.is(ErrorKind::Template));
        assert_eq!(render_ctx.depth(), 1);
    }

    #[test]
    fn test_render_template_hooks_filters_by_page() {
        let host = host();
        let first = context(&host, "a");
        let second = context(&host, "b");
        TemplateHook::attach(&first, "nav", "item.html", UrlFilter::any()).unwrap();
        TemplateHook::attach(&second, "nav", "item.html", UrlFilter::only(["dashboard"])).unwrap();

        let mut renderer = MiniJinjaRenderer::new();
        renderer
            .add_template("item.html", "[{{ extension.id }}]")
            .unwrap();

        let mut render_ctx = RenderContext::new();
        let on_dashboard =
            render_template_hooks(&host, "nav", Some("dashboard"), &renderer, &mut render_ctx)
                .unwrap();
        let elsewhere =
            render_template_hooks(&host, "nav", Some("settings"), &renderer, &mut render_ctx)
                .unwrap();

        assert_eq!(on_dashboard, "[a][b]");
        assert_eq!(elsewhere, "[a]");
    }

    #[test]
    fn test_render_for_resolved_request() {
        let urls = Arc::new(DynamicUrls::new("/"));
        let host = Arc::new(HookHost::new(urls.clone()));
        let ctx = context(&host, "foo");
        crate::hooks::url::UrlHook::attach(
            &ctx,
            vec![
                crate::host::urls::UrlPattern::named("/ext/foo/", "foo-index"),
                crate::host::urls::UrlPattern::named("/ext/bar/", "bar-index"),
            ],
        )
        .unwrap();
        TemplateHook::attach(&ctx, "head", "foo.html", UrlFilter::only(["foo-index"])).unwrap();

        let mut renderer = MiniJinjaRenderer::new();
        renderer.add_template("foo.html", "<foo>").unwrap();
        let mut render_ctx = RenderContext::new();

        let foo = urls.resolve("/ext/foo/").unwrap();
        let bar = urls.resolve("/ext/bar/").unwrap();
        assert_eq!(
            render_template_hooks_for(&host, "head", &foo, &renderer, &mut render_ctx).unwrap(),
            "<foo>"
        );
        assert!(
            render_template_hooks_for(&host, "head", &bar, &renderer, &mut render_ctx)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_empty_name_is_configuration_error() {
        let host = host();
        let ctx = context(&host, "ext");
        let err = TemplateHook::attach(&ctx, "", "t.html", UrlFilter::any()).unwrap_err();
        assert!(err.is(ErrorKind::Configuration));
    }
}
