//! Integration tests for enabling and disabling extensions.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use hookhub_core::config::extension::ExtensionConfig;
use hookhub_core::error::ErrorKind;
use hookhub_extension::hooks::template::render_template_hooks;
use hookhub_extension::host::{DataGrid, MiniJinjaRenderer, RenderContext};
use hookhub_extension::prelude::*;
use hookhub_extension::ExtensionManager;

use helpers::TestExtension;

fn manager(prefix: &str) -> ExtensionManager {
    ExtensionManager::new(&ExtensionConfig {
        enabled: Vec::new(),
        url_prefix: prefix.to_string(),
    })
}

#[test]
fn test_url_hook_mounts_and_unmounts_routes() {
    let manager = manager("/");
    let ctx = manager
        .enable(TestExtension::new("foo", |ctx| {
            UrlHook::attach(ctx, vec![UrlPattern::named("/ext/foo/", "foo-index")])?;
            Ok(())
        }))
        .unwrap();

    let matched = manager.dynamic_urls().resolve("/ext/foo/").unwrap();
    assert_eq!(matched.url_name.as_deref(), Some("foo-index"));

    let hook = ctx.hooks().pop().unwrap();
    hook.shutdown().unwrap();

    let err = manager.dynamic_urls().resolve("/ext/foo/").unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    assert!(manager.host().url_hooks.is_empty());

    // A second shutdown is caller misuse.
    assert!(hook.shutdown().unwrap_err().is(ErrorKind::Logic));

    // Disabling skips the hook that was already shut down.
    manager.disable("foo").unwrap();
}

#[test]
fn test_every_hook_kind_is_released_on_disable() {
    let manager = manager("/");
    let grid = Arc::new(DataGrid::new("dashboard", vec![Column::new("summary", "Summary")]));
    let signal = Arc::new(Signal::new("review_published"));

    let ext_grid = grid.clone();
    let ext_signal = signal.clone();
    manager
        .enable(TestExtension::new("reviews", move |ctx| {
            UrlHook::attach(ctx, vec![UrlPattern::named("/reviews/{id}/", "review-detail")])?;
            TemplateHook::attach(ctx, "sidebar", "reviews.html", UrlFilter::any())?;
            DataGridColumnsHook::attach(
                ctx,
                ext_grid.clone(),
                vec![Column::new("reviews", "Reviews").sortable()],
            )?;
            let callback: SignalCallback = Arc::new(|_event: &SignalEvent| {});
            SignalHook::attach(ctx, ext_signal.clone(), callback, None)?;
            Ok(())
        }))
        .unwrap();

    let matched = manager.dynamic_urls().resolve("/reviews/42/").unwrap();
    assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));
    assert_eq!(grid.columns().len(), 2);
    assert_eq!(signal.receiver_count(), 1);

    manager.disable("reviews").unwrap();

    let host = manager.host();
    assert!(host.url_hooks.is_empty());
    assert!(host.template_hooks.is_empty());
    assert!(host.datagrid_hooks.is_empty());
    assert!(host.signal_hooks.is_empty());
    assert!(host.template_hooks_by_name("sidebar").is_empty());
    assert!(manager.dynamic_urls().is_empty());
    assert_eq!(grid.columns(), vec![Column::new("summary", "Summary")]);
    assert_eq!(signal.receiver_count(), 0);
}

#[test]
fn test_template_hooks_keep_attach_order() {
    let manager = manager("/");
    let ctx = manager
        .enable(TestExtension::new("panels", |ctx| {
            for template in ["a.html", "b.html", "c.html"] {
                TemplateHook::attach(ctx, "sidebar", template, UrlFilter::any())?;
            }
            Ok(())
        }))
        .unwrap();

    let names = |manager: &ExtensionManager| -> Vec<String> {
        manager
            .host()
            .template_hooks_by_name("sidebar")
            .iter()
            .map(|h| h.template_name().to_string())
            .collect()
    };
    assert_eq!(names(&manager), vec!["a.html", "b.html", "c.html"]);

    ctx.hooks()[1].shutdown().unwrap();
    assert_eq!(names(&manager), vec!["a.html", "c.html"]);
}

#[test]
fn test_template_rendering_at_insertion_point() {
    let manager = manager("/");
    manager
        .enable(TestExtension::new("banner", |ctx| {
            TemplateHook::attach(ctx, "header", "everywhere.html", UrlFilter::any())?;
            TemplateHook::attach(ctx, "header", "page-a.html", UrlFilter::only(["page-a"]))?;
            Ok(())
        }))
        .unwrap();

    let mut renderer = MiniJinjaRenderer::new();
    renderer
        .add_template("everywhere.html", "[{{ extension.name }}:{{ user }}]")
        .unwrap();
    renderer.add_template("page-a.html", "[page-a]").unwrap();

    let mut context = RenderContext::new();
    context.insert("user", json!("alice"));

    let host = manager.host();
    let on_a =
        render_template_hooks(host, "header", Some("page-a"), &renderer, &mut context).unwrap();
    assert_eq!(on_a, "[BANNER:alice][page-a]");

    let on_b =
        render_template_hooks(host, "header", Some("page-b"), &renderer, &mut context).unwrap();
    assert_eq!(on_b, "[BANNER:alice]");

    assert!(context.get("extension").is_none());
    assert_eq!(context.depth(), 1);
}

#[test]
fn test_applies_to_allow_list() {
    let manager = manager("/");
    let ctx = manager
        .enable(TestExtension::new("filtered", |ctx| {
            TemplateHook::attach(ctx, "footer", "f.html", UrlFilter::only(["page-a"]))?;
            Ok(())
        }))
        .unwrap();
    assert_eq!(ctx.hooks().len(), 1);

    let hook = manager.host().template_hooks_by_name("footer").remove(0);
    assert!(hook.applies_to(Some("page-a")));
    assert!(!hook.applies_to(Some("page-b")));
    assert!(!hook.applies_to(Some("")));
    assert!(!hook.applies_to(None));
}

#[test]
fn test_duplicate_signal_subscriptions() {
    let manager = manager("/");
    let signal = Arc::new(Signal::new("comment_posted"));
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    let callback: SignalCallback = Arc::new(move |_event: &SignalEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let ext_signal = signal.clone();
    let ctx = manager
        .enable(TestExtension::new("notify", move |ctx| {
            SignalHook::attach(ctx, ext_signal.clone(), callback.clone(), None)?;
            SignalHook::attach(ctx, ext_signal.clone(), callback.clone(), None)?;
            Ok(())
        }))
        .unwrap();
    assert_eq!(signal.receiver_count(), 2);

    ctx.hooks()[0].shutdown().unwrap();
    assert_eq!(signal.receiver_count(), 1);

    assert_eq!(signal.send("comment", json!({"id": 7})), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_column_collision_rolls_back_extension() {
    let manager = manager("/ext/");
    let grid = Arc::new(DataGrid::new("dashboard", vec![Column::new("summary", "Summary")]));

    let ext_grid = grid.clone();
    let err = manager
        .enable(TestExtension::new("clash", move |ctx| {
            UrlHook::attach(ctx, vec![UrlPattern::new("/clash/")])?;
            DataGridColumnsHook::attach(
                ctx,
                ext_grid.clone(),
                vec![Column::new("extra", "Extra"), Column::new("summary", "Dup")],
            )?;
            Ok(())
        }))
        .unwrap_err();

    assert!(err.is(ErrorKind::Configuration));
    assert!(!manager.is_enabled("clash"));
    assert!(manager.dynamic_urls().is_empty());
    assert!(manager.host().url_hooks.is_empty());
    assert_eq!(grid.columns(), vec![Column::new("summary", "Summary")]);
}
