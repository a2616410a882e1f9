//! HookHub: extension hook registry and web API auth chain host.
//!
//! Main entry point that loads configuration, enables the configured
//! extensions and resolves the auth backend chain.

mod builtin;

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use hookhub_auth::{AuthBackendChain, BackendRegistry, MemoryIdentityProvider};
use hookhub_core::config::AppConfig;
use hookhub_core::error::AppError;
use hookhub_extension::ExtensionManager;

#[tokio::main]
async fn main() {
    let env = std::env::var("HOOKHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Loaded configuration (env: {})", env);

    if let Err(e) = run(config).await {
        tracing::error!("HookHub error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting HookHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Auth backend chain ───────────────────────────────
    let provider = Arc::new(MemoryIdentityProvider::new());
    let auth_chain = Arc::new(AuthBackendChain::new(
        config.auth.clone(),
        BackendRegistry::new(),
        provider,
    ));

    // Unknown backend ids abort startup.
    for (header, scheme) in auth_chain.challenge_headers()? {
        tracing::info!(header = %header, scheme = %scheme, "Auth challenge registered");
    }

    // ── Step 2: Extensions ───────────────────────────────────────
    let manager = ExtensionManager::new(&config.extensions);

    for extension_id in &config.extensions.enabled {
        let extension = builtin::lookup(extension_id).ok_or_else(|| {
            AppError::configuration(format!("Unknown extension '{extension_id}'"))
        })?;
        manager.enable(extension)?;
    }

    tracing::info!(
        extensions = manager.enabled_extensions().len(),
        routes = manager.dynamic_urls().len(),
        url_prefix = %manager.dynamic_urls().prefix(),
        "HookHub ready"
    );

    // ── Step 3: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, disabling extensions...");
    manager.disable_all()?;

    tracing::info!("HookHub shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
