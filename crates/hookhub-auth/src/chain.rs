//! Configured, lazily built and cached chain of auth backends.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, error, info};

use hookhub_core::config::auth::{AuthConfig, DEFAULT_AUTH_BACKEND};
use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use crate::backend::{AuthBackend, AuthHeaders, AuthOutcome};
use crate::basic::BasicAuthBackend;
use crate::identity::IdentityProvider;
use crate::request::{AuthRequest, WWW_AUTHENTICATE_HEADER};

/// Constructs a backend from configuration.
pub type BackendFactory =
    Arc<dyn Fn(&AuthConfig, Arc<dyn IdentityProvider>) -> Arc<dyn AuthBackend> + Send + Sync>;

/// Maps backend identifiers to factories.
#[derive(Clone)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Creates a registry with the built-in Basic backend registered under
    /// [`DEFAULT_AUTH_BACKEND`].
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(DEFAULT_AUTH_BACKEND, |config, provider| {
            Arc::new(BasicAuthBackend::from_config(config, provider))
        });
        registry
    }

    /// Creates a registry with no backends.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a factory, replacing any previous one for `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&AuthConfig, Arc<dyn IdentityProvider>) -> Arc<dyn AuthBackend>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
    }

    /// Returns whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Returns the registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Builds the configured backends in order.
    ///
    /// Fails on the first identifier with no registered factory.
    pub fn resolve(
        &self,
        config: &AuthConfig,
        provider: &Arc<dyn IdentityProvider>,
    ) -> AppResult<Vec<Arc<dyn AuthBackend>>> {
        config
            .backend_ids()
            .iter()
            .map(|id| {
                let factory = self.factories.get(id).ok_or_else(|| {
                    error!(backend = %id, "Unknown web API auth backend");
                    AppError::configuration(format!(
                        "Error importing web API auth backend '{id}': no such backend is registered"
                    ))
                })?;
                Ok(factory(config, provider.clone()))
            })
            .collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

/// Ordered auth backends, built from configuration on first use and
/// reused until [`reset`](Self::reset).
///
/// Reads take a shared lock; only building takes the write lock.
#[derive(Debug)]
pub struct AuthBackendChain {
    registry: BackendRegistry,
    provider: Arc<dyn IdentityProvider>,
    config: RwLock<AuthConfig>,
    cached: RwLock<Option<Arc<[Arc<dyn AuthBackend>]>>>,
    rebuilds: AtomicU64,
}

impl AuthBackendChain {
    /// Creates an unbuilt chain.
    pub fn new(
        config: AuthConfig,
        registry: BackendRegistry,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            registry,
            provider,
            config: RwLock::new(config),
            cached: RwLock::new(None),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Returns the backends, building and caching them if needed.
    pub fn backends(&self) -> AppResult<Arc<[Arc<dyn AuthBackend>]>> {
        if let Some(backends) = self
            .cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            return Ok(backends.clone());
        }

        let mut cached = self.cached.write().unwrap_or_else(|e| e.into_inner());
        if let Some(backends) = cached.as_ref() {
            return Ok(backends.clone());
        }

        let config = self
            .config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let backends: Arc<[Arc<dyn AuthBackend>]> =
            self.registry.resolve(&config, &self.provider)?.into();

        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        info!(
            backends = ?config.backend_ids(),
            "Web API auth backends loaded"
        );

        *cached = Some(backends.clone());
        Ok(backends)
    }

    /// Drops the cached backends; the next read rebuilds them.
    pub fn reset(&self) {
        self.cached
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        debug!("Web API auth backends reset");
    }

    /// Replaces the configuration and resets the cache.
    pub fn update_config(&self, config: AuthConfig) {
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        self.reset();
    }

    /// Returns how many times the chain has been built.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Returns the identity provider backends validate against.
    pub fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Authenticates a request carrying an `Authorization` header.
    ///
    /// Backends are tried in order until one decides. A request without
    /// the header, or one every backend declines, yields
    /// [`AuthOutcome::Decline`].
    pub async fn authenticate(&self, request: &mut AuthRequest) -> AppResult<AuthOutcome> {
        if request.authorization().is_none() {
            return Ok(AuthOutcome::Decline);
        }

        for backend in self.backends()?.iter() {
            let outcome = backend.authenticate(request).await?;
            if outcome.is_decisive() {
                debug!(
                    scheme = %backend.www_auth_scheme(),
                    success = outcome.is_success(),
                    "Auth backend decided"
                );
                return Ok(outcome);
            }
        }

        Ok(AuthOutcome::Decline)
    }

    /// Returns one `WWW-Authenticate` header per backend, in order.
    pub fn challenge_headers(&self) -> AppResult<AuthHeaders> {
        Ok(self
            .backends()?
            .iter()
            .map(|backend| {
                (
                    WWW_AUTHENTICATE_HEADER.to_string(),
                    backend.www_auth_scheme(),
                )
            })
            .collect())
    }
}
