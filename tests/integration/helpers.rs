//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use uuid::Uuid;

use hookhub_auth::backend::AuthHeaders;
use hookhub_auth::{
    AuthBackend, AuthDecision, AuthOutcome, AuthRequest, AuthUser, Credentials, IdentityProvider,
};
use hookhub_core::result::AppResult;
use hookhub_extension::{Extension, ExtensionContext, ExtensionInfo};

type InitFn = dyn Fn(&ExtensionContext) -> AppResult<()> + Send + Sync;

/// Extension whose `initialize` runs a closure.
pub struct TestExtension {
    info: ExtensionInfo,
    init: Box<InitFn>,
}

impl TestExtension {
    /// Create an extension with the given id and initializer
    pub fn new<F>(id: &str, init: F) -> Arc<Self>
    where
        F: Fn(&ExtensionContext) -> AppResult<()> + Send + Sync + 'static,
    {
        Arc::new(Self {
            info: ExtensionInfo::new(id, id.to_uppercase(), "1.0.0"),
            init: Box::new(init),
        })
    }
}

impl fmt::Debug for TestExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestExtension")
            .field("id", &self.info.id)
            .finish()
    }
}

impl Extension for TestExtension {
    fn info(&self) -> ExtensionInfo {
        self.info.clone()
    }

    fn initialize(&self, ctx: &ExtensionContext) -> AppResult<()> {
        (self.init)(ctx)
    }
}

/// Build a Basic `Authorization` header value
pub fn basic_header(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

/// Identity provider accepting `password` for every username
#[derive(Debug, Default)]
pub struct CountingProvider {
    pub validations: AtomicUsize,
}

impl CountingProvider {
    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for CountingProvider {
    async fn validate(&self, username: &str, password: &str) -> AppResult<Option<AuthUser>> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        Ok((password == "password").then(|| AuthUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_active: true,
        }))
    }
}

/// Backend recognizing `Authorization: ApiKey <key>`; records every call.
#[derive(Debug)]
pub struct ApiKeyBackend {
    pub provider: Arc<dyn IdentityProvider>,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AuthBackend for ApiKeyBackend {
    fn www_auth_scheme(&self) -> String {
        "ApiKey".to_string()
    }

    fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    fn get_credentials(&self, request: &AuthRequest) -> Option<Credentials> {
        let key = request.authorization()?.strip_prefix("ApiKey ")?;
        Some(Credentials {
            username: key.to_string(),
            password: String::new(),
        })
    }

    fn auth_headers(&self, _request: &AuthRequest) -> AuthHeaders {
        vec![("X-Auth-Scheme".to_string(), "ApiKey".to_string())]
    }

    async fn authenticate(&self, request: &mut AuthRequest) -> AppResult<AuthOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match self.get_credentials(request) {
            Some(creds) if creds.username == "valid-key" => {
                let mut decision = AuthDecision::success();
                decision.headers = self.auth_headers(request);
                AuthOutcome::Decided(decision)
            }
            Some(_) => AuthOutcome::Decided(AuthDecision::failure().with_message("Unknown API key")),
            None => AuthOutcome::Decline,
        })
    }
}
