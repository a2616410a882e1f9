//! Auth backend contract and the shared credential login step.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use hookhub_core::result::AppResult;

use crate::identity::IdentityProvider;
use crate::request::AuthRequest;

/// Response headers as ordered name/value pairs.
pub type AuthHeaders = Vec<(String, String)>;

/// Username/password pair extracted from a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A decisive authentication result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthDecision {
    /// Whether the request is authenticated.
    pub success: bool,
    /// Message for the client. `None` means the default login-failed text.
    pub message: Option<String>,
    /// Extra headers for the response.
    pub headers: AuthHeaders,
}

impl AuthDecision {
    /// A successful decision with no message or headers.
    pub fn success() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A failed decision with no message or headers.
    pub fn failure() -> Self {
        Self::default()
    }

    /// Sets the client message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Result of asking one backend to authenticate a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The backend found no credentials for its scheme; try the next one.
    Decline,
    /// The backend committed to a result.
    Decided(AuthDecision),
}

impl AuthOutcome {
    /// Returns whether this outcome ends the chain.
    pub fn is_decisive(&self) -> bool {
        matches!(self, Self::Decided(_))
    }

    /// Returns whether this outcome is a successful decision.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Decided(decision) if decision.success)
    }
}

/// One web API authentication scheme.
///
/// Implementors usually only provide [`get_credentials`](Self::get_credentials);
/// the default [`authenticate`](Self::authenticate) declines when no
/// credentials are present and otherwise logs in through
/// [`login_with_credentials`].
#[async_trait]
pub trait AuthBackend: Send + Sync + fmt::Debug {
    /// Value advertised in the `WWW-Authenticate` challenge header.
    fn www_auth_scheme(&self) -> String;

    /// Identity provider credentials are validated against.
    fn identity_provider(&self) -> &Arc<dyn IdentityProvider>;

    /// Extracts credentials for this scheme, or `None` to decline.
    fn get_credentials(&self, request: &AuthRequest) -> Option<Credentials>;

    /// Extra headers to add to a successful response.
    fn auth_headers(&self, _request: &AuthRequest) -> AuthHeaders {
        AuthHeaders::new()
    }

    /// Authenticates the request against this backend.
    async fn authenticate(&self, request: &mut AuthRequest) -> AppResult<AuthOutcome> {
        let Some(credentials) = self.get_credentials(request) else {
            return Ok(AuthOutcome::Decline);
        };

        let mut decision =
            login_with_credentials(self.identity_provider().as_ref(), request, &credentials)
                .await?;
        if decision.success {
            decision.headers.extend(self.auth_headers(request));
        }

        Ok(AuthOutcome::Decided(decision))
    }
}

/// Logs the request in with the given credentials.
///
/// A session whose user already has this username succeeds without asking
/// the provider, so a changed password only takes effect on a fresh login.
/// Otherwise the provider validates the pair: an active user gets a session,
/// anything else clears the session and fails.
pub async fn login_with_credentials(
    provider: &dyn IdentityProvider,
    request: &mut AuthRequest,
    credentials: &Credentials,
) -> AppResult<AuthDecision> {
    if request
        .session_user()
        .is_some_and(|user| user.username == credentials.username)
    {
        debug!(username = %credentials.username, "Session already authenticated");
        return Ok(AuthDecision::success());
    }

    debug!(username = %credentials.username, "Attempting API authentication");

    match provider
        .validate(&credentials.username, &credentials.password)
        .await?
    {
        Some(user) if user.is_active => {
            provider.establish_session(request, user);
            Ok(AuthDecision::success())
        }
        _ => {
            debug!(username = %credentials.username, "API login failed, no valid user found");
            provider.clear_session(request);
            Ok(AuthDecision::failure())
        }
    }
}
