//! Explicit account login and logout.

use std::sync::Arc;

use tracing::{info, warn};

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use crate::identity::IdentityProvider;
use crate::request::{AuthRequest, AuthUser};

/// Message of the error returned when a login is rejected.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Logs users in and out through the identity provider.
#[derive(Debug, Clone)]
pub struct AccountService {
    provider: Arc<dyn IdentityProvider>,
}

impl AccountService {
    /// Creates the service.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Validates the credentials and establishes a session.
    ///
    /// Unlike the backend login step this always asks the provider, even
    /// when the session already belongs to `username`.
    pub async fn login(
        &self,
        request: &mut AuthRequest,
        username: &str,
        password: &str,
    ) -> AppResult<AuthUser> {
        match self.provider.validate(username, password).await? {
            Some(user) if user.is_active => {
                self.provider.establish_session(request, user.clone());
                info!(user_id = %user.id, username = %user.username, "User logged in");
                Ok(user)
            }
            _ => {
                warn!(username = %username, "Login failed");
                Err(AppError::authentication(LOGIN_FAILED_MESSAGE))
            }
        }
    }

    /// Clears the request's session.
    pub fn logout(&self, request: &mut AuthRequest) {
        if let Some(user) = request.session_user() {
            info!(user_id = %user.id, username = %user.username, "User logged out");
        }
        self.provider.clear_session(request);
    }
}
