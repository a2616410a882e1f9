//! The slice of an inbound request the auth backends work with.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the header carrying credentials.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Name of the challenge header sent when authentication is required.
pub const WWW_AUTHENTICATE_HEADER: &str = "WWW-Authenticate";

/// A user known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable user identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Inactive users can never log in.
    pub is_active: bool,
}

/// Request view used during authentication: headers and the current
/// session's user.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    /// Header name (lowercase) → value.
    headers: HashMap<String, String>,
    /// User of the current session, if logged in.
    pub session: Option<AuthUser>,
}

impl AuthRequest {
    /// Creates an anonymous request with no headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. Names are case-insensitive.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Attaches an already logged-in session user.
    pub fn with_session(mut self, user: AuthUser) -> Self {
        self.session = Some(user);
        self
    }

    /// Returns a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the `Authorization` header value.
    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION_HEADER)
    }

    /// Returns the current session's user.
    pub fn session_user(&self) -> Option<&AuthUser> {
        self.session.as_ref()
    }
}
