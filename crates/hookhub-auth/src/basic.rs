//! HTTP Basic authentication backend.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;

use hookhub_core::config::auth::AuthConfig;

use crate::backend::{AuthBackend, Credentials};
use crate::identity::IdentityProvider;
use crate::request::AuthRequest;

/// Reasons a Basic `Authorization` header could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasicParseError {
    /// Header is not `<scheme> <token>`.
    #[error("Expected '<scheme> <credentials>'")]
    Malformed,

    /// Not the Basic scheme.
    #[error("Not Basic authentication")]
    NotBasicAuth,

    /// Token is not valid base64 or UTF-8.
    #[error("Invalid base64 encoding")]
    InvalidEncoding,

    /// Decoded token has no `:` separator.
    #[error("Invalid credentials format")]
    InvalidFormat,
}

/// Parses an `Authorization: Basic <base64(user:pass)>` header value.
pub fn parse_basic_header(value: &str) -> Result<Credentials, BasicParseError> {
    let (scheme, encoded) = value.split_once(' ').ok_or(BasicParseError::Malformed)?;
    if encoded.contains(' ') {
        return Err(BasicParseError::Malformed);
    }
    if scheme != "Basic" {
        return Err(BasicParseError::NotBasicAuth);
    }

    let decoded = BASE64
        .decode(encoded)
        .map_err(|_| BasicParseError::InvalidEncoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| BasicParseError::InvalidEncoding)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(BasicParseError::InvalidFormat)?;

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Handles HTTP Basic authentication for the web API.
#[derive(Debug, Clone)]
pub struct BasicAuthBackend {
    realm: String,
    provider: Arc<dyn IdentityProvider>,
}

impl BasicAuthBackend {
    /// Creates a backend advertising `realm`.
    pub fn new(realm: impl Into<String>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            realm: realm.into(),
            provider,
        }
    }

    /// Creates a backend from the auth configuration.
    pub fn from_config(config: &AuthConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self::new(config.realm.clone(), provider)
    }

    /// Returns the advertised realm.
    pub fn realm(&self) -> &str {
        &self.realm
    }
}

#[async_trait]
impl AuthBackend for BasicAuthBackend {
    fn www_auth_scheme(&self) -> String {
        format!("Basic realm=\"{}\"", self.realm)
    }

    fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    fn get_credentials(&self, request: &AuthRequest) -> Option<Credentials> {
        let header = request.authorization()?;

        match parse_basic_header(header) {
            Ok(credentials) => Some(credentials),
            Err(BasicParseError::NotBasicAuth) => None,
            Err(e) => {
                warn!(error = %e, "Failed to parse Authorization header");
                None
            }
        }
    }
}
