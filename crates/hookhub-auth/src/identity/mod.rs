//! Identity provider seam: credential validation and session handling.

pub mod memory;

use std::fmt;

use async_trait::async_trait;

use hookhub_core::result::AppResult;

use crate::request::{AuthRequest, AuthUser};

pub use memory::MemoryIdentityProvider;

/// External identity provider consulted by the auth backends.
#[async_trait]
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    /// Validates a username/password pair.
    ///
    /// Returns `Ok(None)` when the credentials are wrong.
    async fn validate(&self, username: &str, password: &str) -> AppResult<Option<AuthUser>>;

    /// Establishes a session for `user` on the request.
    fn establish_session(&self, request: &mut AuthRequest, user: AuthUser) {
        request.session = Some(user);
    }

    /// Clears any session on the request.
    fn clear_session(&self, request: &mut AuthRequest) {
        request.session = None;
    }
}
