//! In-memory identity provider backed by Argon2id password hashes.

use std::collections::HashMap;
use std::sync::RwLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use super::IdentityProvider;
use crate::request::AuthUser;

#[derive(Debug, Clone)]
struct StoredUser {
    user: AuthUser,
    password_hash: String,
}

/// Identity provider holding users and their password hashes in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl MemoryIdentityProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user, hashing the password with a random salt.
    pub fn add_user(&self, username: &str, password: &str, is_active: bool) -> AppResult<AuthUser> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if users.contains_key(username) {
            return Err(AppError::conflict(format!(
                "User '{username}' already exists"
            )));
        }

        let user = AuthUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_active,
        };
        users.insert(
            username.to_string(),
            StoredUser {
                user: user.clone(),
                password_hash: hash_password(password)?,
            },
        );

        info!(username = %username, is_active = is_active, "User added");
        Ok(user)
    }

    /// Activates or deactivates a user.
    pub fn set_active(&self, username: &str, is_active: bool) -> AppResult<()> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let stored = users
            .get_mut(username)
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;
        stored.user.is_active = is_active;
        Ok(())
    }

    /// Replaces a user's password.
    pub fn set_password(&self, username: &str, password: &str) -> AppResult<()> {
        let hash = hash_password(password)?;
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let stored = users
            .get_mut(username)
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;
        stored.password_hash = hash;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn validate(&self, username: &str, password: &str) -> AppResult<Option<AuthUser>> {
        let stored = self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(username)
            .cloned();

        let Some(stored) = stored else {
            debug!(username = %username, "Unknown user");
            return Ok(None);
        };

        if verify_password(password, &stored.password_hash)? {
            Ok(Some(stored.user))
        } else {
            debug!(username = %username, "Password mismatch");
            Ok(None)
        }
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::internal(format!(
            "Password verification failed: {e}"
        ))),
    }
}
