//! # HookHub Auth
//!
//! Web API authentication: the [`AuthBackend`] contract, the HTTP Basic
//! backend, and the configured [`AuthBackendChain`] that tries backends in
//! order until one decides.
//!
//! ## Modules
//!
//! - `request`: the request view backends read credentials and sessions from
//! - `identity`: identity provider seam and an Argon2id in-memory provider
//! - `backend`: backend contract, tagged outcomes, credential login step
//! - `basic`: HTTP Basic backend
//! - `chain`: backend factory registry and the cached backend chain
//! - `account`: explicit login/logout

pub mod account;
pub mod backend;
pub mod basic;
pub mod chain;
pub mod identity;
pub mod request;

pub use account::AccountService;
pub use backend::{AuthBackend, AuthDecision, AuthHeaders, AuthOutcome, Credentials};
pub use basic::BasicAuthBackend;
pub use chain::{AuthBackendChain, BackendRegistry};
pub use identity::{IdentityProvider, MemoryIdentityProvider};
pub use request::{AuthRequest, AuthUser};
