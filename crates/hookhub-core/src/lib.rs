//! # hookhub-core
//!
//! Core crate for HookHub. Contains the configuration schema and loader,
//! and the unified error system shared by the extension and auth crates.
//!
//! This crate has **no** internal dependencies on other HookHub crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
