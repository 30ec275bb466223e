//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! signup:  validate → bcrypt hash (blocking pool) → UserStore
//! login:   UserStore lookup → bcrypt verify → TokenIssuer::issue
//! request: bearer token → TokenBlacklist check → TokenIssuer::verify → Claims
//! logout:  bearer token → TokenBlacklist::revoke (until token expiry)
//! ```

pub mod blacklist;
pub mod jwt;
pub mod password;
pub mod service;

use serde::Serialize;
use thiserror::Error;

pub use blacklist::TokenBlacklist;
pub use jwt::{Claims, TokenIssuer};
pub use service::AuthService;

/// One failed input rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Errors that can occur while authenticating.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Access denied, no token provided")]
    MissingToken,

    #[error("Token is invalidated")]
    TokenRevoked,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Authentication backend error: {0}")]
    Internal(String),
}
