//! Authentication and authorization logic.
//!
//! Provides password hashing, session token issue/verify and the role policy
//! enforcer shared by `bookapp_api`.

pub mod jwt;
pub mod password;
pub mod policy;

use thiserror::Error;

/// Session token failures. Kept distinct so callers can tell a stale token
/// (refresh and retry) from a forged or garbled one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Internal error: {0}")]
    Internal(String),
}
