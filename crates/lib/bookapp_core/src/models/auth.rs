//! Authentication domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role carried in a session token and used as the policy subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
    /// No credential was presented.
    Unauthorized,
    /// A signed token whose role claim is not recognised.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Policy subject name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
            Role::Unknown => "unknown",
            Role::Unauthorized => "unauthorized",
        }
    }

    /// Map a `users.role_id` value to its role.
    pub fn from_role_id(role_id: i32) -> Self {
        match role_id {
            1 => Role::Superadmin,
            2 => Role::Admin,
            3 => Role::User,
            _ => Role::Unknown,
        }
    }

    /// The `users.role_id` stored for accounts of this role, if any.
    pub fn role_id(&self) -> Option<i32> {
        match self {
            Role::Superadmin => Some(1),
            Role::Admin => Some(2),
            Role::User => Some(3),
            Role::Unknown | Role::Unauthorized => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    #[default]
    Access,
    Refresh,
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — user ID.
    pub sub: i64,
    pub role: Role,
    /// Intended consumers.
    pub aud: Vec<String>,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    #[serde(default)]
    pub token_use: TokenUse,
    /// Unique token id; keeps pairs issued in the same second distinct.
    #[serde(default)]
    pub jti: String,
}

/// Access + refresh token issued together.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
