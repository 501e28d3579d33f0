//! User and admin account models.

use serde::{Deserialize, Serialize};

use super::book::BookSummary;

/// Body of the registration endpoints (`/v1/client/register`, `/v1/admin`,
/// `/v1/superadmin`).
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub role_id: i32,
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: String,
    pub login: String,
    pub password: String,
}

/// Body of `PUT /v1/client`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: String,
    pub login: String,
    pub password: String,
}

/// Body of the login endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Body of `POST /v1/client/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Public account fields.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub avatar_url: String,
    pub login: String,
}

/// Account with the books it liked.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "like_books")]
    pub liked_books: Vec<BookSummary>,
}

/// Account plus its stored credentials, for login flows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub full_name: String,
    pub avatar_url: String,
    pub login: String,
    pub password: String,
    pub role_id: i32,
}

/// Minimal account summary (comment author, admin list).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UserBrief {
    pub id: i64,
    pub full_name: String,
    pub avatar_url: String,
}

/// Response of the registration and login endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub user: User,
    pub role_id: i32,
    pub access_token: String,
    pub refresh_token: String,
}
