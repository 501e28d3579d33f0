//! Comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserBrief;

/// Body of `POST /v1/comment`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub user_id: i64,
    pub book_id: i64,
    pub text: String,
}

/// Body of `PUT /v1/comment`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentUpdate {
    pub id: i64,
    pub text: String,
}

/// A stored comment row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment with a summary of its author, as embedded in a book page.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithUser {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: UserBrief,
}
