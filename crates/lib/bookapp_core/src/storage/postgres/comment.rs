use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{PgStore, expect_rows};
use crate::models::comment::{Comment, CommentUpdate, CommentWithUser, NewComment};
use crate::models::user::UserBrief;
use crate::storage::{CommentRepo, StorageError};

const COMMENT_COLUMNS: &str = "id, user_id, book_id, text, created_at, updated_at";

/// Comment joined with its author.
#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    user_id: i64,
    book_id: i64,
    text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    full_name: String,
    avatar_url: String,
}

impl From<CommentRow> for CommentWithUser {
    fn from(row: CommentRow) -> Self {
        CommentWithUser {
            comment: Comment {
                id: row.id,
                user_id: row.user_id,
                book_id: row.book_id,
                text: row.text,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user: UserBrief {
                id: row.user_id,
                full_name: row.full_name,
                avatar_url: row.avatar_url,
            },
        }
    }
}

/// Comments on `book_id`, oldest first.
pub(super) async fn comments_for_book(
    pool: &PgPool,
    book_id: i64,
) -> Result<Vec<CommentWithUser>, StorageError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.user_id, c.book_id, c.text, c.created_at, c.updated_at,
               u.full_name, u.avatar_url
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.book_id = $1
        ORDER BY c.created_at ASC, c.id ASC
        "#,
    )
    .bind(book_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CommentWithUser::from).collect())
}

#[async_trait]
impl CommentRepo for PgStore {
    async fn create(&self, comment: &NewComment) -> Result<Comment, StorageError> {
        let sql = format!(
            "INSERT INTO comments (user_id, book_id, text) VALUES ($1, $2, $3) \
             RETURNING {COMMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Comment>(&sql)
            .bind(comment.user_id)
            .bind(comment.book_id)
            .bind(&comment.text)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<Comment, StorageError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
        let row = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn update(&self, comment: &CommentUpdate) -> Result<Comment, StorageError> {
        let sql = format!(
            "UPDATE comments SET text = $1, updated_at = now() WHERE id = $2 \
             RETURNING {COMMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Comment>(&sql)
            .bind(&comment.text)
            .bind(comment.id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }
}
