use async_trait::async_trait;

use super::PgStore;
use crate::storage::{StorageError, ViewRepo};

#[async_trait]
impl ViewRepo for PgStore {
    async fn record(&self, book_id: i64, user_agent: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO views (book_id, user_agent)
            VALUES ($1, $2)
            ON CONFLICT (book_id, user_agent) DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(user_agent)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}
