use async_trait::async_trait;

use super::PgStore;
use crate::models::auth::Role;
use crate::models::statistic::{CategoryBookCount, Totals, WeeklyBookCount};
use crate::storage::{StatisticRepo, StorageError};

#[async_trait]
impl StatisticRepo for PgStore {
    async fn totals(&self) -> Result<Totals, StorageError> {
        let (book_count, author_count, user_count, top_book_count) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM books),
                    (SELECT COUNT(*) FROM author),
                    (SELECT COUNT(*) FROM users WHERE role_id = $1),
                    (SELECT COUNT(*) FROM books WHERE book_type = 'top')
                "#,
            )
            .bind(Role::User.role_id())
            .fetch_one(self.pool())
            .await?;
        Ok(Totals {
            book_count,
            author_count,
            user_count,
            top_book_count,
        })
    }

    async fn books_per_category(&self) -> Result<Vec<CategoryBookCount>, StorageError> {
        let rows = sqlx::query_as::<_, CategoryBookCount>(
            r#"
            SELECT c.category_name, COUNT(b.id) AS book_count
            FROM category c
            LEFT JOIN books b ON b.category_id = c.id
            GROUP BY c.id, c.category_name
            ORDER BY c.id
            "#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    async fn books_per_week(&self) -> Result<Vec<WeeklyBookCount>, StorageError> {
        let rows = sqlx::query_as::<_, WeeklyBookCount>(
            r#"
            SELECT date_trunc('week', created_at) AS week_date, COUNT(*) AS book_count
            FROM books
            WHERE created_at >= date_trunc('week', now()) - INTERVAL '51 weeks'
            GROUP BY week_date
            ORDER BY week_date
            "#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
