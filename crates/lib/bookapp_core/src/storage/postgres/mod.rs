//! PostgreSQL implementation of every repository trait.

mod author;
mod book;
mod category;
mod comment;
mod statistic;
mod subcategory;
mod user;
mod view;

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use super::StorageError;
use crate::listing::SqlParam;

/// Repository implementation over a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Bind listing parameters in placeholder order.
fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [SqlParam],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

/// `NotFound` when a write touched no rows.
fn expect_rows(rows_affected: u64) -> Result<(), StorageError> {
    if rows_affected == 0 {
        Err(StorageError::NotFound)
    } else {
        Ok(())
    }
}

/// Columns of [`crate::models::book::BookSummary`] in `book_listing`.
const BOOK_SUMMARY_COLUMNS: &str = "id, title, image, book_type, author_first_name, \
     author_last_name, like_count, view_count, category_id, subcategory_id, author_id";

/// Columns of [`crate::models::book::AudioBookSummary`] in `book_listing`.
const AUDIO_BOOK_SUMMARY_COLUMNS: &str = "id, title, image, audio_url, book_type, \
     author_first_name, author_last_name, like_count, view_count, category_id, \
     subcategory_id, author_id";

const BOOK_COLUMNS: &str = "id, title, description, image, download_url, audio_url, \
     book_type, category_id, subcategory_id, author_id, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_rows_flags_untouched_writes() {
        assert!(matches!(expect_rows(0), Err(StorageError::NotFound)));
        assert!(expect_rows(1).is_ok());
    }
}
