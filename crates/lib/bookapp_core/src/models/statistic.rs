//! Dashboard statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Catalogue totals.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Totals {
    pub book_count: i64,
    pub author_count: i64,
    pub user_count: i64,
    pub top_book_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryBookCount {
    pub category_name: String,
    pub book_count: i64,
}

/// Books added during the week starting at `week_date`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WeeklyBookCount {
    pub week_date: DateTime<Utc>,
    pub book_count: i64,
}
