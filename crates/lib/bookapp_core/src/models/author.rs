//! Author models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::book::BookSummary;
use crate::listing::PageMeta;

/// Body of `POST /v1/author`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub birth_day: Option<NaiveDate>,
    pub died_year: Option<NaiveDate>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub about_text: String,
    #[serde(default)]
    pub creativity: String,
}

/// Body of `PUT /v1/author`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorUpdate {
    pub id: i64,
    #[serde(flatten)]
    pub fields: NewAuthor,
}

/// A stored author row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub birth_day: Option<NaiveDate>,
    pub died_year: Option<NaiveDate>,
    pub country: String,
    pub avatar_url: String,
    pub about_text: String,
    pub creativity: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author with their books.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookSummary>,
}

/// Author as shown in the author listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuthorSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_day: Option<NaiveDate>,
    pub died_year: Option<NaiveDate>,
    pub avatar_url: String,
    pub book_count: i64,
}

/// One page of the author listing.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorPage {
    pub authors: Vec<AuthorSummary>,
    #[serde(rename = "_meta")]
    pub meta: PageMeta,
}
