//! Book models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::comment::CommentWithUser;
use crate::listing::PageMeta;

fn default_book_type() -> String {
    "standard".to_string()
}

/// Body of `POST /v1/book`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default = "default_book_type")]
    pub book_type: String,
    pub category_id: i64,
    pub sub_category_id: i64,
    pub author_id: i64,
}

/// Body of `PUT /v1/book`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookUpdate {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub audio_url: String,
    #[serde(default = "default_book_type")]
    pub book_type: String,
}

/// A stored book row.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: String,
    pub download_url: String,
    pub audio_url: String,
    pub book_type: String,
    pub category_id: i64,
    #[serde(rename = "sub_category_id")]
    pub subcategory_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book as shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub book_type: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub like_count: i64,
    pub view_count: i64,
    pub category_id: i64,
    #[serde(rename = "sub_category_id")]
    pub subcategory_id: i64,
    pub author_id: i64,
}

/// Audio book as shown in the audio listing.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AudioBookSummary {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub audio_url: String,
    pub book_type: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub like_count: i64,
    pub view_count: i64,
    pub category_id: i64,
    #[serde(rename = "sub_category_id")]
    pub subcategory_id: i64,
    pub author_id: i64,
}

/// Full book page: the book, its counters, comments and similar books.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub is_like: bool,
    pub author_first_name: String,
    pub author_last_name: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub comments: Vec<CommentWithUser>,
    pub similar_books: Vec<BookSummary>,
}

/// One page of a book listing.
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub books: Vec<BookSummary>,
    #[serde(rename = "_meta")]
    pub meta: PageMeta,
}

/// One page of the audio book listing.
#[derive(Debug, Clone, Serialize)]
pub struct AudioBookPage {
    pub books: Vec<AudioBookSummary>,
    #[serde(rename = "_meta")]
    pub meta: PageMeta,
}

/// Body of `POST /v1/book/like` and `DELETE /v1/book/like`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Like {
    pub user_id: i64,
    pub book_id: i64,
}
