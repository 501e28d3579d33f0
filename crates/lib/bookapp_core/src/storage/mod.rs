//! Persistence layer.
//!
//! Each entity gets a repository trait; [`Storage`] bundles one handle per
//! trait so the HTTP layer can be exercised against in-memory fakes. The only
//! production implementation is [`postgres::PgStore`].

pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::listing::{BookFilter, PageRequest};
use crate::models::author::{Author, AuthorDetail, AuthorPage, AuthorUpdate, NewAuthor};
use crate::models::book::{
    AudioBookPage, Book, BookDetail, BookPage, BookUpdate, Like, NewBook,
};
use crate::models::category::{
    Category, CategoryBooks, CategoryDetail, CategoryUpdate, NewCategory, NewSubcategory,
    Subcategory, SubcategoryBooks, SubcategoryUpdate,
};
use crate::models::comment::{Comment, CommentUpdate, NewComment};
use crate::models::statistic::{CategoryBookCount, Totals, WeeklyBookCount};
use crate::models::user::{NewUser, User, UserCredentials, UserProfile, UserUpdate};

use self::postgres::PgStore;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// The write referenced a row that does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        if matches!(e, sqlx::Error::RowNotFound) {
            return StorageError::NotFound;
        }
        if let Some(db) = e.as_database_error() {
            let message = db.message().to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StorageError::Conflict(message),
                Some(FOREIGN_KEY_VIOLATION) => return StorageError::InvalidReference(message),
                _ => {}
            }
        }
        StorageError::Database(e)
    }
}

/// Unique `users` columns that may be probed for existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Login,
}

impl UserField {
    /// Column name. Only ever one of a fixed set of identifiers.
    pub fn column(&self) -> &'static str {
        match self {
            UserField::Login => "login",
        }
    }
}

#[async_trait]
pub trait BookRepo: Send + Sync {
    async fn create(&self, book: &NewBook) -> Result<Book, StorageError>;

    /// Book page; `viewer` fills in `is_like`.
    async fn get(&self, id: i64, viewer: Option<i64>) -> Result<BookDetail, StorageError>;

    async fn update(&self, book: &BookUpdate) -> Result<Book, StorageError>;

    /// Delete a book with its views, likes and comments.
    async fn delete(&self, id: i64) -> Result<(), StorageError>;

    /// Filtered listing, newest first.
    async fn list(&self, filter: &BookFilter, page: &PageRequest)
    -> Result<BookPage, StorageError>;

    /// All books, most viewed first.
    async fn most_read(&self, page: &PageRequest) -> Result<BookPage, StorageError>;

    /// Books with an audio URL, optionally searched.
    async fn list_audio(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<AudioBookPage, StorageError>;

    async fn like(&self, like: Like) -> Result<(), StorageError>;

    async fn unlike(&self, like: Like) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AuthorRepo: Send + Sync {
    async fn create(&self, author: &NewAuthor) -> Result<Author, StorageError>;

    async fn get(&self, id: i64) -> Result<AuthorDetail, StorageError>;

    async fn update(&self, author: &AuthorUpdate) -> Result<Author, StorageError>;

    /// Delete an author with all of their books.
    async fn delete(&self, id: i64) -> Result<(), StorageError>;

    async fn list(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<AuthorPage, StorageError>;
}

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn create(&self, category: &NewCategory) -> Result<Category, StorageError>;

    /// Active category with its subcategories.
    async fn get(&self, id: i64) -> Result<CategoryDetail, StorageError>;

    async fn update(&self, category: &CategoryUpdate) -> Result<Category, StorageError>;

    /// Delete a category with its subcategories and books.
    async fn delete(&self, id: i64) -> Result<(), StorageError>;

    /// Active categories with their subcategories.
    async fn list(&self) -> Result<Vec<CategoryDetail>, StorageError>;

    async fn books(&self, id: i64, page: &PageRequest) -> Result<CategoryBooks, StorageError>;
}

#[async_trait]
pub trait SubcategoryRepo: Send + Sync {
    async fn create(&self, subcategory: &NewSubcategory) -> Result<Subcategory, StorageError>;

    async fn books(&self, id: i64, page: &PageRequest)
    -> Result<SubcategoryBooks, StorageError>;

    async fn update(&self, subcategory: &SubcategoryUpdate)
    -> Result<Subcategory, StorageError>;

    /// Delete a subcategory with its books.
    async fn delete(&self, id: i64) -> Result<(), StorageError>;

    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Subcategory>, StorageError>;
}

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn create(&self, comment: &NewComment) -> Result<Comment, StorageError>;

    async fn get(&self, id: i64) -> Result<Comment, StorageError>;

    async fn update(&self, comment: &CommentUpdate) -> Result<Comment, StorageError>;

    async fn delete(&self, id: i64) -> Result<(), StorageError>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert an account. `password_hash` replaces the plaintext in `user`.
    async fn create(&self, user: &NewUser, password_hash: &str) -> Result<User, StorageError>;

    /// Account with the books it liked.
    async fn get(&self, id: i64) -> Result<UserProfile, StorageError>;

    async fn update(&self, user: &UserUpdate, password_hash: &str) -> Result<User, StorageError>;

    /// Delete the account `id` if it holds `role_id`.
    async fn delete(&self, id: i64, role_id: i32) -> Result<(), StorageError>;

    async fn find_by_login(&self, login: &str) -> Result<Option<UserCredentials>, StorageError>;

    async fn exists(&self, field: UserField, value: &str) -> Result<bool, StorageError>;

    async fn list_admins(&self) -> Result<Vec<User>, StorageError>;

    async fn store_refresh_token(&self, id: i64, token: &str) -> Result<(), StorageError>;

    /// Replace the stored refresh token of `id` with `new` only if it is still
    /// `current`. `false` when `current` is no longer the stored token.
    async fn rotate_refresh_token(
        &self,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait ViewRepo: Send + Sync {
    /// Count one view of `book_id` per distinct user agent.
    async fn record(&self, book_id: i64, user_agent: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait StatisticRepo: Send + Sync {
    async fn totals(&self) -> Result<Totals, StorageError>;

    async fn books_per_category(&self) -> Result<Vec<CategoryBookCount>, StorageError>;

    /// Books added per week over the trailing 52 weeks.
    async fn books_per_week(&self) -> Result<Vec<WeeklyBookCount>, StorageError>;
}

/// Shared handle to every repository.
#[derive(Clone)]
pub struct Storage {
    pub books: Arc<dyn BookRepo>,
    pub authors: Arc<dyn AuthorRepo>,
    pub categories: Arc<dyn CategoryRepo>,
    pub subcategories: Arc<dyn SubcategoryRepo>,
    pub comments: Arc<dyn CommentRepo>,
    pub users: Arc<dyn UserRepo>,
    pub views: Arc<dyn ViewRepo>,
    pub statistics: Arc<dyn StatisticRepo>,
}

impl Storage {
    /// Every repository backed by one PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            books: store.clone(),
            authors: store.clone(),
            categories: store.clone(),
            subcategories: store.clone(),
            comments: store.clone(),
            users: store.clone(),
            views: store.clone(),
            statistics: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            StorageError::from(sqlx::Error::RowNotFound),
            StorageError::NotFound
        ));
    }

    #[test]
    fn other_errors_stay_database_errors() {
        assert!(matches!(
            StorageError::from(sqlx::Error::PoolTimedOut),
            StorageError::Database(_)
        ));
    }

    #[test]
    fn user_field_columns_are_fixed() {
        assert_eq!(UserField::Login.column(), "login");
    }
}
