use async_trait::async_trait;

use super::comment::comments_for_book;
use super::{
    AUDIO_BOOK_SUMMARY_COLUMNS, BOOK_COLUMNS, BOOK_SUMMARY_COLUMNS, PgStore, bind_params,
    expect_rows,
};
use crate::listing::{BookFilter, ListOrder, PageRequest, build_book_filter_set};
use crate::models::book::{
    AudioBookPage, AudioBookSummary, Book, BookDetail, BookPage, BookSummary, BookUpdate, Like,
    NewBook,
};
use crate::storage::{BookRepo, StorageError};

const BOOK_SOURCE: &str = "book_listing";

/// Books suggested alongside a book page.
const SIMILAR_BOOKS_LIMIT: i64 = 6;

impl PgStore {
    /// One page of `book_listing` rows matching `filter`.
    pub(super) async fn book_page(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
        order: ListOrder,
    ) -> Result<BookPage, StorageError> {
        let set = build_book_filter_set(filter, page).ordered_by(order);

        let count_sql = set.count_sql(BOOK_SOURCE);
        let (total,) = bind_params(sqlx::query_as::<_, (i64,)>(&count_sql), &set.params)
            .fetch_one(self.pool())
            .await?;

        let page_sql = set.page_sql(BOOK_SUMMARY_COLUMNS, BOOK_SOURCE);
        let page_params = set.page_params();
        let books = bind_params(sqlx::query_as::<_, BookSummary>(&page_sql), &page_params)
            .fetch_all(self.pool())
            .await?;

        Ok(BookPage {
            books,
            meta: page.meta(total),
        })
    }

    /// Books `user_id` liked, most recent like first.
    pub(super) async fn liked_books(&self, user_id: i64) -> Result<Vec<BookSummary>, StorageError> {
        let rows = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.image, b.book_type, b.author_first_name,
                   b.author_last_name, b.like_count, b.view_count, b.category_id,
                   b.subcategory_id, b.author_id
            FROM book_listing b
            JOIN book_likes l ON l.book_id = b.id
            WHERE l.user_id = $1
            ORDER BY l.created_at DESC, b.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl BookRepo for PgStore {
    async fn create(&self, book: &NewBook) -> Result<Book, StorageError> {
        let sql = format!(
            r#"
            INSERT INTO books
                (title, description, image, download_url, audio_url, book_type,
                 category_id, subcategory_id, author_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.description)
            .bind(&book.image)
            .bind(&book.download_url)
            .bind(&book.audio_url)
            .bind(&book.book_type)
            .bind(book.category_id)
            .bind(book.sub_category_id)
            .bind(book.author_id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn get(&self, id: i64, viewer: Option<i64>) -> Result<BookDetail, StorageError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(StorageError::NotFound)?;

        let (author_first_name, author_last_name, like_count, view_count) =
            sqlx::query_as::<_, (String, String, i64, i64)>(
                r#"
                SELECT author_first_name, author_last_name, like_count, view_count
                FROM book_listing
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_one(self.pool())
            .await?;

        let is_like = match viewer {
            Some(user_id) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM book_likes WHERE user_id = $1 AND book_id = $2)",
                )
                .bind(user_id)
                .bind(id)
                .fetch_one(self.pool())
                .await?
            }
            None => false,
        };

        let comments = comments_for_book(self.pool(), id).await?;

        let similar_sql = format!(
            r#"
            SELECT {BOOK_SUMMARY_COLUMNS}
            FROM book_listing
            WHERE category_id = $1 AND id <> $2
            ORDER BY view_count DESC, id DESC
            LIMIT $3
            "#
        );
        let similar_books = sqlx::query_as::<_, BookSummary>(&similar_sql)
            .bind(book.category_id)
            .bind(id)
            .bind(SIMILAR_BOOKS_LIMIT)
            .fetch_all(self.pool())
            .await?;

        Ok(BookDetail {
            book,
            is_like,
            author_first_name,
            author_last_name,
            view_count,
            like_count,
            comment_count: comments.len() as i64,
            comments,
            similar_books,
        })
    }

    async fn update(&self, book: &BookUpdate) -> Result<Book, StorageError> {
        let sql = format!(
            r#"
            UPDATE books
            SET title = $1, description = $2, image = $3, download_url = $4,
                audio_url = $5, book_type = $6, updated_at = now()
            WHERE id = $7
            RETURNING {BOOK_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Book>(&sql)
            .bind(&book.title)
            .bind(&book.description)
            .bind(&book.image)
            .bind(&book.download_url)
            .bind(&book.audio_url)
            .bind(&book.book_type)
            .bind(book.id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        // views, book_likes and comments cascade
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }

    async fn list(
        &self,
        filter: &BookFilter,
        page: &PageRequest,
    ) -> Result<BookPage, StorageError> {
        self.book_page(filter, page, ListOrder::Newest).await
    }

    async fn most_read(&self, page: &PageRequest) -> Result<BookPage, StorageError> {
        self.book_page(&BookFilter::default(), page, ListOrder::MostViewed)
            .await
    }

    async fn list_audio(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<AudioBookPage, StorageError> {
        let filter = BookFilter {
            search: search.map(str::to_string),
            audio_only: true,
            ..BookFilter::default()
        };
        let set = build_book_filter_set(&filter, page);

        let count_sql = set.count_sql(BOOK_SOURCE);
        let (total,) = bind_params(sqlx::query_as::<_, (i64,)>(&count_sql), &set.params)
            .fetch_one(self.pool())
            .await?;

        let page_sql = set.page_sql(AUDIO_BOOK_SUMMARY_COLUMNS, BOOK_SOURCE);
        let page_params = set.page_params();
        let books = bind_params(
            sqlx::query_as::<_, AudioBookSummary>(&page_sql),
            &page_params,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(AudioBookPage {
            books,
            meta: page.meta(total),
        })
    }

    async fn like(&self, like: Like) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO book_likes (user_id, book_id) VALUES ($1, $2)")
            .bind(like.user_id)
            .bind(like.book_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn unlike(&self, like: Like) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM book_likes WHERE user_id = $1 AND book_id = $2")
            .bind(like.user_id)
            .bind(like.book_id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }
}
