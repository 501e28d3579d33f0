use async_trait::async_trait;

use super::{BOOK_SUMMARY_COLUMNS, PgStore, bind_params, expect_rows};
use crate::listing::{PageRequest, build_author_filter_set};
use crate::models::author::{
    Author, AuthorDetail, AuthorPage, AuthorSummary, AuthorUpdate, NewAuthor,
};
use crate::models::book::BookSummary;
use crate::storage::{AuthorRepo, StorageError};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, middle_name, birth_day, died_year, \
     country, avatar_url, about_text, creativity, created_at, updated_at";

const AUTHOR_SUMMARY_COLUMNS: &str =
    "id, first_name, last_name, birth_day, died_year, avatar_url, book_count";

#[async_trait]
impl AuthorRepo for PgStore {
    async fn create(&self, author: &NewAuthor) -> Result<Author, StorageError> {
        let sql = format!(
            r#"
            INSERT INTO author
                (first_name, last_name, middle_name, birth_day, died_year, country,
                 avatar_url, about_text, creativity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {AUTHOR_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Author>(&sql)
            .bind(&author.first_name)
            .bind(&author.last_name)
            .bind(&author.middle_name)
            .bind(author.birth_day)
            .bind(author.died_year)
            .bind(&author.country)
            .bind(&author.avatar_url)
            .bind(&author.about_text)
            .bind(&author.creativity)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<AuthorDetail, StorageError> {
        let sql = format!("SELECT {AUTHOR_COLUMNS} FROM author WHERE id = $1");
        let author = sqlx::query_as::<_, Author>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await?;

        let books_sql = format!(
            "SELECT {BOOK_SUMMARY_COLUMNS} FROM book_listing WHERE author_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let books = sqlx::query_as::<_, BookSummary>(&books_sql)
            .bind(id)
            .fetch_all(self.pool())
            .await?;

        Ok(AuthorDetail { author, books })
    }

    async fn update(&self, author: &AuthorUpdate) -> Result<Author, StorageError> {
        let fields = &author.fields;
        let sql = format!(
            r#"
            UPDATE author
            SET first_name = $1, last_name = $2, middle_name = $3, birth_day = $4,
                died_year = $5, country = $6, avatar_url = $7, about_text = $8,
                creativity = $9, updated_at = now()
            WHERE id = $10
            RETURNING {AUTHOR_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Author>(&sql)
            .bind(&fields.first_name)
            .bind(&fields.last_name)
            .bind(&fields.middle_name)
            .bind(fields.birth_day)
            .bind(fields.died_year)
            .bind(&fields.country)
            .bind(&fields.avatar_url)
            .bind(&fields.about_text)
            .bind(&fields.creativity)
            .bind(author.id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        // books (and everything hanging off them) cascade
        let result = sqlx::query("DELETE FROM author WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<AuthorPage, StorageError> {
        let set = build_author_filter_set(search, page);

        let count_sql = set.count_sql("author_listing");
        let (total,) = bind_params(sqlx::query_as::<_, (i64,)>(&count_sql), &set.params)
            .fetch_one(self.pool())
            .await?;

        let page_sql = set.page_sql(AUTHOR_SUMMARY_COLUMNS, "author_listing");
        let page_params = set.page_params();
        let authors = bind_params(sqlx::query_as::<_, AuthorSummary>(&page_sql), &page_params)
            .fetch_all(self.pool())
            .await?;

        Ok(AuthorPage {
            authors,
            meta: page.meta(total),
        })
    }
}
