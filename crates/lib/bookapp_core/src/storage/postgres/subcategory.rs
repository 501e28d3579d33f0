use async_trait::async_trait;

use super::{PgStore, expect_rows};
use crate::listing::{BookFilter, ListOrder, PageRequest};
use crate::models::category::{
    NewSubcategory, Subcategory, SubcategoryBooks, SubcategoryUpdate,
};
use crate::storage::{StorageError, SubcategoryRepo};

pub(super) const SUBCATEGORY_COLUMNS: &str =
    "id, subcategory_name, category_id, created_at, updated_at";

#[async_trait]
impl SubcategoryRepo for PgStore {
    async fn create(&self, subcategory: &NewSubcategory) -> Result<Subcategory, StorageError> {
        let sql = format!(
            "INSERT INTO sub_category (subcategory_name, category_id) VALUES ($1, $2) \
             RETURNING {SUBCATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Subcategory>(&sql)
            .bind(&subcategory.subcategory_name)
            .bind(subcategory.category_id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn books(
        &self,
        id: i64,
        page: &PageRequest,
    ) -> Result<SubcategoryBooks, StorageError> {
        let sql = format!("SELECT {SUBCATEGORY_COLUMNS} FROM sub_category WHERE id = $1");
        let subcategory = sqlx::query_as::<_, Subcategory>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        let filter = BookFilter {
            subcategory_id: Some(id),
            ..BookFilter::default()
        };
        let books = self.book_page(&filter, page, ListOrder::Newest).await?;
        Ok(SubcategoryBooks { subcategory, books })
    }

    async fn update(
        &self,
        subcategory: &SubcategoryUpdate,
    ) -> Result<Subcategory, StorageError> {
        let sql = format!(
            "UPDATE sub_category SET subcategory_name = $1, updated_at = now() WHERE id = $2 \
             RETURNING {SUBCATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Subcategory>(&sql)
            .bind(&subcategory.subcategory_name)
            .bind(subcategory.id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM sub_category WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }

    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Subcategory>, StorageError> {
        let sql = format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM sub_category WHERE category_id = $1 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, Subcategory>(&sql)
            .bind(category_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows)
    }
}
