use std::collections::HashMap;

use async_trait::async_trait;

use super::subcategory::SUBCATEGORY_COLUMNS;
use super::{PgStore, expect_rows};
use crate::listing::{BookFilter, ListOrder, PageRequest};
use crate::models::category::{
    Category, CategoryBooks, CategoryDetail, CategoryUpdate, NewCategory, Subcategory,
};
use crate::storage::{CategoryRepo, StorageError, SubcategoryRepo};

const CATEGORY_COLUMNS: &str = "id, category_name, status, created_at, updated_at";

impl PgStore {
    async fn active_category(&self, id: i64) -> Result<Category, StorageError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE id = $1 AND status");
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl CategoryRepo for PgStore {
    async fn create(&self, category: &NewCategory) -> Result<Category, StorageError> {
        let sql = format!(
            "INSERT INTO category (category_name, status) VALUES ($1, $2) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(&category.category_name)
            .bind(category.status)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn get(&self, id: i64) -> Result<CategoryDetail, StorageError> {
        let category = self.active_category(id).await?;
        let subcategories = self.list_by_category(id).await?;
        Ok(CategoryDetail {
            category,
            subcategories,
        })
    }

    async fn update(&self, category: &CategoryUpdate) -> Result<Category, StorageError> {
        let sql = format!(
            "UPDATE category SET category_name = $1, updated_at = now() WHERE id = $2 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Category>(&sql)
            .bind(&category.category_name)
            .bind(category.id)
            .fetch_one(self.pool())
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        // subcategories and books cascade
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;
        expect_rows(result.rows_affected())
    }

    async fn list(&self) -> Result<Vec<CategoryDetail>, StorageError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE status ORDER BY id");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(self.pool())
            .await?;

        let sub_sql = format!(
            r#"
            SELECT {SUBCATEGORY_COLUMNS}
            FROM sub_category
            WHERE category_id IN (SELECT id FROM category WHERE status)
            ORDER BY id
            "#
        );
        let subcategories = sqlx::query_as::<_, Subcategory>(&sub_sql)
            .fetch_all(self.pool())
            .await?;

        let mut by_category: HashMap<i64, Vec<Subcategory>> = HashMap::new();
        for sub in subcategories {
            by_category.entry(sub.category_id).or_default().push(sub);
        }

        Ok(categories
            .into_iter()
            .map(|category| CategoryDetail {
                subcategories: by_category.remove(&category.id).unwrap_or_default(),
                category,
            })
            .collect())
    }

    async fn books(&self, id: i64, page: &PageRequest) -> Result<CategoryBooks, StorageError> {
        let category = self.active_category(id).await?;
        let filter = BookFilter {
            category_id: Some(id),
            ..BookFilter::default()
        };
        let books = self.book_page(&filter, page, ListOrder::Newest).await?;
        Ok(CategoryBooks { category, books })
    }
}
