//! Category and subcategory models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::book::BookPage;

fn default_status() -> bool {
    true
}

/// Body of `POST /v1/category`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub category_name: String,
    #[serde(default = "default_status")]
    pub status: bool,
}

/// Body of `PUT /v1/category`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryUpdate {
    pub id: i64,
    pub category_name: String,
}

/// A stored category row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub category_name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category with its subcategories.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

/// Category with one page of its books.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBooks {
    #[serde(flatten)]
    pub category: Category,
    #[serde(flatten)]
    pub books: BookPage,
}

/// Body of `POST /v1/subcategory`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubcategory {
    pub subcategory_name: String,
    pub category_id: i64,
}

/// Body of `PUT /v1/subcategory`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubcategoryUpdate {
    pub id: i64,
    pub subcategory_name: String,
}

/// A stored subcategory row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subcategory {
    pub id: i64,
    pub subcategory_name: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subcategory with one page of its books.
#[derive(Debug, Clone, Serialize)]
pub struct SubcategoryBooks {
    #[serde(flatten)]
    pub subcategory: Subcategory,
    #[serde(flatten)]
    pub books: BookPage,
}
