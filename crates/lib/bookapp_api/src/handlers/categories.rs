//! Category request handlers.

use axum::extract::State;
use bookapp_core::models::category::{
    Category, CategoryBooks, CategoryDetail, CategoryUpdate, NewCategory,
};
use tracing::info;

use super::{DELETED, ListParams, require_text, required_id};
use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::ApiResponse;

/// `POST /v1/category`
pub async fn create_category_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewCategory>,
) -> AppResult<ApiResponse<Category>> {
    require_text("category_name", &body.category_name)?;
    let category = state.storage.categories.create(&body).await?;
    info!(category_id = category.id, "category created");
    Ok(ApiResponse::created(category))
}

/// `GET /v1/category/{id}` — active category with its subcategories.
pub async fn get_category_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<CategoryDetail>> {
    let category = state.storage.categories.get(id).await?;
    Ok(ApiResponse::ok(category))
}

/// `GET /v1/category/list`
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CategoryDetail>>> {
    let categories = state.storage.categories.list().await?;
    Ok(ApiResponse::ok(categories))
}

/// `GET /v1/category/books?id=` — category with one page of its books.
pub async fn category_books_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<CategoryBooks>> {
    let id = required_id("id", params.id.as_deref())?;
    let books = state
        .storage
        .categories
        .books(id, &params.page_request())
        .await?;
    Ok(ApiResponse::ok(books))
}

/// `PUT /v1/category`
pub async fn update_category_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CategoryUpdate>,
) -> AppResult<ApiResponse<Category>> {
    require_text("category_name", &body.category_name)?;
    let category = state.storage.categories.update(&body).await?;
    Ok(ApiResponse::ok(category))
}

/// `DELETE /v1/category/{id}` — also removes its subcategories and books.
pub async fn delete_category_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<&'static str>> {
    state.storage.categories.delete(id).await?;
    info!(category_id = id, "category deleted");
    Ok(ApiResponse::ok(DELETED))
}
