//! Subcategory request handlers.

use axum::extract::State;
use bookapp_core::models::category::{
    NewSubcategory, Subcategory, SubcategoryBooks, SubcategoryUpdate,
};

use super::{DELETED, ListParams, require_text};
use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::ApiResponse;

/// `POST /v1/subcategory`
pub async fn create_subcategory_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewSubcategory>,
) -> AppResult<ApiResponse<Subcategory>> {
    require_text("subcategory_name", &body.subcategory_name)?;
    let subcategory = state.storage.subcategories.create(&body).await?;
    Ok(ApiResponse::created(subcategory))
}

/// `GET /v1/subcategory/{id}` — subcategory with one page of its books.
pub async fn get_subcategory_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<SubcategoryBooks>> {
    let books = state
        .storage
        .subcategories
        .books(id, &params.page_request())
        .await?;
    Ok(ApiResponse::ok(books))
}

/// `PUT /v1/subcategory`
pub async fn update_subcategory_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<SubcategoryUpdate>,
) -> AppResult<ApiResponse<Subcategory>> {
    require_text("subcategory_name", &body.subcategory_name)?;
    let subcategory = state.storage.subcategories.update(&body).await?;
    Ok(ApiResponse::ok(subcategory))
}

/// `DELETE /v1/subcategory/{id}`
pub async fn delete_subcategory_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<&'static str>> {
    state.storage.subcategories.delete(id).await?;
    Ok(ApiResponse::ok(DELETED))
}
