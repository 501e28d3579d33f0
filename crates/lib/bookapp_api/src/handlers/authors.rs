//! Author request handlers.

use axum::extract::State;
use bookapp_core::models::author::{Author, AuthorDetail, AuthorPage, AuthorUpdate, NewAuthor};

use super::{ListParams, require_text};
use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::ApiResponse;

fn validate(author: &NewAuthor) -> AppResult<()> {
    require_text("first_name", &author.first_name)?;
    require_text("last_name", &author.last_name)
}

/// `POST /v1/author`
pub async fn create_author_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewAuthor>,
) -> AppResult<ApiResponse<Author>> {
    validate(&body)?;
    let author = state.storage.authors.create(&body).await?;
    Ok(ApiResponse::created(author))
}

/// `GET /v1/author/{id}` — author with their books.
pub async fn get_author_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<AuthorDetail>> {
    let author = state.storage.authors.get(id).await?;
    Ok(ApiResponse::ok(author))
}

/// `GET /v1/author/list` — paginated, searchable by first or last name.
pub async fn list_authors_handler(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<ApiResponse<AuthorPage>> {
    let page = state
        .storage
        .authors
        .list(params.search(), &params.page_request())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// `PUT /v1/author`
pub async fn update_author_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<AuthorUpdate>,
) -> AppResult<ApiResponse<Author>> {
    validate(&body.fields)?;
    let author = state.storage.authors.update(&body).await?;
    Ok(ApiResponse::ok(author))
}

/// `DELETE /v1/author/{id}` — also removes the author's books.
pub async fn delete_author_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<&'static str>> {
    state.storage.authors.delete(id).await?;
    Ok(ApiResponse::ok("Author deleted"))
}
