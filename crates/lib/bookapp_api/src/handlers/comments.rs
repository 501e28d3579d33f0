//! Comment request handlers.

use axum::extract::State;
use bookapp_core::models::comment::{Comment, CommentUpdate, NewComment};

use super::require_text;
use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::Caller;
use crate::response::ApiResponse;

/// `POST /v1/comment`
pub async fn create_comment_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(body): AppJson<NewComment>,
) -> AppResult<ApiResponse<Comment>> {
    caller.ensure_self(body.user_id)?;
    require_text("text", &body.text)?;
    let comment = state.storage.comments.create(&body).await?;
    Ok(ApiResponse::created(comment))
}

/// `PUT /v1/comment` — users may only edit their own comments.
pub async fn update_comment_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(body): AppJson<CommentUpdate>,
) -> AppResult<ApiResponse<Comment>> {
    require_text("text", &body.text)?;
    let existing = state.storage.comments.get(body.id).await?;
    caller.ensure_self(existing.user_id)?;
    let comment = state.storage.comments.update(&body).await?;
    Ok(ApiResponse::ok(comment))
}

/// `DELETE /v1/comment/{id}`
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<&'static str>> {
    let existing = state.storage.comments.get(id).await?;
    caller.ensure_self(existing.user_id)?;
    state.storage.comments.delete(id).await?;
    Ok(ApiResponse::ok("Comment deleted successfully"))
}
