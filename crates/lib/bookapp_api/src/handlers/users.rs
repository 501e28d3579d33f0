//! Client account handlers.

use axum::extract::State;
use bookapp_core::models::auth::{Role, TokenPair};
use bookapp_core::models::user::{
    LoginRequest, NewUser, RefreshRequest, SessionResponse, User, UserProfile, UserUpdate,
};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::Caller;
use crate::response::ApiResponse;
use crate::services::auth;

/// `POST /v1/client/register` — create a user account (`role_id` 3).
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewUser>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = auth::register(&state.storage, &state.tokens, &body, Role::User).await?;
    Ok(ApiResponse::created(session))
}

/// `POST /v1/client/login`
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = auth::login(&state.storage, &state.tokens, &body, &[Role::User]).await?;
    Ok(ApiResponse::ok(session))
}

/// `POST /v1/client/refresh` — exchange a refresh token for a new pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RefreshRequest>,
) -> AppResult<ApiResponse<TokenPair>> {
    let pair = auth::refresh(&state.storage, &state.tokens, &body.refresh_token).await?;
    Ok(ApiResponse::ok(pair))
}

/// `GET /v1/client/{id}` — profile with liked books.
pub async fn get_user_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<UserProfile>> {
    caller.ensure_self(id)?;
    let profile = state.storage.users.get(id).await?;
    Ok(ApiResponse::ok(profile))
}

/// `PUT /v1/client`
pub async fn update_user_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppJson(body): AppJson<UserUpdate>,
) -> AppResult<ApiResponse<User>> {
    caller.ensure_self(body.id)?;
    let user = auth::update_account(&state.storage, &body).await?;
    Ok(ApiResponse::ok(user))
}

/// `DELETE /v1/client/{id}`
pub async fn delete_user_handler(
    State(state): State<AppState>,
    caller: Caller,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<&'static str>> {
    caller.ensure_self(id)?;
    let role_id = Role::User
        .role_id()
        .ok_or_else(|| AppError::Internal("user role has no account id".into()))?;
    state.storage.users.delete(id, role_id).await?;
    Ok(ApiResponse::ok("User info deleted successfully"))
}
