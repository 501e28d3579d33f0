//! Admin and superadmin account handlers.

use axum::extract::State;
use bookapp_core::models::auth::Role;
use bookapp_core::models::user::{LoginRequest, NewUser, SessionResponse, User};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::response::ApiResponse;
use crate::services::auth;

/// `POST /v1/admin` — create an admin account (`role_id` 2).
pub async fn create_admin_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewUser>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = auth::register(&state.storage, &state.tokens, &body, Role::Admin).await?;
    Ok(ApiResponse::created(session))
}

/// `POST /v1/admin/login` — admins and superadmins.
pub async fn admin_login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = auth::login(
        &state.storage,
        &state.tokens,
        &body,
        &[Role::Admin, Role::Superadmin],
    )
    .await?;
    Ok(ApiResponse::ok(session))
}

/// `GET /v1/admin`
pub async fn list_admins_handler(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<User>>> {
    let admins = state.storage.users.list_admins().await?;
    Ok(ApiResponse::ok(admins))
}

/// `DELETE /v1/admin/{id}`
pub async fn delete_admin_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<ApiResponse<&'static str>> {
    let role_id = Role::Admin
        .role_id()
        .ok_or_else(|| AppError::Internal("admin role has no account id".into()))?;
    state.storage.users.delete(id, role_id).await?;
    info!(admin_id = id, "admin deleted");
    Ok(ApiResponse::ok("Admin info deleted successfully"))
}

/// `POST /v1/superadmin` — create a superadmin account (`role_id` 1).
pub async fn create_superadmin_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewUser>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = auth::register(&state.storage, &state.tokens, &body, Role::Superadmin).await?;
    Ok(ApiResponse::created(session))
}

/// `POST /v1/superadmin/login`
pub async fn superadmin_login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let session = auth::login(&state.storage, &state.tokens, &body, &[Role::Superadmin]).await?;
    Ok(ApiResponse::ok(session))
}
