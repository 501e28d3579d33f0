//! Application error types.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookapp_core::auth::policy::PolicyError;
use bookapp_core::auth::{AuthError, TokenError};
use bookapp_core::storage::StorageError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::response::Envelope;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned for any failed login.
pub const BAD_CREDENTIALS: &str = "Incorrect login or password";

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The bearer token expired; the client should refresh and retry.
    #[error("Token is expired")]
    TokenExpired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Denied by the authorization gate. Rendered without a body.
    #[error("Forbidden")]
    Forbidden,

    #[error("Internal server error")]
    Internal(String),
}

#[derive(Serialize)]
struct ExpiredBody {
    error: ExpiredDetail,
}

#[derive(Serialize)]
struct ExpiredDetail {
    status: &'static str,
    message: &'static str,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TokenExpired | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            AppError::Forbidden => status.into_response(),
            AppError::TokenExpired => (
                status,
                Json(ExpiredBody {
                    error: ExpiredDetail {
                        status: "UNAUTHORIZED",
                        message: "Token is expired",
                    },
                }),
            )
                .into_response(),
            AppError::Internal(detail) => {
                error!(error = %detail, "internal error");
                (
                    status,
                    Json(Envelope::new(status, "Internal server error")),
                )
                    .into_response()
            }
            AppError::Validation(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::Unauthorized(m) => (status, Json(Envelope::new(status, m))).into_response(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => AppError::NotFound("Record not found".into()),
            StorageError::Conflict(_) => AppError::Conflict("Record already exists".into()),
            StorageError::InvalidReference(_) => {
                AppError::Validation("Referenced record does not exist".into())
            }
            StorageError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Signing(msg) => AppError::Internal(msg),
            TokenError::InvalidSignature | TokenError::Malformed(_) => {
                AppError::Unauthorized("Invalid token".into())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Validation(BAD_CREDENTIALS.into()),
            AuthError::Token(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<PolicyError> for AppError {
    fn from(e: PolicyError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn forbidden_has_no_body() {
        let resp = AppError::Forbidden.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn expired_token_body() {
        let resp = AppError::TokenExpired.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["status"], "UNAUTHORIZED");
        assert_eq!(json["error"]["message"], "Token is expired");
    }

    #[tokio::test]
    async fn internal_detail_stays_server_side() {
        let resp = AppError::Internal("relation \"books\" does not exist".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "INTERNAL_SERVER_ERROR");
        assert_eq!(json["data"], "Internal server error");
    }

    #[test]
    fn storage_errors_map_to_statuses() {
        let cases = [
            (StorageError::NotFound, StatusCode::NOT_FOUND),
            (StorageError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                StorageError::InvalidReference("fk".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                StorageError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[test]
    fn token_errors_map_to_statuses() {
        assert!(matches!(
            AppError::from(TokenError::Expired),
            AppError::TokenExpired
        ));
        assert_eq!(
            AppError::from(TokenError::InvalidSignature).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::CredentialError).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
