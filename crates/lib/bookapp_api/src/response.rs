//! Uniform `{status, description, data}` response envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Body shape shared by every success and error response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub description: &'static str,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(code: StatusCode, data: T) -> Self {
        let (status, description) = status_text(code);
        Self {
            status,
            description,
            data,
        }
    }
}

/// Success response carrying `data` in the envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    code: StatusCode,
    data: T,
}

impl<T> ApiResponse<T> {
    /// 200 `OK`.
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK,
            data,
        }
    }

    /// 201 `CREATED`.
    pub fn created(data: T) -> Self {
        Self {
            code: StatusCode::CREATED,
            data,
        }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(Envelope::new(self.code, self.data))).into_response()
    }
}

/// Envelope `status` and `description` for a status code.
pub fn status_text(code: StatusCode) -> (&'static str, &'static str) {
    match code {
        StatusCode::OK => ("OK", "The request has succeeded"),
        StatusCode::CREATED => (
            "CREATED",
            "The request has been fulfilled and has resulted in one or more new resources being created",
        ),
        StatusCode::BAD_REQUEST => (
            "BAD_REQUEST",
            "The server cannot or will not process the request due to something that is perceived to be a client error",
        ),
        StatusCode::UNAUTHORIZED => (
            "UNAUTHORIZED",
            "The request has not been applied because it lacks valid authentication credentials",
        ),
        StatusCode::FORBIDDEN => (
            "FORBIDDEN",
            "The server understood the request but refuses to authorize it",
        ),
        StatusCode::NOT_FOUND => (
            "NOT_FOUND",
            "The origin server did not find a current representation for the target resource",
        ),
        StatusCode::CONFLICT => (
            "CONFLICT",
            "The request could not be completed due to a conflict with the current state of the target resource",
        ),
        _ => (
            "INTERNAL_SERVER_ERROR",
            "The server encountered an unexpected condition that prevented it from fulfilling the request",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_status_name() {
        let body = serde_json::to_value(Envelope::new(StatusCode::CREATED, 7)).unwrap();
        assert_eq!(body["status"], "CREATED");
        assert_eq!(body["data"], 7);
        assert!(body["description"].as_str().is_some_and(|d| !d.is_empty()));
    }

    #[test]
    fn created_response_uses_201() {
        let resp = ApiResponse::created("x").into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
