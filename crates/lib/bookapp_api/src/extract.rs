//! Extractors whose rejections render as [`AppError`].

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::error::AppError;

/// JSON body; malformed or incomplete bodies are a 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters; unparsable segments are a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string; unparsable values are a 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
