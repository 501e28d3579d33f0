//! Business logic shared by several handlers.

pub mod auth;
