//! Domain models.
//!
//! Request and response shapes are shared with `bookapp_api`, so field names
//! follow the public JSON contract (`snake_case`).

pub mod auth;
pub mod author;
pub mod book;
pub mod category;
pub mod comment;
pub mod statistic;
pub mod user;
