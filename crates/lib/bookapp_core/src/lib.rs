//! # bookapp_core
//!
//! Core domain logic for Bookapp: credentials, session tokens, the access
//! policy, listing queries and the storage layer.

pub mod auth;
pub mod listing;
pub mod migrate;
pub mod models;
pub mod storage;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
