//! Request handlers.

pub mod admins;
pub mod authors;
pub mod books;
pub mod categories;
pub mod comments;
pub mod health;
pub mod statistics;
pub mod subcategories;
pub mod users;

use bookapp_core::listing::PageRequest;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Message returned by delete endpoints.
pub(crate) const DELETED: &str = "Successfully deleted";

/// Listing query parameters. Kept as raw strings so unusable paging values
/// fall back to defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub search: Option<String>,
    pub id: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub author_id: Option<String>,
    pub user_id: Option<String>,
}

impl ListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.limit.as_deref(), self.page.as_deref())
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// Parse an optional integer id; blank counts as absent.
pub(crate) fn optional_id(name: &str, raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{name} must be an integer"))),
    }
}

pub(crate) fn required_id(name: &str, raw: Option<&str>) -> AppResult<i64> {
    optional_id(name, raw)?.ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

/// Reject blank required text fields.
pub(crate) fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_or_reject() {
        assert_eq!(optional_id("author_id", None).unwrap(), None);
        assert_eq!(optional_id("author_id", Some(" ")).unwrap(), None);
        assert_eq!(optional_id("author_id", Some("0")).unwrap(), Some(0));
        assert!(optional_id("author_id", Some("x1")).is_err());
        assert!(required_id("id", None).is_err());
        assert_eq!(required_id("id", Some("12")).unwrap(), 12);
    }

    #[test]
    fn paging_falls_back_to_defaults() {
        let params = ListParams {
            limit: Some("ten".into()),
            page: Some("-1".into()),
            ..ListParams::default()
        };
        let page = params.page_request();
        assert_eq!((page.limit(), page.page()), (10, 1));
    }
}
