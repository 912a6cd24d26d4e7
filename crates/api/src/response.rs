//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use lacquer_core::catalog::{CatalogPage, PolishView};
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A catalog page plus the canonical query string that reproduces it.
#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub records: Vec<PolishView>,
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
    /// Encoded filter (and page) for the browser location bar.
    pub query: String,
}

impl BrowseResponse {
    pub fn new(page: CatalogPage, query: String) -> Self {
        Self {
            records: page.records,
            total: page.total,
            total_pages: page.total_pages,
            page: page.page,
            page_size: page.page_size,
            query,
        }
    }
}
