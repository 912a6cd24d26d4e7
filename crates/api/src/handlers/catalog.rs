//! Handlers for catalog browsing.
//!
//! The filter arrives as URL query parameters (see
//! [`lacquer_core::catalog::url`]); responses echo the canonical query string
//! so the client can keep its location bar in sync.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use lacquer_core::catalog::url::location;
use lacquer_core::catalog::PageSize;

use crate::error::AppResult;
use crate::query::CatalogQuery;
use crate::response::{BrowseResponse, DataResponse};
use crate::state::AppState;

/// GET /api/v1/catalog
///
/// Every matching polish on a single page.
pub async fn browse_catalog(
    State(state): State<AppState>,
    query: CatalogQuery,
) -> AppResult<impl IntoResponse> {
    let page = state
        .inventory
        .browse(&query.filter, 1, PageSize::Unbounded)
        .await?;

    Ok(Json(DataResponse {
        data: BrowseResponse::new(page, location(&query.filter, 1)),
    }))
}

/// GET /api/v1/catalog/facets
///
/// Options for the filter controls: lookup names, ratings and purchase years.
pub async fn facet_options(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let options = state.inventory.facet_options().await?;
    Ok(Json(DataResponse { data: options }))
}
