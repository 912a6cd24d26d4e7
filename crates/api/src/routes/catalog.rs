use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes mounted at `/catalog`.
///
/// ```text
/// GET    /          -> browse_catalog
/// GET    /facets    -> facet_options
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::browse_catalog))
        .route("/facets", get(catalog::facet_options))
}
