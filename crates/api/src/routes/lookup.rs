use axum::routing::{get, put};
use axum::{Extension, Router};
use lacquer_db::models::lookup::LookupKind;

use crate::handlers::lookup;
use crate::state::AppState;

/// Lookup routes for one `kind`, mounted at `/brands`, `/colors` or
/// `/finishes`.
///
/// ```text
/// GET    /        -> list_lookups
/// POST   /        -> upsert_lookup
/// PUT    /{id}    -> rename_lookup
/// DELETE /{id}    -> delete_lookup
/// ```
pub fn router(kind: LookupKind) -> Router<AppState> {
    Router::new()
        .route("/", get(lookup::list_lookups).post(lookup::upsert_lookup))
        .route(
            "/{id}",
            put(lookup::rename_lookup).delete(lookup::delete_lookup),
        )
        .layer(Extension(kind))
}
