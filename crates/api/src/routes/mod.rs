pub mod catalog;
pub mod health;
pub mod lookup;
pub mod polish;

use axum::Router;
use lacquer_db::models::lookup::LookupKind;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /catalog                          unbounded browse (GET)
/// /catalog/facets                   filter options (GET)
///
/// /polishes                         paginated browse, create (GET, POST)
/// /polishes/{id}                    get, replace, update attributes, delete
/// /polishes/{id}/image              upload, remove (POST, DELETE)
/// /polishes/{id}/image/none         mark no image available (POST)
///
/// /brands                           list, upsert (GET, POST)
/// /brands/{id}                      rename, delete (PUT, DELETE)
/// /colors                           list, upsert (GET, POST)
/// /colors/{id}                      rename, delete (PUT, DELETE)
/// /finishes                         list, upsert (GET, POST)
/// /finishes/{id}                    rename, delete (PUT, DELETE)
/// ```
///
/// Mutating routes require the session cookie (see
/// [`crate::middleware::auth::RequireSession`]).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog::router())
        .nest("/polishes", polish::router())
        .nest("/brands", lookup::router(LookupKind::Brand))
        .nest("/colors", lookup::router(LookupKind::Color))
        .nest("/finishes", lookup::router(LookupKind::Finish))
}
