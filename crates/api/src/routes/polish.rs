//! Route definitions for polish records and their images.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{image, polish};
use crate::state::AppState;

/// Polish routes mounted at `/polishes`.
///
/// ```text
/// GET    /                  -> list_polishes
/// POST   /                  -> create_polish
/// GET    /{id}              -> get_polish
/// PUT    /{id}              -> replace_polish
/// PATCH  /{id}              -> update_attributes
/// DELETE /{id}              -> delete_polish
/// POST   /{id}/image        -> upload_image
/// DELETE /{id}/image        -> clear_image
/// POST   /{id}/image/none   -> mark_no_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(polish::list_polishes).post(polish::create_polish))
        .route(
            "/{id}",
            get(polish::get_polish)
                .put(polish::replace_polish)
                .patch(polish::update_attributes)
                .delete(polish::delete_polish),
        )
        .route(
            "/{id}/image",
            post(image::upload_image).delete(image::clear_image),
        )
        .route("/{id}/image/none", post(image::mark_no_image))
}
