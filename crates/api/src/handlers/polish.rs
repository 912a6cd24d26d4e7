//! Handlers for polish records.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lacquer_core::catalog::url::location;
use lacquer_core::catalog::PageSize;
use lacquer_core::polish::{PolishAttributes, PolishInput};
use lacquer_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::RequireSession;
use crate::query::CatalogQuery;
use crate::response::{BrowseResponse, DataResponse};
use crate::state::AppState;

/// GET /api/v1/polishes
///
/// Paginated browse. `page_size` overrides the configured default.
pub async fn list_polishes(
    State(state): State<AppState>,
    query: CatalogQuery,
) -> AppResult<impl IntoResponse> {
    let page_size = PageSize::from_param(query.page_size, state.config.admin_page_size());
    let page = state
        .inventory
        .browse(&query.filter, query.page, page_size)
        .await?;
    let canonical = location(&query.filter, page.page);

    Ok(Json(DataResponse {
        data: BrowseResponse::new(page, canonical),
    }))
}

/// POST /api/v1/polishes
pub async fn create_polish(
    _session: RequireSession,
    State(state): State<AppState>,
    Json(input): Json<PolishInput>,
) -> AppResult<impl IntoResponse> {
    let polish = state.inventory.create_polish(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: polish })))
}

/// GET /api/v1/polishes/{id}
pub async fn get_polish(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let polish = state.inventory.get_polish(id).await?;
    Ok(Json(DataResponse { data: polish }))
}

/// PUT /api/v1/polishes/{id}
///
/// Replace every field, including the color and finish sets. The image
/// reference is only changed through the image routes.
pub async fn replace_polish(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PolishInput>,
) -> AppResult<impl IntoResponse> {
    let polish = state.inventory.replace_polish(id, input).await?;
    Ok(Json(DataResponse { data: polish }))
}

/// PATCH /api/v1/polishes/{id}
///
/// Quick update of rating, coats, bottles and the like. Omitted fields keep
/// their stored value.
pub async fn update_attributes(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(attrs): Json<PolishAttributes>,
) -> AppResult<impl IntoResponse> {
    let polish = state.inventory.update_attributes(id, attrs).await?;
    Ok(Json(DataResponse { data: polish }))
}

/// DELETE /api/v1/polishes/{id}
pub async fn delete_polish(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.inventory.delete_polish(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
