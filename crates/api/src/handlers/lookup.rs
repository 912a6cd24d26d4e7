//! Handlers for brand, color and finish lookups.
//!
//! The three lookup collections share these handlers; the router attaches the
//! [`LookupKind`] each mount serves as a request extension.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use lacquer_core::types::DbId;
use lacquer_db::models::lookup::{LookupKind, LookupName};

use crate::error::AppResult;
use crate::middleware::auth::RequireSession;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/{brands|colors|finishes}
///
/// All entries with the number of polishes using each.
pub async fn list_lookups(
    Extension(kind): Extension<LookupKind>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let lookups = state.inventory.list_lookups(kind).await?;
    Ok(Json(DataResponse { data: lookups }))
}

/// POST /api/v1/{brands|colors|finishes}
///
/// Create by name, or return the existing entry with that name.
pub async fn upsert_lookup(
    _session: RequireSession,
    Extension(kind): Extension<LookupKind>,
    State(state): State<AppState>,
    Json(input): Json<LookupName>,
) -> AppResult<impl IntoResponse> {
    let lookup = state.inventory.upsert_lookup(kind, &input.name).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lookup })))
}

/// PUT /api/v1/{brands|colors|finishes}/{id}
pub async fn rename_lookup(
    _session: RequireSession,
    Extension(kind): Extension<LookupKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<LookupName>,
) -> AppResult<impl IntoResponse> {
    let lookup = state.inventory.rename_lookup(kind, id, &input.name).await?;
    tracing::info!(kind = kind.label(), id, name = %lookup.name, "Lookup renamed");
    Ok(Json(DataResponse { data: lookup }))
}

/// DELETE /api/v1/{brands|colors|finishes}/{id}
///
/// Refused with 409 `STILL_REFERENCED` while any polish uses the entry.
pub async fn delete_lookup(
    _session: RequireSession,
    Extension(kind): Extension<LookupKind>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.inventory.delete_lookup(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
