//! Handlers for a polish's image.
//!
//! An image is attached either as a multipart upload (field `file`) or by
//! JSON body `{ "url": "..." }`, in which case the server fetches it.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use lacquer_core::image::ImageSource;
use lacquer_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireSession;
use crate::query::ImageUrlBody;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the image bytes.
const FILE_FIELD: &str = "file";

/// POST /api/v1/polishes/{id}/image
pub async fn upload_image(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    request: Request,
) -> AppResult<impl IntoResponse> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let source = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_file_field(multipart).await?
    } else {
        let Json(body) = Json::<ImageUrlBody>::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let url = body.url.trim();
        if url.is_empty() {
            return Err(AppError::BadRequest("Image URL is required".into()));
        }
        ImageSource::RemoteUrl(url.to_string())
    };

    let polish = state.inventory.upload_image(id, source).await?;
    Ok(Json(DataResponse { data: polish }))
}

/// DELETE /api/v1/polishes/{id}/image
///
/// Forget the image. The polish goes back to "not checked yet".
pub async fn clear_image(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let polish = state.inventory.clear_image(id).await?;
    Ok(Json(DataResponse { data: polish }))
}

/// POST /api/v1/polishes/{id}/image/none
///
/// Record that no image could be found for this polish.
pub async fn mark_no_image(
    _session: RequireSession,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let polish = state.inventory.mark_no_image(id).await?;
    Ok(Json(DataResponse { data: polish }))
}

async fn read_file_field(mut multipart: Multipart) -> AppResult<ImageSource> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".into()));
        }
        return Ok(ImageSource::Bytes(bytes.to_vec()));
    }
    Err(AppError::BadRequest(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}
