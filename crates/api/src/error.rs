use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lacquer_core::error::CoreError;
use lacquer_core::image::ImageError;
use lacquer_db::inventory::InventoryError;
use lacquer_db::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `lacquer_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An image storage error.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => AppError::Core(core),
            StoreError::Database(db) => AppError::Database(db),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Store(store) => store.into(),
            InventoryError::Image(image) => AppError::Image(image),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::StillReferenced { .. } => {
                    (StatusCode::CONFLICT, "STILL_REFERENCED", core.to_string())
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Image errors ---
            AppError::Image(err) => classify_image_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Foreign key violations map to 409 (a lookup still referenced by polishes).
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique constraint violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
                // PostgreSQL foreign key violation
                Some("23503") => {
                    return (
                        StatusCode::CONFLICT,
                        "STILL_REFERENCED",
                        format!("Row is still referenced: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

fn classify_image_error(err: &ImageError) -> (StatusCode, &'static str, String) {
    match err {
        ImageError::UnsupportedFormat => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_IMAGE",
            err.to_string(),
        ),
        ImageError::TooLarge { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE", err.to_string())
        }
        ImageError::Fetch(_) => (StatusCode::BAD_GATEWAY, "IMAGE_FETCH_FAILED", err.to_string()),
        ImageError::Processing(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "IMAGE_PROCESSING_FAILED",
            err.to_string(),
        ),
        ImageError::InvalidKey(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string()),
        ImageError::Io(io) => {
            tracing::error!(error = %io, "Image storage I/O error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
