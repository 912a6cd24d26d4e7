//! Application router: API routes, stored images and the middleware stack.
//!
//! The binary and the integration tests both go through [`build_app_router`].

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Room for multipart boundaries and headers on top of the image itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full application [`Router`].
///
/// ```text
/// /health     service and store health
/// /api/v1/*   catalog, polishes, lookups
/// /images/*   files written by the local image store
/// ```
///
/// Middleware, outermost first: CORS, request id, tracing, request id
/// propagation, timeout, panic recovery, body limit.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let middleware = ServiceBuilder::new()
        .layer(build_cors_layer(config))
        .map_response(IntoResponse::into_response)
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(CatchPanicLayer::new())
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ));

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .nest_service("/images", ServeDir::new(&config.image_dir))
        .layer(middleware)
        .with_state(state)
}

/// CORS for the configured browser origins. Credentials are allowed so the
/// session cookie reaches mutating routes.
///
/// Panics on an origin that is not a valid header value.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
