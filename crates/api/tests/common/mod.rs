#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use lacquer_api::config::ServerConfig;
use lacquer_api::images::LocalImageStore;
use lacquer_api::router::build_app_router;
use lacquer_api::state::AppState;
use lacquer_db::inventory::Inventory;
use lacquer_db::store::MemoryCatalogStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SESSION_COOKIE: &str = "lacquer_session=test-session";

/// Build a test `ServerConfig` with safe defaults and images under `image_dir`.
pub fn test_config(image_dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        auth_cookie_name: "lacquer_session".to_string(),
        image_dir: image_dir.path().to_path_buf(),
        image_public_url: "http://localhost:3000/images".to_string(),
        admin_page_size: 10,
        max_upload_bytes: 1024 * 1024,
    }
}

/// The application router over an in-memory catalog store.
///
/// Holds the image directory so it outlives the requests of a test.
pub struct TestApp {
    router: Router,
    pub image_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers, exactly as
/// `main.rs` does, but over [`MemoryCatalogStore`] and a temporary image
/// directory.
pub fn build_test_app() -> TestApp {
    let image_dir = tempfile::tempdir().unwrap();
    let config = test_config(&image_dir);

    let images = LocalImageStore::new(
        config.image_dir.clone(),
        config.image_public_url.clone(),
        config.max_upload_bytes,
    )
    .unwrap();

    let state = AppState {
        inventory: Inventory::new(Arc::new(MemoryCatalogStore::new()), Arc::new(images)),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        image_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: Option<Value>,
    with_session: bool,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if with_session {
        builder = builder.header(COOKIE, SESSION_COOKIE);
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, false).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), true).await
}

pub async fn put_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), true).await
}

pub async fn patch_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body), true).await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, true).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn polish_body(brand: &str, name: &str, colors: &[&str], finishes: &[&str]) -> Value {
    json!({
        "brand": brand,
        "name": name,
        "colors": colors,
        "finishes": finishes,
    })
}

/// Create a polish and return its JSON representation.
pub async fn create_polish(app: &TestApp, body: Value) -> Value {
    let response = post_json(app, "/api/v1/polishes", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
