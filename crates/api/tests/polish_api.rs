//! Integration tests for polish CRUD, the session guard and image handling.

mod common;

use std::io::Cursor;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE};
use axum::http::{Method, Request, StatusCode};
use common::{
    body_bytes, body_json, create_polish, delete, get, patch_json, polish_body, post_json,
    put_json, send, TestApp, SESSION_COOKIE,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::json;
use tower::ServiceExt;

fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(16, 16))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

async fn upload_multipart(app: &TestApp, id: i64, bytes: &[u8]) -> axum::response::Response {
    let boundary = "lacquer-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"polish.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/polishes/{id}/image"))
        .header(COOKIE, SESSION_COOKIE)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.router().oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get() {
    let app = common::build_test_app();
    let mut body = polish_body(" OPI ", "Big Apple Red", &["Red", "Red", ""], &["Creme"]);
    body["rating"] = json!("A-");
    body["purchase_year"] = json!(2021);

    let created = create_polish(&app, body).await;
    assert_eq!(created["brand"], "OPI");
    assert_eq!(created["colors"], json!(["Red"]));
    assert_eq!(created["rating"], "A-");

    let id = created["id"].as_i64().unwrap();
    let response = get(&app, &format!("/api/v1/polishes/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Big Apple Red");
    assert_eq!(json["data"]["purchase_year"], 2021);
}

#[tokio::test]
async fn mutations_require_session_cookie() {
    let app = common::build_test_app();

    let response = send(
        &app,
        Method::POST,
        "/api/v1/polishes",
        Some(polish_body("OPI", "Red", &["Red"], &["Creme"])),
        false,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let response = send(&app, Method::DELETE, "/api/v1/colors/1", None, false).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reads stay public.
    assert_eq!(get(&app, "/api/v1/catalog").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_without_finish_is_rejected() {
    let app = common::build_test_app();
    let response = post_json(
        &app,
        "/api/v1/polishes",
        polish_body("OPI", "Red", &["Red"], &[" "]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "At least one finish is required");
}

#[tokio::test]
async fn duplicate_brand_and_name_conflicts() {
    let app = common::build_test_app();
    create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;

    let response = post_json(
        &app,
        "/api/v1/polishes",
        polish_body("OPI", "Red", &["Pink"], &["Jelly"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn replace_swaps_colors_and_finishes() {
    let app = common::build_test_app();
    let created = create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    let id = created["id"].as_i64().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/polishes/{id}"),
        polish_body("OPI", "Red", &["Orange", "Red"], &["Matte"]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["colors"], json!(["Orange", "Red"]));
    assert_eq!(json["data"]["finishes"], json!(["Matte"]));
}

#[tokio::test]
async fn patch_updates_only_given_attributes() {
    let app = common::build_test_app();
    let mut body = polish_body("OPI", "Red", &["Red"], &["Creme"]);
    body["coats"] = json!(2);
    let created = create_polish(&app, body).await;
    let id = created["id"].as_i64().unwrap();

    let response = patch_json(
        &app,
        &format!("/api/v1/polishes/{id}"),
        json!({ "rating": "B+", "total_bottles": 2 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["rating"], "B+");
    assert_eq!(json["data"]["total_bottles"], 2);
    assert_eq!(json["data"]["coats"], 2);

    let response = patch_json(&app, &format!("/api/v1/polishes/{id}"), json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_then_missing() {
    let app = common::build_test_app();
    let created = create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    let uri = format!("/api/v1/polishes/{}", created["id"]);

    assert_eq!(delete(&app, &uri).await.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    assert_eq!(delete(&app, &uri).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uploaded_image_is_stored_and_served() {
    let app = common::build_test_app();
    let created = create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    let id = created["id"].as_i64().unwrap();

    let response = upload_multipart(&app, id, &png_bytes()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let url = json["data"]["image_url"].as_str().unwrap().to_string();
    assert!(url.starts_with("http://localhost:3000/images/opi-red-"));

    let key = url.rsplit('/').next().unwrap();
    let response = get(&app, &format!("/images/{key}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let served = body_bytes(response).await;
    assert_eq!(image::guess_format(&served).unwrap(), ImageFormat::Jpeg);

    let json = body_json(get(&app, "/api/v1/catalog?image=with").await).await;
    assert_eq!(json["data"]["total"], 1);

    // Replacing the image removes the previous file.
    upload_multipart(&app, id, &png_bytes()).await;
    assert!(!app.image_dir.path().join(key).exists());
}

#[tokio::test]
async fn non_image_upload_is_415() {
    let app = common::build_test_app();
    let created = create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    let id = created["id"].as_i64().unwrap();

    let response = upload_multipart(&app, id, b"plain text, not a picture").await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let json = body_json(get(&app, &format!("/api/v1/polishes/{id}")).await).await;
    assert!(json["data"]["image_url"].is_null());
}

#[tokio::test]
async fn image_url_body_must_not_be_blank() {
    let app = common::build_test_app();
    let created = create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    let id = created["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        &format!("/api/v1/polishes/{id}/image"),
        json!({ "url": "  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mark_no_image_then_clear() {
    let app = common::build_test_app();
    let created = create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    let id = created["id"].as_i64().unwrap();

    let response = post_json(&app, &format!("/api/v1/polishes/{id}/image/none"), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["data"]["image_url"],
        "no-image-available"
    );

    // The sentinel counts as neither "with" nor "without" an image.
    let json = body_json(get(&app, "/api/v1/catalog?image=with").await).await;
    assert_eq!(json["data"]["total"], 0);
    let json = body_json(get(&app, "/api/v1/catalog?image=without").await).await;
    assert_eq!(json["data"]["total"], 0);

    let response = delete(&app, &format!("/api/v1/polishes/{id}/image")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["image_url"].is_null());

    let json = body_json(get(&app, "/api/v1/catalog?image=without").await).await;
    assert_eq!(json["data"]["total"], 1);
}
