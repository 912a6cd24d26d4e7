//! Integration tests for brand, color and finish lookups.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_polish, delete, get, polish_body, post_json, put_json};
use serde_json::json;

#[tokio::test]
async fn upsert_returns_existing_entry() {
    let app = common::build_test_app();

    let first = body_json(post_json(&app, "/api/v1/finishes", json!({ "name": " Holo " })).await)
        .await;
    assert_eq!(first["data"]["name"], "Holo");

    let response = post_json(&app, "/api/v1/finishes", json!({ "name": "Holo" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await;
    assert_eq!(second["data"]["id"], first["data"]["id"]);

    let response = post_json(&app, "/api/v1/finishes", json!({ "name": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_includes_usage_counts() {
    let app = common::build_test_app();
    create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    create_polish(&app, polish_body("OPI", "Wine", &["Red", "Purple"], &["Creme"])).await;

    let json = body_json(get(&app, "/api/v1/colors").await).await;
    let colors = json["data"].as_array().unwrap();
    let red = colors.iter().find(|c| c["name"] == "Red").unwrap();
    let purple = colors.iter().find(|c| c["name"] == "Purple").unwrap();
    assert_eq!(red["polish_count"], 2);
    assert_eq!(purple["polish_count"], 1);

    let json = body_json(get(&app, "/api/v1/brands").await).await;
    assert_eq!(json["data"][0]["name"], "OPI");
    assert_eq!(json["data"][0]["polish_count"], 2);
}

#[tokio::test]
async fn referenced_color_cannot_be_deleted() {
    let app = common::build_test_app();
    let polish = create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;

    let colors = body_json(get(&app, "/api/v1/colors").await).await;
    let red_id = colors["data"][0]["id"].as_i64().unwrap();

    let response = delete(&app, &format!("/api/v1/colors/{red_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "STILL_REFERENCED");
    assert!(json["error"].as_str().unwrap().contains("Red"));

    // Still listed after the refused delete.
    let colors = body_json(get(&app, "/api/v1/colors").await).await;
    assert_eq!(colors["data"].as_array().unwrap().len(), 1);

    delete(&app, &format!("/api/v1/polishes/{}", polish["id"])).await;
    let response = delete(&app, &format!("/api/v1/colors/{red_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn rename_shows_in_catalog_and_rejects_duplicates() {
    let app = common::build_test_app();
    create_polish(&app, polish_body("OPI", "Red", &["Red"], &["Creme"])).await;
    post_json(&app, "/api/v1/brands", json!({ "name": "Essie" })).await;

    let brands = body_json(get(&app, "/api/v1/brands").await).await;
    let opi = brands["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["name"] == "OPI")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/brands/{opi}"),
        json!({ "name": "O.P.I" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(&app, "/api/v1/catalog").await).await;
    assert_eq!(json["data"]["records"][0]["brand"], "O.P.I");

    let response = put_json(
        &app,
        &format!("/api/v1/brands/{opi}"),
        json!({ "name": "Essie" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json(&app, "/api/v1/brands/9999", json!({ "name": "Nope" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
