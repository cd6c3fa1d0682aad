//! Integration tests for point registration and browsing.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and the item seed
//!   applied (`ecoponto-cli migrate && ecoponto-cli seed items`)
//! - The server running (`cargo run -p ecoponto-server`)
//!
//! Run with: cargo test -p ecoponto-integration-tests -- --ignored

use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde_json::Value;
use uuid::Uuid;

use ecoponto_integration_tests::{api_base_url, count_point_items, count_points_named, test_pool};

/// A unique point name per test run, so row assertions never collide with
/// leftovers from earlier runs.
fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

fn submission_form(name: &str) -> Form {
    Form::new()
        .text("name", name.to_owned())
        .text("email", "e@x.com")
        .text("phone", "11999999999")
        .text("uf", "SP")
        .text("city", "São Paulo")
        .text("lat", "-23.5")
        .text("lon", "-46.6")
        .text("items", "1,3")
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_create_point_without_image() {
    let client = Client::new();
    let pool = test_pool().await;
    let name = unique_name("Eco Center");

    let resp = client
        .post(format!("{}/points", api_base_url()))
        .multipart(submission_form(&name))
        .send()
        .await
        .expect("Failed to post point");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");

    assert_eq!(body["name"], name.as_str());
    assert_eq!(body["uf"], "SP");
    // No image part was sent; the reference stays null.
    assert!(body["image_url"].is_null());

    let id = i32::try_from(body["id"].as_i64().expect("id missing")).expect("id out of range");

    // Exactly one point row and one association row per submitted item.
    assert_eq!(count_points_named(&pool, &name).await, 1);
    assert_eq!(count_point_items(&pool, id).await, 2);

    let items: Vec<i64> = body["items"]
        .as_array()
        .expect("items missing")
        .iter()
        .map(|item| item["id"].as_i64().expect("item id missing"))
        .collect();
    assert_eq!(items, vec![1, 3]);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_create_point_with_image() {
    let client = Client::new();
    let name = unique_name("Eco Center");

    let image = Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .file_name("photo.jpg")
        .mime_str("image/jpeg")
        .expect("valid mime");

    let resp = client
        .post(format!("{}/points", api_base_url()))
        .multipart(submission_form(&name).part("image", image))
        .send()
        .await
        .expect("Failed to post point");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");

    let image_url = body["image_url"].as_str().expect("image_url missing");
    assert!(image_url.contains("/uploads/"));
    assert!(image_url.ends_with("photo.jpg"));

    // The stored file is served statically.
    let stored = client
        .get(image_url)
        .send()
        .await
        .expect("Failed to fetch stored image");
    assert_eq!(stored.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_invalid_email_rejected_with_field_error() {
    let client = Client::new();
    let pool = test_pool().await;
    let name = unique_name("Bad Email");

    let form = Form::new()
        .text("name", name.clone())
        .text("email", "not-an-email")
        .text("uf", "SP")
        .text("city", "São Paulo")
        .text("lat", "-23.5")
        .text("lon", "-46.6")
        .text("items", "1");

    let resp = client
        .post(format!("{}/points", api_base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post point");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors missing")
        .iter()
        .map(|e| e["field"].as_str().expect("field missing"))
        .collect();
    assert_eq!(fields, vec!["email"]);

    // No point row was created.
    assert_eq!(count_points_named(&pool, &name).await, 0);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_validation_enumerates_every_failing_field() {
    let client = Client::new();

    // Only a phone, and a malformed one at that.
    let form = Form::new().text("phone", "not-a-phone");

    let resp = client
        .post(format!("{}/points", api_base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post point");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors missing")
        .iter()
        .map(|e| e["field"].as_str().expect("field missing"))
        .collect();

    for expected in ["name", "email", "phone", "uf", "city", "lat", "lon", "items"] {
        assert!(fields.contains(&expected), "missing field {expected}");
    }
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_unknown_item_rolls_back_point_insert() {
    let client = Client::new();
    let pool = test_pool().await;
    let name = unique_name("Atomicity");

    // Item 999999 exists in no catalog; the association insert fails
    // after the point insert succeeded inside the transaction.
    let form = Form::new()
        .text("name", name.clone())
        .text("email", "e@x.com")
        .text("uf", "SP")
        .text("city", "São Paulo")
        .text("lat", "-23.5")
        .text("lon", "-46.6")
        .text("items", "1,999999");

    let resp = client
        .post(format!("{}/points", api_base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post point");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // All-or-nothing: the rolled-back point left no row behind.
    assert_eq!(count_points_named(&pool, &name).await, 0);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_list_points_filters() {
    let client = Client::new();
    let base_url = api_base_url();
    let name = unique_name("Filterable");

    let form = Form::new()
        .text("name", name.clone())
        .text("email", "e@x.com")
        .text("uf", "RR")
        .text("city", "Boa Vista")
        .text("lat", "2.82")
        .text("lon", "-60.67")
        .text("items", "1");
    let resp = client
        .post(format!("{base_url}/points"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post point");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Matching filter finds the point.
    let body: Value = client
        .get(format!("{base_url}/points?uf=RR&city=Boa%20Vista&items=1"))
        .send()
        .await
        .expect("Failed to list points")
        .json()
        .await
        .expect("Failed to parse response");
    let names: Vec<&str> = body
        .as_array()
        .expect("expected array")
        .iter()
        .map(|p| p["name"].as_str().expect("name missing"))
        .collect();
    assert!(names.contains(&name.as_str()));

    // A different city filters it out.
    let body: Value = client
        .get(format!("{base_url}/points?uf=RR&city=Pacaraima"))
        .send()
        .await
        .expect("Failed to list points")
        .json()
        .await
        .expect("Failed to parse response");
    let names: Vec<&str> = body
        .as_array()
        .expect("expected array")
        .iter()
        .map(|p| p["name"].as_str().expect("name missing"))
        .collect();
    assert!(!names.contains(&name.as_str()));

    // Empty query values are treated as omitted filters.
    let resp = client
        .get(format!("{base_url}/points?uf=&city=&items="))
        .send()
        .await
        .expect("Failed to list points");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_point_detail_and_not_found() {
    let client = Client::new();
    let base_url = api_base_url();
    let name = unique_name("Detail");

    let created: Value = client
        .post(format!("{base_url}/points"))
        .multipart(submission_form(&name))
        .send()
        .await
        .expect("Failed to post point")
        .json()
        .await
        .expect("Failed to parse response");
    let id = created["id"].as_i64().expect("id missing");

    let detail: Value = client
        .get(format!("{base_url}/points/{id}"))
        .send()
        .await
        .expect("Failed to fetch point")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(detail["name"], name.as_str());
    assert_eq!(detail["items"].as_array().map(Vec::len), Some(2));

    let resp = client
        .get(format!("{base_url}/points/999999999"))
        .send()
        .await
        .expect("Failed to fetch point");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
