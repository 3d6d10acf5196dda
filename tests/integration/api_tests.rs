//! API integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use lendlog_server::{
    api,
    config::LedgerConfig,
    repository::Repository,
    services::Services,
    AppState,
};
use reqwest::Client;
use serde_json::{json, Value};
use tower::ServiceExt;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn app_with(ledger: LedgerConfig) -> Router {
    let services = Services::new(Repository::in_memory(), ledger);
    api::router(AppState {
        services: Arc::new(services),
    })
}

fn app() -> Router {
    app_with(LedgerConfig::default())
}

/// Send one request to the in-process router and decode the JSON answer
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri))
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn add_book(app: &Router, name: &str, category: &str, rent: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/books",
        Some(json!({ "name": name, "category": category, "rent": rent })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn lend(
    app: &Router,
    action: &str,
    book: &str,
    issuer: &str,
    date: &str,
) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/books/{}", action),
        Some(json!({ "bookName": book, "issuer": issuer, "date": date })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_dune_rent_scenario() {
    let app = app();
    add_book(&app, "Dune", "Fiction", 7).await;

    let (status, issued) = lend(&app, "issue", "dune", "Bob", "2024-01-01T00:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(issued["_id"].is_string());

    let (status, returned) = lend(&app, "return", "DUNE", "Bob", "2024-01-04T00:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(returned["_id"], issued["_id"]);

    let (status, body) = send(&app, Method::GET, "/books/rent?name=dune", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "totalRent": 21 }));
}

#[tokio::test]
async fn test_return_without_issue_is_conflict() {
    let app = app();
    add_book(&app, "Dune", "Fiction", 7).await;

    let (status, body) = lend(&app, "return", "Dune", "Bob", "2024-01-04T00:00:00Z").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NoActiveIssue");
}

#[tokio::test]
async fn test_unknown_book_is_not_found() {
    let app = app();

    let (status, body) = lend(&app, "issue", "Solaris", "Bob", "2024-01-01T00:00:00Z").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchBook");

    let (status, _) = send(&app, Method::GET, "/books/rent?name=solaris", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_date_is_rejected() {
    let app = app();
    add_book(&app, "Dune", "Fiction", 7).await;

    let (status, body) = lend(&app, "issue", "Dune", "Bob", "01/01/2024").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, _) = send(
        &app,
        Method::GET,
        "/books/date?start=2024-01-01&end=2024-02-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_fields_use_error_body() {
    let app = app();
    add_book(&app, "Dune", "Fiction", 7).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/books/issue",
        Some(json!({ "issuer": "Bob", "date": "2024-01-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 7);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("bookName")));

    let (status, body) = send(&app, Method::GET, "/books/rent", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = send(&app, Method::GET, "/books?lower=cheap", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_issuer_summary_and_history() {
    let app = app();
    add_book(&app, "Dune", "Fiction", 7).await;
    add_book(&app, "Cosmos", "Science", 12).await;

    lend(&app, "issue", "Dune", "Bob", "2024-01-01T00:00:00Z").await;
    lend(&app, "issue", "Dune", "Ann", "2024-01-02T00:00:00Z").await;
    lend(&app, "issue", "Cosmos", "Ann", "2024-01-03T00:00:00Z").await;
    lend(&app, "return", "Dune", "Bob", "2024-01-05T00:00:00Z").await;

    let (status, body) = send(&app, Method::GET, "/books/issuers?name=Dune", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "issuerCount": 2, "currentIssuers": ["Ann"] }));

    let (status, _) = send(&app, Method::GET, "/books/issuers?name=dune", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/books/info?issuer=aN", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Dune", "Cosmos"]));
}

#[tokio::test]
async fn test_activity_between_dates() {
    let app = app();
    add_book(&app, "Dune", "Fiction", 7).await;

    lend(&app, "issue", "Dune", "Bob", "2024-01-01T00:00:00Z").await;
    lend(&app, "return", "Dune", "Bob", "2024-01-04T00:00:00Z").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/books/date?start=2024-01-01T00:00:00Z&end=2024-01-10T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "book": "Dune", "issuer": "Bob" }]));

    let (status, body) = send(
        &app,
        Method::GET,
        "/books/date?start=2025-01-01T00:00:00Z&end=2025-02-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_catalog_search_and_delete() {
    let app = app();
    add_book(&app, "Dune", "Fiction", 7).await;
    add_book(&app, "Dune Messiah", "Fiction", 5).await;
    add_book(&app, "Cosmos", "Science", 12).await;

    let (status, body) = send(&app, Method::GET, "/books?name=dune", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, body) = send(&app, Method::GET, "/books?lower=5&higher=12", None).await;
    assert_eq!(body[0]["name"], "Dune");
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (_, body) = send(&app, Method::GET, "/books?category=Science", None).await;
    assert_eq!(body[0]["name"], "Cosmos");

    let (status, body) = send(&app, Method::DELETE, "/books?name=Dune", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], "Book deleted successfully");

    let (status, _) = send(&app, Method::DELETE, "/books?name=Dune", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_book_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/books",
        Some(json!({ "name": "Dune", "category": "Fiction", "rent": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_policies_reject_reissue_and_backdated_return() {
    let app = app_with(LedgerConfig {
        allow_reissue: false,
        reject_backdated_returns: true,
        ..Default::default()
    });
    add_book(&app, "Dune", "Fiction", 7).await;

    lend(&app, "issue", "Dune", "Bob", "2024-01-05T00:00:00Z").await;
    let (status, body) = lend(&app, "issue", "Dune", "Bob", "2024-01-06T00:00:00Z").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyIssued");

    let (status, body) = lend(&app, "return", "Dune", "Bob", "2024-01-01T00:00:00Z").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InvalidDateRange");
}

#[tokio::test]
#[ignore] // Run against a live server with: cargo test -- --ignored
async fn test_live_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_live_return_without_issue() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/return", BASE_URL))
        .json(&json!({
            "bookName": "a book nobody has",
            "issuer": "nobody",
            "date": "2024-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_client_error());
}
