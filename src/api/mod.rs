//! API handlers for Lendlog REST endpoints

pub mod books;
pub mod health;
pub mod ledger;
pub mod openapi;
pub mod reports;

use axum::{
    extract::{FromRequest, FromRequestParts},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Timestamp layout accepted on the wire
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp from a request field
pub fn parse_timestamp(field: &str, value: &str) -> AppResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| {
            AppError::Validation(format!(
                "{} must use the format YYYY-MM-DDTHH:MM:SSZ, got '{}'",
                field, value
            ))
        })
}

/// JSON body extractor whose rejections use the application error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the application error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route(
            "/books",
            get(books::search_books)
                .post(books::create_book)
                .delete(books::delete_book),
        )
        // Ledger
        .route("/books/issue", post(ledger::issue_book))
        .route("/books/return", post(ledger::return_book))
        // Reports
        .route("/books/rent", get(reports::total_rent))
        .route("/books/issuers", get(reports::issuer_summary))
        .route("/books/info", get(reports::books_issued_to))
        .route("/books/date", get(reports::activity_between))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
