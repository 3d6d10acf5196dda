//! Issue and return endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;

use super::{parse_timestamp, ApiJson};

/// Issue or return request
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LendingRequest {
    /// Case-insensitive part of the book name
    pub book_name: String,
    /// Who borrows or returns the book
    pub issuer: String,
    /// When it happened (YYYY-MM-DDTHH:MM:SSZ)
    pub date: String,
}

/// Identity of the recorded transaction
#[derive(Serialize, ToSchema)]
pub struct TransactionCreated {
    #[serde(rename = "_id")]
    pub id: Uuid,
}

/// Issue a book to an issuer
#[utoipa::path(
    post,
    path = "/books/issue",
    tag = "ledger",
    request_body = LendingRequest,
    responses(
        (status = 201, description = "Issue recorded", body = TransactionCreated),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already issued to this issuer",
            body = crate::error::ErrorResponse)
    )
)]
pub async fn issue_book(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<LendingRequest>,
) -> AppResult<(StatusCode, Json<TransactionCreated>)> {
    let date = parse_timestamp("date", &request.date)?;

    let id = state
        .services
        .ledger
        .issue_book(&request.book_name, &request.issuer, date)
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

/// Return a book and record the rent due
#[utoipa::path(
    post,
    path = "/books/return",
    tag = "ledger",
    request_body = LendingRequest,
    responses(
        (status = 201, description = "Return recorded", body = TransactionCreated),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "No active issue for this book and issuer",
            body = crate::error::ErrorResponse),
        (status = 422, description = "Return dated before its issue",
            body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<LendingRequest>,
) -> AppResult<(StatusCode, Json<TransactionCreated>)> {
    let date = parse_timestamp("date", &request.date)?;

    let id = state
        .services
        .ledger
        .return_book(&request.book_name, &request.issuer, date)
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}
