//! Rent and lending history endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::transaction::{ActivityEntry, IssuerSummary},
};

use super::{parse_timestamp, ApiQuery};

/// Book name query
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookNameQuery {
    /// Book name
    pub name: String,
}

/// Issuer query
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IssuerQuery {
    /// Case-insensitive part of the issuer label
    pub issuer: String,
}

/// Date range query (exclusive bounds)
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// Start, YYYY-MM-DDTHH:MM:SSZ
    pub start: String,
    /// End, YYYY-MM-DDTHH:MM:SSZ
    pub end: String,
}

/// Rent total for one book
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalRentResponse {
    pub total_rent: i64,
}

/// Total rent collected for a book
#[utoipa::path(
    get,
    path = "/books/rent",
    tag = "reports",
    params(BookNameQuery),
    responses(
        (status = 200, description = "Lifetime rent of the book", body = TotalRentResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn total_rent(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<BookNameQuery>,
) -> AppResult<Json<TotalRentResponse>> {
    let total_rent = state.services.reports.total_rent_for_book(&query.name).await?;
    Ok(Json(TotalRentResponse { total_rent }))
}

/// Issue count and current issuers of a book (exact name)
#[utoipa::path(
    get,
    path = "/books/issuers",
    tag = "reports",
    params(BookNameQuery),
    responses(
        (status = 200, description = "Issuer summary", body = IssuerSummary),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn issuer_summary(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<BookNameQuery>,
) -> AppResult<Json<IssuerSummary>> {
    let summary = state.services.reports.issuer_summary(&query.name).await?;
    Ok(Json(summary))
}

/// Names of the books issued to matching issuers
#[utoipa::path(
    get,
    path = "/books/info",
    tag = "reports",
    params(IssuerQuery),
    responses(
        (status = 200, description = "Book names in ledger order", body = Vec<String>)
    )
)]
pub async fn books_issued_to(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<IssuerQuery>,
) -> AppResult<Json<Vec<String>>> {
    let books = state.services.reports.books_issued_to(&query.issuer).await?;
    Ok(Json(books))
}

/// Transactions dated strictly between two timestamps
#[utoipa::path(
    get,
    path = "/books/date",
    tag = "reports",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Book and issuer of each transaction",
            body = Vec<ActivityEntry>),
        (status = 400, description = "Malformed date", body = crate::error::ErrorResponse)
    )
)]
pub async fn activity_between(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<DateRangeQuery>,
) -> AppResult<Json<Vec<ActivityEntry>>> {
    let start = parse_timestamp("start", &query.start)?;
    let end = parse_timestamp("end", &query.end)?;

    let activity = state.services.reports.activity_between(start, end).await?;
    Ok(Json(activity))
}
