//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, ledger, reports};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lendlog API",
        version = "0.1.0",
        description = "Book lending ledger and rent tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        books::search_books,
        books::create_book,
        books::delete_book,
        // Ledger
        ledger::issue_book,
        ledger::return_book,
        // Reports
        reports::total_rent,
        reports::issuer_summary,
        reports::books_issued_to,
        reports::activity_between,
    ),
    components(
        schemas(
            // Catalog
            crate::models::book::Book,
            crate::models::book::CreateBook,
            books::DeleteBookResponse,
            // Ledger
            ledger::LendingRequest,
            ledger::TransactionCreated,
            // Reports
            reports::TotalRentResponse,
            crate::models::transaction::IssuerSummary,
            crate::models::transaction::ActivityEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "ledger", description = "Issue and return of books"),
        (name = "reports", description = "Rent and lending history")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
