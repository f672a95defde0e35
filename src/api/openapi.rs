//! OpenAPI documentation

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::api::{books, health, loans, patrons, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aklatan API",
        version = "1.0.0",
        description = "School Library Circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::create_book,
        books::get_book,
        books::archive_book,
        books::list_copies,
        books::create_copy,
        books::update_copy_state,
        // Patrons
        patrons::list_patrons,
        patrons::create_patron,
        patrons::get_patron,
        patrons::patron_loans,
        // Loans
        loans::list_loans,
        loans::issue_loan,
        loans::overdue_loans,
        loans::refresh_loans,
        loans::get_loan,
        loans::return_loan,
        loans::update_fine_status,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::copy::BookCopy,
            crate::models::copy::CopyState,
            crate::models::copy::CreateCopy,
            crate::models::copy::UpdateCopyState,
            // Patrons
            crate::models::patron::Patron,
            crate::models::patron::PatronShort,
            crate::models::patron::PatronKind,
            crate::models::patron::CreatePatron,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            crate::models::loan::FineStatus,
            crate::models::loan::IssueLoan,
            crate::models::loan::ReturnLoan,
            crate::models::loan::UpdateFineStatus,
            loans::RefreshResponse,
            // Stats
            stats::StatsResponse,
            stats::CatalogStats,
            stats::LoanStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog and copy management"),
        (name = "patrons", description = "Patron management"),
        (name = "loans", description = "Circulation"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
