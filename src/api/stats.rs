//! Library statistics endpoint

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::copy::CopyState, AppState};

#[derive(Serialize, ToSchema)]
pub struct CatalogStats {
    /// Number of active catalog entries
    pub books: usize,
    /// Total copies across the active catalog
    pub copies: usize,
    /// Copies currently open to borrowing
    pub copies_available: usize,
}

#[derive(Serialize, ToSchema)]
pub struct LoanStats {
    /// Loans currently out
    pub active: usize,
    /// Active loans past their due date
    pub overdue: usize,
    /// Sum of unpaid fines, history included
    pub outstanding_fines: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub catalog: CatalogStats,
    /// Number of registered patrons
    pub patrons: usize,
    pub loans: LoanStats,
}

/// Aggregate library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    let books = state.services.catalog.list_books().await?;
    let mut copies = 0;
    let mut copies_available = 0;
    for book in &books {
        for copy in state.services.catalog.list_copies(book.id).await? {
            copies += 1;
            if copy.state == CopyState::Available {
                copies_available += 1;
            }
        }
    }

    let patrons = state.services.patrons.list().await?.len();
    let counts = state.services.circulation.counts().await?;

    Ok(Json(StatsResponse {
        catalog: CatalogStats {
            books: books.len(),
            copies,
            copies_available,
        },
        patrons,
        loans: LoanStats {
            active: counts.active,
            overdue: counts.overdue,
            outstanding_fines: counts.outstanding_fines,
        },
    }))
}
