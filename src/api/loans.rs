//! Circulation endpoints: issue, return, refresh, fines

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{IssueLoan, LoanDetails, ReturnLoan, UpdateFineStatus},
    AppState,
};

/// Result of a refresh sweep
#[derive(Serialize, ToSchema)]
pub struct RefreshResponse {
    /// Number of loans currently overdue after the sweep
    pub overdue: usize,
}

/// List all loans in issue order, history included
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "All loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(State(state): State<AppState>) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.circulation.list_loans().await?;
    Ok(Json(loans))
}

/// Issue a copy to a patron
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = IssueLoan,
    responses(
        (status = 201, description = "Loan issued", body = LoanDetails),
        (status = 400, description = "Invalid request or due date not in the future"),
        (status = 404, description = "Patron or copy not found"),
        (status = 409, description = "Patron already holds a loan, or copy not available")
    )
)]
pub async fn issue_loan(
    State(state): State<AppState>,
    Json(request): Json<IssueLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state.services.circulation.issue(&request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Currently-overdue loans
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanDetails>)
    )
)]
pub async fn overdue_loans(State(state): State<AppState>) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.circulation.overdue_loans().await?;
    Ok(Json(loans))
}

/// Re-evaluate every open loan against the clock
#[utoipa::path(
    post,
    path = "/loans/refresh",
    tag = "loans",
    responses(
        (status = 200, description = "Sweep complete", body = RefreshResponse)
    )
)]
pub async fn refresh_loans(State(state): State<AppState>) -> AppResult<Json<RefreshResponse>> {
    let overdue = state.services.circulation.refresh_all().await?;
    Ok(Json(RefreshResponse { overdue }))
}

/// Get a loan, refreshed against the clock
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<i64>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.circulation.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Return a borrowed copy
///
/// The body is optional; without one, a non-zero fine is recorded as
/// unpaid.
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Loan closed", body = LoanDetails),
        (status = 404, description = "No active loan with this ID")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<i64>,
    request: Option<Json<ReturnLoan>>,
) -> AppResult<Json<LoanDetails>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let loan = state
        .services
        .circulation
        .return_book(loan_id, &request)
        .await?;
    Ok(Json(loan))
}

/// Record an out-of-band fine payment or waiver
#[utoipa::path(
    put,
    path = "/loans/{id}/fine-status",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = UpdateFineStatus,
    responses(
        (status = 200, description = "Fine status updated", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn update_fine_status(
    State(state): State<AppState>,
    Path(loan_id): Path<i64>,
    Json(request): Json<UpdateFineStatus>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state
        .services
        .circulation
        .update_fine_status(loan_id, request.fine_status)
        .await?;
    Ok(Json(loan))
}
