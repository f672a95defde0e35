//! Patron management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        loan::LoanDetails,
        patron::{CreatePatron, Patron},
    },
    AppState,
};

/// List registered patrons
#[utoipa::path(
    get,
    path = "/patrons",
    tag = "patrons",
    responses(
        (status = 200, description = "Registered patrons", body = Vec<Patron>)
    )
)]
pub async fn list_patrons(State(state): State<AppState>) -> AppResult<Json<Vec<Patron>>> {
    let patrons = state.services.patrons.list().await?;
    Ok(Json(patrons))
}

/// Register a patron
#[utoipa::path(
    post,
    path = "/patrons",
    tag = "patrons",
    request_body = CreatePatron,
    responses(
        (status = 201, description = "Patron registered", body = Patron),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Identifier already in use")
    )
)]
pub async fn create_patron(
    State(state): State<AppState>,
    Json(request): Json<CreatePatron>,
) -> AppResult<(StatusCode, Json<Patron>)> {
    request.validate()?;
    let patron = state.services.patrons.create(&request).await?;
    Ok((StatusCode::CREATED, Json(patron)))
}

/// Get a patron
#[utoipa::path(
    get,
    path = "/patrons/{id}",
    tag = "patrons",
    params(
        ("id" = i64, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "Patron", body = Patron),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn get_patron(
    State(state): State<AppState>,
    Path(patron_id): Path<i64>,
) -> AppResult<Json<Patron>> {
    let patron = state.services.patrons.get(patron_id).await?;
    Ok(Json(patron))
}

/// Loan history of a patron, refreshed against the clock
#[utoipa::path(
    get,
    path = "/patrons/{id}/loans",
    tag = "patrons",
    params(
        ("id" = i64, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "Loans of the patron", body = Vec<LoanDetails>),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn patron_loans(
    State(state): State<AppState>,
    Path(patron_id): Path<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.circulation.patron_loans(patron_id).await?;
    Ok(Json(loans))
}
