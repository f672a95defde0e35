//! Catalog management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook},
        copy::{BookCopy, CreateCopy, UpdateCopyState},
    },
    AppState,
};

/// List active catalog entries
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Catalog entries", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Register a book with its initial copies
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book registered", body = Book),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "ISBN, call number or accession number already in use")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    request.validate()?;
    let book = state.services.catalog.create_book(&request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Get a catalog entry
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Catalog entry", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(book_id).await?;
    Ok(Json(book))
}

/// Soft-archive a catalog entry
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book archived", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn archive_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.archive_book(book_id).await?;
    Ok(Json(book))
}

/// List the copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/copies",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookCopy>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_copies(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Vec<BookCopy>>> {
    let copies = state.services.catalog.list_copies(book_id).await?;
    Ok(Json(copies))
}

/// Add a copy to an existing book
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy added", body = BookCopy),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Accession number already in use")
    )
)]
pub async fn create_copy(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Json(request): Json<CreateCopy>,
) -> AppResult<(StatusCode, Json<BookCopy>)> {
    request.validate()?;
    let copy = state.services.catalog.add_copy(book_id, &request).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Administrative copy state change (reserve, archive, re-activate)
#[utoipa::path(
    put,
    path = "/copies/{id}/state",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Copy ID")
    ),
    request_body = UpdateCopyState,
    responses(
        (status = 200, description = "Copy state changed", body = BookCopy),
        (status = 400, description = "Borrowed is not an administrative target"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_copy_state(
    State(state): State<AppState>,
    Path(copy_id): Path<i64>,
    Json(request): Json<UpdateCopyState>,
) -> AppResult<Json<BookCopy>> {
    let copy = state
        .services
        .catalog
        .set_copy_state(copy_id, request.state)
        .await?;
    Ok(Json(copy))
}
