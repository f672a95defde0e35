//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Coarse book-level availability derived from copy states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookStatus {
    Available,
    NotAvailable,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookStatus::Available => "Available",
            BookStatus::NotAvailable => "Not available",
        };
        write!(f, "{}", label)
    }
}

/// Catalog entry with denormalized copy counts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub call_number: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    /// Count of copies on record, archival states included
    pub copies_total: i16,
    /// Count of copies not in Borrowed or an archival state
    pub copies_available: i16,
    pub status: BookStatus,
    /// Soft-archive flag; archived books stay referenced by old loans
    pub is_active: bool,
    pub added_at: DateTime<Utc>,
}

/// Compact book reference for loan listings and receipts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookShort {
    pub id: i64,
    pub isbn: String,
    pub call_number: String,
    pub title: String,
}

impl From<&Book> for BookShort {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            isbn: book.isbn.clone(),
            call_number: book.call_number.clone(),
            title: book.title.clone(),
        }
    }
}

/// ISBN-10/13, digits with optional hyphens and a trailing check X
static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9][0-9-]{8,15}[0-9Xx]$").expect("static regex"));

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    /// ISBN - required and unique across the catalog
    #[validate(regex(path = *ISBN_RE, message = "Invalid ISBN format"))]
    pub isbn: String,
    /// Call number - required and unique across the catalog
    #[validate(length(min = 1, message = "Call number is required"))]
    pub call_number: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    /// Accession numbers of the initial physical copies (may be empty)
    pub accession_numbers: Vec<String>,
}
