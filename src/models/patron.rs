//! Patron (borrower) model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Patron classification; has no effect on circulation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PatronKind {
    Student,
    Faculty,
    Guest,
    Staff,
}

/// A registered borrower
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Patron {
    pub id: i64,
    /// School or guest identifier - unique across patrons
    pub identifier: String,
    pub kind: PatronKind,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Patron {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Compact patron reference for loan listings and receipts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatronShort {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub kind: PatronKind,
}

impl From<&Patron> for PatronShort {
    fn from(patron: &Patron) -> Self {
        Self {
            id: patron.id,
            identifier: patron.identifier.clone(),
            name: patron.full_name(),
            kind: patron.kind,
        }
    }
}

/// School/guest identifiers: alphanumeric with hyphens, e.g. "2024-0113"
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{2,19}$").expect("static regex"));

/// Create patron request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePatron {
    /// School or guest identifier - required and unique
    #[validate(regex(path = *IDENTIFIER_RE, message = "Invalid patron identifier"))]
    pub identifier: String,
    pub kind: PatronKind,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}
