//! Book copy (physical unit) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Physical copy state
///
/// `Borrowed` is entered and left only through circulation; `Reserve`
/// marks the in-building reference copy withheld by the last-copy rule;
/// `Lost`, `Old` and `Damaged` are archival states set by librarians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CopyState {
    Available,
    Borrowed,
    Reserve,
    Lost,
    Old,
    Damaged,
}

impl CopyState {
    /// Whether the copy counts toward the book's `copies_available`
    pub fn counts_available(self) -> bool {
        matches!(self, CopyState::Available | CopyState::Reserve)
    }

    pub fn is_archival(self) -> bool {
        matches!(self, CopyState::Lost | CopyState::Old | CopyState::Damaged)
    }
}

impl std::fmt::Display for CopyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CopyState::Available => "available",
            CopyState::Borrowed => "borrowed",
            CopyState::Reserve => "on reserve",
            CopyState::Lost => "lost",
            CopyState::Old => "old",
            CopyState::Damaged => "damaged",
        };
        write!(f, "{}", label)
    }
}

/// One physical unit of a cataloged book
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookCopy {
    pub id: i64,
    pub book_id: i64,
    /// Accession number - unique across all copies
    pub accession_number: String,
    pub state: CopyState,
    pub added_at: DateTime<Utc>,
}

/// Create copy request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCopy {
    #[validate(length(min = 1, message = "Accession number is required"))]
    pub accession_number: String,
}

/// Administrative copy state change (reserve or archive a copy)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCopyState {
    pub state: CopyState,
}
