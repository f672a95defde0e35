//! Loan (issued-book record) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book::BookShort;
use super::patron::PatronShort;

/// Loan lifecycle status
///
/// `Issued` and `Overdue` flip back and forth under time-triggered
/// refresh; `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    Issued,
    Overdue,
    Returned,
}

impl LoanStatus {
    /// An active loan holds its copy and blocks further issues
    pub fn is_active(self) -> bool {
        matches!(self, LoanStatus::Issued | LoanStatus::Overdue)
    }
}

/// Bookkeeping state of a loan's fine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FineStatus {
    NoFine,
    Unpaid,
    Cleared,
}

/// A single borrow-to-return transaction
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub patron_id: i64,
    pub book_id: i64,
    pub copy_id: i64,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    /// Authoritative once returned; recomputed on refresh while active
    pub fine_amount: Decimal,
    pub fine_status: FineStatus,
}

/// Loan with full details for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub status: LoanStatus,
    pub issued_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub fine_amount: Decimal,
    pub fine_status: FineStatus,
    pub patron: PatronShort,
    pub book: BookShort,
    pub accession_number: String,
}

/// Issue command resolved by the circulation service
///
/// The patron may be referenced by internal id or school identifier, the
/// copy by internal id or accession number. When an ISBN is supplied it is
/// cross-checked against the resolved copy's book.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueLoan {
    pub patron_id: Option<i64>,
    pub patron_identifier: Option<String>,
    pub copy_id: Option<i64>,
    pub accession_number: Option<String>,
    pub isbn: Option<String>,
    pub due_at: DateTime<Utc>,
}

/// Return command; the fine status defaults to Unpaid for non-zero fines
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReturnLoan {
    pub fine_status: Option<FineStatus>,
}

/// Administrative fine-status override
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFineStatus {
    pub fine_status: FineStatus,
}
