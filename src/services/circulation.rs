//! Circulation service: issue, return and overdue refresh
//!
//! The only component performing multi-entity mutations. Each operation
//! resolves and validates everything it needs before touching any state,
//! then applies the whole mutation under one store write guard, so an
//! error path never leaves a partial update behind and concurrent
//! attempts against the same patron or copy serialize to one success.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    fines::FinePolicy,
    models::{
        copy::CopyState,
        loan::{FineStatus, IssueLoan, Loan, LoanDetails, LoanStatus, ReturnLoan},
    },
    repository::{ledger, inventory, write_store, Repository, StoreInner},
};

/// Loan counters for the stats endpoint
#[derive(Debug, Clone, Copy)]
pub struct LoanCounts {
    pub active: usize,
    pub overdue: usize,
    pub outstanding_fines: Decimal,
}

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    policy: FinePolicy,
    clock: Arc<dyn Clock>,
}

impl CirculationService {
    pub fn new(repository: Repository, policy: FinePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            policy,
            clock,
        }
    }

    /// Issue a copy to a patron.
    ///
    /// Rejections, in order: unknown patron/copy, ISBN mismatch, due date
    /// not in the future, patron already holding a loan, copy not
    /// available. Creating the loan and borrowing the copy happen under
    /// the same guard as the checks.
    pub async fn issue(&self, request: &IssueLoan) -> AppResult<LoanDetails> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;

        let patron_id = resolve_patron(&inner, request)?;
        let copy_id = resolve_copy(&inner, request)?;
        let (book_id, copy_state, accession) = {
            let copy = inner
                .copies
                .get(&copy_id)
                .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", copy_id)))?;
            (copy.book_id, copy.state, copy.accession_number.clone())
        };

        if let Some(isbn) = &request.isbn {
            let book = inner.books.get(&book_id).ok_or_else(|| {
                AppError::Consistency(format!("copy {} references missing book {}", copy_id, book_id))
            })?;
            if book.isbn != *isbn {
                return Err(AppError::Validation(format!(
                    "copy {} belongs to ISBN {}, not {}",
                    accession, book.isbn, isbn
                )));
            }
        }

        if request.due_at <= now {
            return Err(AppError::InvalidDueDate(format!(
                "due date {} is not after {}",
                request.due_at, now
            )));
        }
        if ledger::has_active_loan(&inner, patron_id) {
            return Err(AppError::PatronHasActiveLoan(format!(
                "patron {} already holds an outstanding loan",
                patron_id
            )));
        }
        if copy_state != CopyState::Available {
            return Err(AppError::CopyUnavailable(format!(
                "copy {} is {}",
                accession, copy_state
            )));
        }

        let loan = ledger::create_loan(&mut inner, patron_id, book_id, copy_id, now, request.due_at)?;
        inventory::mark_borrowed(&mut inner, copy_id)?;

        tracing::info!(loan_id = loan.id, patron_id, copy_id, "loan issued");
        details(&inner, &loan)
    }

    /// Return a borrowed copy, computing the final fine.
    pub async fn return_book(&self, loan_id: i64, request: &ReturnLoan) -> AppResult<LoanDetails> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;

        let copy_id = {
            let loan = inner
                .loans
                .get(&loan_id)
                .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
            if !loan.status.is_active() {
                return Err(AppError::NotFound(format!(
                    "Loan with id {} has no active record",
                    loan_id
                )));
            }
            loan.copy_id
        };

        // Verify the inventory agrees before mutating either side.
        let copy_state = inner
            .copies
            .get(&copy_id)
            .map(|c| c.state)
            .ok_or_else(|| {
                AppError::Consistency(format!("loan {} references missing copy {}", loan_id, copy_id))
            })?;
        if copy_state != CopyState::Borrowed {
            return Err(AppError::Consistency(format!(
                "copy {} is {} but loan {} is active",
                copy_id, copy_state, loan_id
            )));
        }

        let loan = ledger::close_loan(&mut inner, &self.policy, loan_id, now, request.fine_status)?;
        inventory::mark_returned(&mut inner, copy_id)?;

        tracing::info!(
            loan_id,
            copy_id,
            fine = %loan.fine_amount,
            "loan returned"
        );
        details(&inner, &loan)
    }

    /// Refresh every open loan against the clock; returns the overdue count.
    pub async fn refresh_all(&self) -> AppResult<usize> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;
        let overdue = ledger::refresh_all(&mut inner, &self.policy, now);
        tracing::debug!(overdue, "loan refresh sweep");
        Ok(overdue)
    }

    /// Get one loan, refreshed
    pub async fn get_loan(&self, loan_id: i64) -> AppResult<LoanDetails> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;
        let loan = ledger::refresh(&mut inner, &self.policy, loan_id, now)?;
        details(&inner, &loan)
    }

    /// All loans of a patron, history included, refreshed
    pub async fn patron_loans(&self, patron_id: i64) -> AppResult<Vec<LoanDetails>> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;
        if !inner.patrons.contains_key(&patron_id) {
            return Err(AppError::NotFound(format!(
                "Patron with id {} not found",
                patron_id
            )));
        }
        ledger::refresh_all(&mut inner, &self.policy, now);
        collect(&inner, |l| l.patron_id == patron_id)
    }

    /// All loans in issue order, refreshed
    pub async fn list_loans(&self) -> AppResult<Vec<LoanDetails>> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;
        ledger::refresh_all(&mut inner, &self.policy, now);
        collect(&inner, |_| true)
    }

    /// Currently-overdue loans, for listings and the notification job
    pub async fn overdue_loans(&self) -> AppResult<Vec<LoanDetails>> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;
        ledger::refresh_all(&mut inner, &self.policy, now);
        collect(&inner, |l| l.status == LoanStatus::Overdue)
    }

    /// Administrative fine-status override (out-of-band payment)
    pub async fn update_fine_status(
        &self,
        loan_id: i64,
        fine_status: FineStatus,
    ) -> AppResult<LoanDetails> {
        let mut inner = write_store(&self.repository.store)?;
        let loan = ledger::update_fine_status(&mut inner, loan_id, fine_status)?;
        details(&inner, &loan)
    }

    /// Counters for the stats endpoint, refreshed
    pub async fn counts(&self) -> AppResult<LoanCounts> {
        let now = self.clock.now();
        let mut inner = write_store(&self.repository.store)?;
        let overdue = ledger::refresh_all(&mut inner, &self.policy, now);
        let active = inner.loans.values().filter(|l| l.status.is_active()).count();
        let outstanding_fines = inner
            .loans
            .values()
            .filter(|l| l.fine_status == FineStatus::Unpaid)
            .map(|l| l.fine_amount)
            .sum();
        Ok(LoanCounts {
            active,
            overdue,
            outstanding_fines,
        })
    }
}

fn resolve_patron(inner: &StoreInner, request: &IssueLoan) -> AppResult<i64> {
    match (request.patron_id, &request.patron_identifier) {
        (Some(id), _) => {
            if !inner.patrons.contains_key(&id) {
                return Err(AppError::NotFound(format!("Patron with id {} not found", id)));
            }
            Ok(id)
        }
        (None, Some(identifier)) => inner
            .patron_identifier_index
            .get(identifier)
            .copied()
            .ok_or_else(|| {
                AppError::NotFound(format!("Patron with identifier {} not found", identifier))
            }),
        (None, None) => Err(AppError::Validation(
            "patron_id or patron_identifier is required".to_string(),
        )),
    }
}

fn resolve_copy(inner: &StoreInner, request: &IssueLoan) -> AppResult<i64> {
    match (request.copy_id, &request.accession_number) {
        (Some(id), _) => {
            if !inner.copies.contains_key(&id) {
                return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
            }
            Ok(id)
        }
        (None, Some(accession)) => inner.accession_index.get(accession).copied().ok_or_else(|| {
            AppError::NotFound(format!("Copy with accession number {} not found", accession))
        }),
        (None, None) => Err(AppError::Validation(
            "copy_id or accession_number is required".to_string(),
        )),
    }
}

/// Join a loan with its patron/book/copy snapshot for display
fn details(inner: &StoreInner, loan: &Loan) -> AppResult<LoanDetails> {
    let patron = inner.patrons.get(&loan.patron_id).ok_or_else(|| {
        AppError::Consistency(format!("loan {} references missing patron", loan.id))
    })?;
    let book = inner.books.get(&loan.book_id).ok_or_else(|| {
        AppError::Consistency(format!("loan {} references missing book", loan.id))
    })?;
    let copy = inner.copies.get(&loan.copy_id).ok_or_else(|| {
        AppError::Consistency(format!("loan {} references missing copy", loan.id))
    })?;

    Ok(LoanDetails {
        id: loan.id,
        status: loan.status,
        issued_at: loan.issued_at,
        due_at: loan.due_at,
        returned_at: loan.returned_at,
        fine_amount: loan.fine_amount,
        fine_status: loan.fine_status,
        patron: patron.into(),
        book: book.into(),
        accession_number: copy.accession_number.clone(),
    })
}

fn collect<F>(inner: &StoreInner, keep: F) -> AppResult<Vec<LoanDetails>>
where
    F: Fn(&Loan) -> bool,
{
    inner
        .loans
        .values()
        .filter(|l| keep(l))
        .map(|l| details(inner, l))
        .collect()
}
