//! Loan ledger: loan lifecycle and per-patron/per-copy exclusivity
//!
//! The ledger owns loan records and the two exclusivity rules: at most
//! one active loan per patron and per copy. Overdue status and fines are
//! recomputed by `refresh` against a supplied instant; closed loans are
//! frozen. Callers hold the store write guard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    fines::FinePolicy,
    models::loan::{FineStatus, Loan, LoanStatus},
    repository::StoreInner,
};

/// True if the patron currently holds an Issued or Overdue loan
pub fn has_active_loan(inner: &StoreInner, patron_id: i64) -> bool {
    inner
        .loans
        .values()
        .any(|l| l.patron_id == patron_id && l.status.is_active())
}

/// Id of the active loan holding the copy, if any
pub fn copy_active_loan(inner: &StoreInner, copy_id: i64) -> Option<i64> {
    inner
        .loans
        .values()
        .find(|l| l.copy_id == copy_id && l.status.is_active())
        .map(|l| l.id)
}

/// Create an Issued loan, enforcing both exclusivity rules.
pub fn create_loan(
    inner: &mut StoreInner,
    patron_id: i64,
    book_id: i64,
    copy_id: i64,
    issued_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
) -> AppResult<Loan> {
    if has_active_loan(inner, patron_id) {
        return Err(AppError::PatronHasActiveLoan(format!(
            "patron {} already holds an outstanding loan",
            patron_id
        )));
    }
    if let Some(loan_id) = copy_active_loan(inner, copy_id) {
        return Err(AppError::CopyAlreadyLoaned(format!(
            "copy {} is held by loan {}",
            copy_id, loan_id
        )));
    }

    let id = inner.next_loan_id();
    let loan = Loan {
        id,
        patron_id,
        book_id,
        copy_id,
        issued_at,
        due_at,
        returned_at: None,
        status: LoanStatus::Issued,
        fine_amount: Decimal::ZERO,
        fine_status: FineStatus::NoFine,
    };
    inner.loans.insert(id, loan.clone());
    Ok(loan)
}

/// Close an active loan: compute the final fine and freeze the record.
///
/// A zero fine clears itself; otherwise the caller's choice applies,
/// defaulting to Unpaid until the librarian records a payment.
pub fn close_loan(
    inner: &mut StoreInner,
    policy: &FinePolicy,
    loan_id: i64,
    now: DateTime<Utc>,
    fine_status: Option<FineStatus>,
) -> AppResult<Loan> {
    let loan = inner
        .loans
        .get_mut(&loan_id)
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
    if !loan.status.is_active() {
        return Err(AppError::AlreadyReturned(format!(
            "loan {} was already returned",
            loan_id
        )));
    }

    let fine = policy.compute(loan.due_at, now);
    loan.returned_at = Some(now);
    loan.status = LoanStatus::Returned;
    loan.fine_amount = fine;
    loan.fine_status = if fine == Decimal::ZERO {
        FineStatus::Cleared
    } else {
        fine_status.unwrap_or(FineStatus::Unpaid)
    };
    Ok(loan.clone())
}

/// Recompute one loan's overdue status and fine against `now`.
///
/// Idempotent; a Returned loan is left untouched, which also makes the
/// periodic sweep safe against a close racing between its read and write.
pub fn refresh(
    inner: &mut StoreInner,
    policy: &FinePolicy,
    loan_id: i64,
    now: DateTime<Utc>,
) -> AppResult<Loan> {
    let loan = inner
        .loans
        .get_mut(&loan_id)
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
    if loan.status == LoanStatus::Returned {
        return Ok(loan.clone());
    }

    let fine = policy.compute(loan.due_at, now);
    if fine > Decimal::ZERO {
        loan.status = LoanStatus::Overdue;
        loan.fine_amount = fine;
        loan.fine_status = FineStatus::Unpaid;
    } else {
        loan.status = LoanStatus::Issued;
        loan.fine_amount = Decimal::ZERO;
        loan.fine_status = FineStatus::NoFine;
    }
    Ok(loan.clone())
}

/// Refresh every non-returned loan; returns how many are overdue.
pub fn refresh_all(inner: &mut StoreInner, policy: &FinePolicy, now: DateTime<Utc>) -> usize {
    let ids: Vec<i64> = inner
        .loans
        .values()
        .filter(|l| l.status != LoanStatus::Returned)
        .map(|l| l.id)
        .collect();

    let mut overdue = 0;
    for id in ids {
        // Ids were just collected under the same guard, so refresh cannot
        // miss; count instead of unwrapping to keep the sweep total-safe.
        if let Ok(loan) = refresh(inner, policy, id, now) {
            if loan.status == LoanStatus::Overdue {
                overdue += 1;
            }
        }
    }
    overdue
}

/// Administrative fine-status override, permitted in any loan status.
pub fn update_fine_status(
    inner: &mut StoreInner,
    loan_id: i64,
    fine_status: FineStatus,
) -> AppResult<Loan> {
    let loan = inner
        .loans
        .get_mut(&loan_id)
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;
    tracing::info!(loan_id, from = ?loan.fine_status, to = ?fine_status, "fine status override");
    loan.fine_status = fine_status;
    Ok(loan.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn issue(inner: &mut StoreInner, patron_id: i64, copy_id: i64) -> Loan {
        create_loan(inner, patron_id, 1, copy_id, t0(), t0() + Duration::days(7)).unwrap()
    }

    #[test]
    fn test_one_active_loan_per_patron() {
        let mut inner = StoreInner::default();
        issue(&mut inner, 1, 10);

        let err = issue_err(&mut inner, 1, 11);
        assert!(matches!(err, AppError::PatronHasActiveLoan(_)));
        assert_eq!(inner.loans.len(), 1);
    }

    #[test]
    fn test_one_active_loan_per_copy() {
        let mut inner = StoreInner::default();
        issue(&mut inner, 1, 10);

        let err = issue_err(&mut inner, 2, 10);
        assert!(matches!(err, AppError::CopyAlreadyLoaned(_)));
    }

    fn issue_err(inner: &mut StoreInner, patron_id: i64, copy_id: i64) -> AppError {
        create_loan(inner, patron_id, 1, copy_id, t0(), t0() + Duration::days(7)).unwrap_err()
    }

    #[test]
    fn test_patron_can_borrow_again_after_return() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);
        close_loan(&mut inner, &policy, loan.id, t0() + Duration::days(1), None).unwrap();

        assert!(!has_active_loan(&inner, 1));
        issue(&mut inner, 1, 11);
    }

    #[test]
    fn test_close_on_time_clears_fine() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);

        let closed = close_loan(&mut inner, &policy, loan.id, t0() + Duration::days(3), None).unwrap();
        assert_eq!(closed.status, LoanStatus::Returned);
        assert_eq!(closed.fine_amount, Decimal::ZERO);
        assert_eq!(closed.fine_status, FineStatus::Cleared);
        assert_eq!(closed.returned_at, Some(t0() + Duration::days(3)));
    }

    #[test]
    fn test_close_overdue_defaults_to_unpaid() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);

        let closed =
            close_loan(&mut inner, &policy, loan.id, t0() + Duration::days(9), None).unwrap();
        assert_eq!(closed.fine_amount, Decimal::new(5000, 2));
        assert_eq!(closed.fine_status, FineStatus::Unpaid);
    }

    #[test]
    fn test_close_overdue_honors_caller_choice() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);

        let closed = close_loan(
            &mut inner,
            &policy,
            loan.id,
            t0() + Duration::days(9),
            Some(FineStatus::Cleared),
        )
        .unwrap();
        assert_eq!(closed.fine_status, FineStatus::Cleared);
    }

    #[test]
    fn test_close_twice_is_rejected() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);
        close_loan(&mut inner, &policy, loan.id, t0() + Duration::days(1), None).unwrap();

        let err =
            close_loan(&mut inner, &policy, loan.id, t0() + Duration::days(2), None).unwrap_err();
        assert!(matches!(err, AppError::AlreadyReturned(_)));
    }

    #[test]
    fn test_refresh_marks_overdue() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);

        let refreshed =
            refresh(&mut inner, &policy, loan.id, t0() + Duration::days(9)).unwrap();
        assert_eq!(refreshed.status, LoanStatus::Overdue);
        assert_eq!(refreshed.fine_amount, Decimal::new(5000, 2));
        assert_eq!(refreshed.fine_status, FineStatus::Unpaid);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);

        let at = t0() + Duration::days(9);
        let first = refresh(&mut inner, &policy, loan.id, at).unwrap();
        let second = refresh(&mut inner, &policy, loan.id, at).unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(first.fine_amount, second.fine_amount);
        assert_eq!(first.fine_status, second.fine_status);
    }

    #[test]
    fn test_refresh_before_due_stays_issued() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);

        let refreshed = refresh(&mut inner, &policy, loan.id, t0() + Duration::days(2)).unwrap();
        assert_eq!(refreshed.status, LoanStatus::Issued);
        assert_eq!(refreshed.fine_status, FineStatus::NoFine);
    }

    #[test]
    fn test_refresh_leaves_closed_loans_frozen() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);
        let closed =
            close_loan(&mut inner, &policy, loan.id, t0() + Duration::days(9), None).unwrap();

        let later = refresh(&mut inner, &policy, loan.id, t0() + Duration::days(30)).unwrap();
        assert_eq!(later.status, LoanStatus::Returned);
        assert_eq!(later.fine_amount, closed.fine_amount);
        assert_eq!(later.fine_status, closed.fine_status);
    }

    #[test]
    fn test_refresh_all_counts_overdue() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        issue(&mut inner, 1, 10);
        create_loan(&mut inner, 2, 1, 11, t0(), t0() + Duration::days(30)).unwrap();

        let overdue = refresh_all(&mut inner, &policy, t0() + Duration::days(9));
        assert_eq!(overdue, 1);
    }

    #[test]
    fn test_fine_status_override_after_return() {
        let mut inner = StoreInner::default();
        let policy = FinePolicy::standard();
        let loan = issue(&mut inner, 1, 10);
        close_loan(&mut inner, &policy, loan.id, t0() + Duration::days(9), None).unwrap();

        let updated = update_fine_status(&mut inner, loan.id, FineStatus::Cleared).unwrap();
        assert_eq!(updated.fine_status, FineStatus::Cleared);
        assert_eq!(updated.fine_amount, Decimal::new(5000, 2));
    }
}
