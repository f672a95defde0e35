//! Copy inventory: per-copy state transitions and book availability
//!
//! Copy states change only through these functions so the book's
//! denormalized `copies_total`/`copies_available`/`status` always match
//! the copy table. Callers hold the store write guard; everything here is
//! synchronous.

use crate::{
    error::{AppError, AppResult},
    models::{book::BookStatus, copy::CopyState},
    repository::StoreInner,
};

/// Recompute a book's copy counts and coarse status from its copy states.
///
/// `copies_available` counts copies in `Available` or `Reserve`; the book
/// is `NotAvailable` whenever at most one circulating copy remains (the
/// last copy is withheld as the in-building reference copy).
pub fn sync_book_aggregates(inner: &mut StoreInner, book_id: i64) -> AppResult<()> {
    let mut total: i16 = 0;
    let mut available: i16 = 0;
    for copy in inner.copies.values().filter(|c| c.book_id == book_id) {
        total += 1;
        if copy.state.counts_available() {
            available += 1;
        }
    }

    let book = inner.books.get_mut(&book_id).ok_or_else(|| {
        AppError::Consistency(format!("book {} missing while syncing copy counts", book_id))
    })?;
    book.copies_total = total;
    book.copies_available = available;
    book.status = if available > 1 {
        BookStatus::Available
    } else {
        BookStatus::NotAvailable
    };
    Ok(())
}

/// Named last-copy transition: when a book's availability is down to one,
/// the remaining `Available` copy moves to `Reserve` and leaves
/// circulation. Applied after every transition that can lower availability
/// and after catalog registration, so a sole copy is never issuable.
/// No-op while more than one copy is still available.
pub fn reserve_last_copy(inner: &mut StoreInner, book_id: i64) -> AppResult<()> {
    let available = inner
        .books
        .get(&book_id)
        .ok_or_else(|| {
            AppError::Consistency(format!("book {} missing while applying last-copy rule", book_id))
        })?
        .copies_available;
    if available > 1 {
        return Ok(());
    }

    let remaining: Vec<i64> = inner
        .copies
        .values()
        .filter(|c| c.book_id == book_id && c.state == CopyState::Available)
        .map(|c| c.id)
        .collect();
    for copy_id in remaining {
        if let Some(copy) = inner.copies.get_mut(&copy_id) {
            tracing::debug!(copy_id, book_id, "withholding last copy as reference copy");
            copy.state = CopyState::Reserve;
        }
    }
    // Available -> Reserve leaves copies_available unchanged; the book
    // status was already set by the preceding aggregate sync.
    Ok(())
}

/// Borrow transition: requires `Available`, applies the last-copy rule.
pub fn mark_borrowed(inner: &mut StoreInner, copy_id: i64) -> AppResult<()> {
    let (book_id, state, accession) = {
        let copy = inner
            .copies
            .get(&copy_id)
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", copy_id)))?;
        (copy.book_id, copy.state, copy.accession_number.clone())
    };
    if state != CopyState::Available {
        return Err(AppError::CopyUnavailable(format!(
            "copy {} is {}",
            accession, state
        )));
    }

    if let Some(copy) = inner.copies.get_mut(&copy_id) {
        copy.state = CopyState::Borrowed;
    }
    sync_book_aggregates(inner, book_id)?;
    reserve_last_copy(inner, book_id)
}

/// Return transition: requires `Borrowed`, restores `Available`.
///
/// A non-borrowed copy here means the ledger and the inventory disagree;
/// the operation fails closed without touching any state.
pub fn mark_returned(inner: &mut StoreInner, copy_id: i64) -> AppResult<()> {
    let (book_id, state) = {
        let copy = inner
            .copies
            .get(&copy_id)
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", copy_id)))?;
        (copy.book_id, copy.state)
    };
    if state != CopyState::Borrowed {
        return Err(AppError::Consistency(format!(
            "copy {} is {} but the ledger holds an active loan for it",
            copy_id, state
        )));
    }

    if let Some(copy) = inner.copies.get_mut(&copy_id) {
        copy.state = CopyState::Available;
    }
    sync_book_aggregates(inner, book_id)
}

/// Administrative transition to `Available`, `Reserve` or an archival
/// state. Not gated by loan state; `Borrowed` is never a valid target.
pub fn set_state(inner: &mut StoreInner, copy_id: i64, state: CopyState) -> AppResult<()> {
    if state == CopyState::Borrowed {
        return Err(AppError::Validation(
            "copies enter the borrowed state only through an issue".to_string(),
        ));
    }
    let book_id = {
        let copy = inner
            .copies
            .get(&copy_id)
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", copy_id)))?;
        copy.book_id
    };
    if let Some(copy) = inner.copies.get_mut(&copy_id) {
        tracing::info!(copy_id, from = %copy.state, to = %state, "copy state changed");
        copy.state = state;
    }
    sync_book_aggregates(inner, book_id)?;
    reserve_last_copy(inner, book_id)
}
