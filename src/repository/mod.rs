//! In-memory circulation store and per-area repositories
//!
//! All circulation state lives behind a single `RwLock`; the guard is
//! held only for the span of one synchronous operation and never across
//! an await point, so every multi-entity mutation (issue, return) is
//! atomic with respect to concurrent requests and the periodic sweep.

pub mod catalog;
pub mod inventory;
pub mod ledger;
pub mod patrons;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, copy::BookCopy, loan::Loan, patron::Patron},
};

/// Mutable tables behind the store lock
///
/// Loans use an `IndexMap` so listings iterate in issue order. The
/// side indexes enforce identifier uniqueness and serve the external
/// lookups (ISBN, accession number, school identifier).
#[derive(Default)]
pub struct StoreInner {
    pub books: HashMap<i64, Book>,
    pub copies: HashMap<i64, BookCopy>,
    pub patrons: HashMap<i64, Patron>,
    pub loans: IndexMap<i64, Loan>,
    pub isbn_index: HashMap<String, i64>,
    pub call_number_index: HashMap<String, i64>,
    pub accession_index: HashMap<String, i64>,
    pub patron_identifier_index: HashMap<String, i64>,
    book_seq: i64,
    copy_seq: i64,
    patron_seq: i64,
    loan_seq: i64,
}

impl StoreInner {
    pub(crate) fn next_book_id(&mut self) -> i64 {
        self.book_seq += 1;
        self.book_seq
    }

    pub(crate) fn next_copy_id(&mut self) -> i64 {
        self.copy_seq += 1;
        self.copy_seq
    }

    pub(crate) fn next_patron_id(&mut self) -> i64 {
        self.patron_seq += 1;
        self.patron_seq
    }

    pub(crate) fn next_loan_id(&mut self) -> i64 {
        self.loan_seq += 1;
        self.loan_seq
    }
}

/// Shared handle to the circulation store
pub type Store = Arc<RwLock<StoreInner>>;

pub fn new_store() -> Store {
    Arc::new(RwLock::new(StoreInner::default()))
}

/// Take the exclusive guard, surfacing poisoning as an internal error
pub(crate) fn write_store(store: &Store) -> AppResult<RwLockWriteGuard<'_, StoreInner>> {
    store
        .write()
        .map_err(|_| AppError::Internal("circulation store lock poisoned".to_string()))
}

/// Take the shared guard for display-only reads
pub(crate) fn read_store(store: &Store) -> AppResult<RwLockReadGuard<'_, StoreInner>> {
    store
        .read()
        .map_err(|_| AppError::Internal("circulation store lock poisoned".to_string()))
}

/// Main repository struct holding the shared store
#[derive(Clone)]
pub struct Repository {
    pub store: Store,
    pub catalog: catalog::CatalogRepository,
    pub patrons: patrons::PatronsRepository,
}

impl Repository {
    pub fn new() -> Self {
        let store = new_store();
        Self {
            catalog: catalog::CatalogRepository::new(store.clone()),
            patrons: patrons::PatronsRepository::new(store.clone()),
            store,
        }
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
