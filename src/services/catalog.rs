//! Catalog management service

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{
        book::{Book, CreateBook},
        copy::{BookCopy, CopyState, CreateCopy},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Register a book with its initial copies
    pub async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        self.repository.catalog.create_book(book, self.clock.now()).await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.catalog.get_book(id).await
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.catalog.list_books().await
    }

    pub async fn list_copies(&self, book_id: i64) -> AppResult<Vec<BookCopy>> {
        self.repository.catalog.list_copies(book_id).await
    }

    /// Add one copy to an existing book
    pub async fn add_copy(&self, book_id: i64, copy: &CreateCopy) -> AppResult<BookCopy> {
        self.repository.catalog.add_copy(book_id, copy, self.clock.now()).await
    }

    /// Administrative copy state change (reserve, archive, re-activate)
    pub async fn set_copy_state(&self, copy_id: i64, state: CopyState) -> AppResult<BookCopy> {
        self.repository.catalog.set_copy_state(copy_id, state).await
    }

    /// Soft-archive a book
    pub async fn archive_book(&self, book_id: i64) -> AppResult<Book> {
        self.repository.catalog.archive_book(book_id).await
    }
}
