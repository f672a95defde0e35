//! Catalog repository: book and copy records and identifier lookups

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookStatus, CreateBook},
        copy::{BookCopy, CopyState, CreateCopy},
    },
    repository::{inventory, read_store, write_store, Store, StoreInner},
};

#[derive(Clone)]
pub struct CatalogRepository {
    store: Store,
}

impl CatalogRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a book together with its initial copies.
    pub async fn create_book(&self, book: &CreateBook, now: DateTime<Utc>) -> AppResult<Book> {
        let mut inner = write_store(&self.store)?;

        if inner.isbn_index.contains_key(&book.isbn) {
            return Err(AppError::Duplicate(format!(
                "ISBN {} is already cataloged",
                book.isbn
            )));
        }
        if inner.call_number_index.contains_key(&book.call_number) {
            return Err(AppError::Duplicate(format!(
                "Call number {} is already cataloged",
                book.call_number
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for accession in &book.accession_numbers {
            if inner.accession_index.contains_key(accession) || !seen.insert(accession.as_str()) {
                return Err(AppError::Duplicate(format!(
                    "Accession number {} is already in use",
                    accession
                )));
            }
        }

        let book_id = inner.next_book_id();
        inner.books.insert(
            book_id,
            Book {
                id: book_id,
                isbn: book.isbn.clone(),
                call_number: book.call_number.clone(),
                title: book.title.clone(),
                author: book.author.clone(),
                publisher: book.publisher.clone(),
                publication_year: book.publication_year,
                copies_total: 0,
                copies_available: 0,
                status: BookStatus::NotAvailable,
                is_active: true,
                added_at: now,
            },
        );
        inner.isbn_index.insert(book.isbn.clone(), book_id);
        inner
            .call_number_index
            .insert(book.call_number.clone(), book_id);

        for accession in &book.accession_numbers {
            Self::insert_copy(&mut inner, book_id, accession, now);
        }
        // The last-copy rule also applies at registration: a sole copy is
        // withheld as the reference copy straight away.
        inventory::sync_book_aggregates(&mut inner, book_id)?;
        inventory::reserve_last_copy(&mut inner, book_id)?;

        inner
            .books
            .get(&book_id)
            .cloned()
            .ok_or_else(|| AppError::Internal("book vanished during registration".to_string()))
    }

    fn insert_copy(inner: &mut StoreInner, book_id: i64, accession: &str, now: DateTime<Utc>) {
        let copy_id = inner.next_copy_id();
        inner.copies.insert(
            copy_id,
            BookCopy {
                id: copy_id,
                book_id,
                accession_number: accession.to_string(),
                state: CopyState::Available,
                added_at: now,
            },
        );
        inner.accession_index.insert(accession.to_string(), copy_id);
    }

    /// Add one copy to an existing book.
    pub async fn add_copy(
        &self,
        book_id: i64,
        copy: &CreateCopy,
        now: DateTime<Utc>,
    ) -> AppResult<BookCopy> {
        let mut inner = write_store(&self.store)?;
        if !inner.books.contains_key(&book_id) {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }
        if inner.accession_index.contains_key(&copy.accession_number) {
            return Err(AppError::Duplicate(format!(
                "Accession number {} is already in use",
                copy.accession_number
            )));
        }

        Self::insert_copy(&mut inner, book_id, &copy.accession_number, now);
        inventory::sync_book_aggregates(&mut inner, book_id)?;
        inventory::reserve_last_copy(&mut inner, book_id)?;

        let copy_id = *inner
            .accession_index
            .get(&copy.accession_number)
            .ok_or_else(|| AppError::Internal("copy vanished during registration".to_string()))?;
        inner
            .copies
            .get(&copy_id)
            .cloned()
            .ok_or_else(|| AppError::Internal("copy vanished during registration".to_string()))
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        let inner = read_store(&self.store)?;
        inner
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List active catalog entries
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        let inner = read_store(&self.store)?;
        let mut books: Vec<Book> = inner.books.values().filter(|b| b.is_active).cloned().collect();
        books.sort_by_key(|b| b.id);
        Ok(books)
    }

    /// List the copies of a book
    pub async fn list_copies(&self, book_id: i64) -> AppResult<Vec<BookCopy>> {
        let inner = read_store(&self.store)?;
        if !inner.books.contains_key(&book_id) {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }
        let mut copies: Vec<BookCopy> = inner
            .copies
            .values()
            .filter(|c| c.book_id == book_id)
            .cloned()
            .collect();
        copies.sort_by_key(|c| c.id);
        Ok(copies)
    }

    /// Administrative copy state change (reserve, archive, re-activate)
    pub async fn set_copy_state(&self, copy_id: i64, state: CopyState) -> AppResult<BookCopy> {
        let mut inner = write_store(&self.store)?;
        inventory::set_state(&mut inner, copy_id, state)?;
        inner
            .copies
            .get(&copy_id)
            .cloned()
            .ok_or_else(|| AppError::Internal("copy vanished during state change".to_string()))
    }

    /// Soft-archive a book; its copies and loan history remain on record.
    pub async fn archive_book(&self, book_id: i64) -> AppResult<Book> {
        let mut inner = write_store(&self.store)?;
        let book = inner
            .books
            .get_mut(&book_id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;
        book.is_active = false;
        Ok(book.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_store;

    fn request(isbn: &str, call_number: &str, accessions: &[&str]) -> CreateBook {
        CreateBook {
            isbn: isbn.to_string(),
            call_number: call_number.to_string(),
            title: "El Filibusterismo".to_string(),
            author: Some("Jose Rizal".to_string()),
            publisher: None,
            publication_year: Some(1891),
            accession_numbers: accessions.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_create_book_with_copies() {
        let repo = CatalogRepository::new(new_store());
        let book = repo
            .create_book(&request("971-23-4567-1", "FIL 813 R52", &["A-1", "A-2"]), Utc::now())
            .await
            .unwrap();

        assert_eq!(book.copies_total, 2);
        assert_eq!(book.copies_available, 2);
        assert_eq!(book.status, BookStatus::Available);
        assert_eq!(repo.list_copies(book.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_single_copy_book_starts_not_available() {
        let repo = CatalogRepository::new(new_store());
        let book = repo
            .create_book(&request("971-23-4567-1", "FIL 813 R52", &["A-1"]), Utc::now())
            .await
            .unwrap();
        assert_eq!(book.status, BookStatus::NotAvailable);

        // The sole copy is withheld as the reference copy from the start
        let copies = repo.list_copies(book.id).await.unwrap();
        assert_eq!(copies[0].state, CopyState::Reserve);
    }

    #[tokio::test]
    async fn test_first_copy_added_later_is_reserved() {
        let repo = CatalogRepository::new(new_store());
        let book = repo
            .create_book(&request("971-23-4567-1", "FIL 813 R52", &[]), Utc::now())
            .await
            .unwrap();

        repo.add_copy(
            book.id,
            &CreateCopy { accession_number: "A-1".to_string() },
            Utc::now(),
        )
        .await
        .unwrap();

        let copies = repo.list_copies(book.id).await.unwrap();
        assert_eq!(copies[0].state, CopyState::Reserve);
        assert_eq!(
            repo.get_book(book.id).await.unwrap().status,
            BookStatus::NotAvailable
        );
    }

    #[tokio::test]
    async fn test_duplicate_isbn_rejected() {
        let repo = CatalogRepository::new(new_store());
        repo.create_book(&request("971-23-4567-1", "FIL 813 R52", &["A-1"]), Utc::now())
            .await
            .unwrap();

        let err = repo
            .create_book(&request("971-23-4567-1", "FIL 813 R53", &["A-2"]), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_duplicate_accession_rejected_without_partial_insert() {
        let repo = CatalogRepository::new(new_store());
        repo.create_book(&request("971-23-4567-1", "FIL 813 R52", &["A-1"]), Utc::now())
            .await
            .unwrap();

        let err = repo
            .create_book(&request("971-23-9999-2", "FIL 813 R53", &["A-1"]), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        assert_eq!(repo.list_books().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_accession_within_request_rejected() {
        let repo = CatalogRepository::new(new_store());
        let err = repo
            .create_book(&request("971-23-4567-1", "FIL 813 R52", &["A-1", "A-1"]), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
        assert!(repo.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_copy_updates_aggregates() {
        let repo = CatalogRepository::new(new_store());
        let book = repo
            .create_book(&request("971-23-4567-1", "FIL 813 R52", &["A-1"]), Utc::now())
            .await
            .unwrap();

        repo.add_copy(
            book.id,
            &CreateCopy { accession_number: "A-2".to_string() },
            Utc::now(),
        )
        .await
        .unwrap();

        let book = repo.get_book(book.id).await.unwrap();
        assert_eq!(book.copies_total, 2);
        assert_eq!(book.status, BookStatus::Available);
    }

    #[tokio::test]
    async fn test_archived_book_hidden_from_listing() {
        let repo = CatalogRepository::new(new_store());
        let book = repo
            .create_book(&request("971-23-4567-1", "FIL 813 R52", &["A-1"]), Utc::now())
            .await
            .unwrap();

        repo.archive_book(book.id).await.unwrap();
        assert!(repo.list_books().await.unwrap().is_empty());
        // Still resolvable by id for loan history
        assert!(repo.get_book(book.id).await.is_ok());
    }
}
