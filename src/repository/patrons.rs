//! Patrons repository: borrower records and identifier lookup

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::patron::{CreatePatron, Patron},
    repository::{read_store, write_store, Store},
};

#[derive(Clone)]
pub struct PatronsRepository {
    store: Store,
}

impl PatronsRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a patron; the school/guest identifier must be unique.
    pub async fn create(&self, patron: &CreatePatron, now: DateTime<Utc>) -> AppResult<Patron> {
        let mut inner = write_store(&self.store)?;
        if inner.patron_identifier_index.contains_key(&patron.identifier) {
            return Err(AppError::Duplicate(format!(
                "Patron identifier {} is already registered",
                patron.identifier
            )));
        }

        let id = inner.next_patron_id();
        let record = Patron {
            id,
            identifier: patron.identifier.clone(),
            kind: patron.kind,
            first_name: patron.first_name.clone(),
            last_name: patron.last_name.clone(),
            email: patron.email.clone(),
            phone: patron.phone.clone(),
            registered_at: now,
        };
        inner.patrons.insert(id, record.clone());
        inner
            .patron_identifier_index
            .insert(patron.identifier.clone(), id);
        Ok(record)
    }

    /// Get patron by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Patron> {
        let inner = read_store(&self.store)?;
        inner
            .patrons
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Patron with id {} not found", id)))
    }

    /// Get patron by school/guest identifier
    pub async fn get_by_identifier(&self, identifier: &str) -> AppResult<Patron> {
        let inner = read_store(&self.store)?;
        let id = inner
            .patron_identifier_index
            .get(identifier)
            .copied()
            .ok_or_else(|| {
                AppError::NotFound(format!("Patron with identifier {} not found", identifier))
            })?;
        inner
            .patrons
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::Consistency(format!("patron index points at missing id {}", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Patron>> {
        let inner = read_store(&self.store)?;
        let mut patrons: Vec<Patron> = inner.patrons.values().cloned().collect();
        patrons.sort_by_key(|p| p.id);
        Ok(patrons)
    }
}
