//! Patron registration service

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::AppResult,
    models::patron::{CreatePatron, Patron},
    repository::Repository,
};

#[derive(Clone)]
pub struct PatronsService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl PatronsService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Register a patron
    pub async fn create(&self, patron: &CreatePatron) -> AppResult<Patron> {
        self.repository.patrons.create(patron, self.clock.now()).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Patron> {
        self.repository.patrons.get_by_id(id).await
    }

    pub async fn get_by_identifier(&self, identifier: &str) -> AppResult<Patron> {
        self.repository.patrons.get_by_identifier(identifier).await
    }

    pub async fn list(&self) -> AppResult<Vec<Patron>> {
        self.repository.patrons.list().await
    }
}
