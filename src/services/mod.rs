//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod notifications;
pub mod patrons;

use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    config::AppConfig,
    fines::FinePolicy,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub patrons: patrons::PatronsService,
    pub circulation: circulation::CirculationService,
    pub notifications: notifications::NotificationService,
}

impl Services {
    /// Create all services with the given repository and configuration
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let clock: Arc<dyn Clock> =
            Arc::new(SystemClock::new(config.circulation.utc_offset_hours));
        Self::with_clock(repository, config, clock)
    }

    /// Same, with an injected clock (tests, replay)
    pub fn with_clock(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let policy = FinePolicy::new(&config.fines);
        let circulation = circulation::CirculationService::new(
            repository.clone(),
            policy,
            clock.clone(),
        );
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), clock.clone()),
            patrons: patrons::PatronsService::new(repository, clock.clone()),
            notifications: notifications::NotificationService::new(
                circulation.clone(),
                clock,
                config.notifications.recipients.clone(),
                Arc::new(notifications::LogDispatcher),
            ),
            circulation,
        }
    }
}
