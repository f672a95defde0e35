//! Overdue loan notifications
//!
//! Builds patron/book/fine snapshots for currently-overdue loans and
//! hands them to a dispatcher. Delivery mechanics live outside the
//! server; the default dispatcher records notices in the log. Recipients
//! come from configuration rather than any ambient admin account.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    clock::Clock,
    error::AppResult,
    services::circulation::CirculationService,
};

/// Snapshot of one overdue loan for outbound messaging
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OverdueNotice {
    pub loan_id: i64,
    pub patron_identifier: String,
    pub patron_name: String,
    pub title: String,
    pub accession_number: String,
    pub due_at: DateTime<Utc>,
    /// Due instant rendered on the library wall clock
    pub due_at_local: String,
    pub fine_amount: Decimal,
}

/// Outbound channel for overdue notices
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, recipients: &[String], notices: &[OverdueNotice]) -> AppResult<()>;
}

/// Dispatcher that records notices in the server log
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, recipients: &[String], notices: &[OverdueNotice]) -> AppResult<()> {
        for notice in notices {
            tracing::info!(
                loan_id = notice.loan_id,
                patron = %notice.patron_identifier,
                title = %notice.title,
                due = %notice.due_at_local,
                fine = %notice.fine_amount,
                recipients = ?recipients,
                "overdue notice"
            );
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    circulation: CirculationService,
    clock: Arc<dyn Clock>,
    recipients: Vec<String>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl NotificationService {
    pub fn new(
        circulation: CirculationService,
        clock: Arc<dyn Clock>,
        recipients: Vec<String>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            circulation,
            clock,
            recipients,
            dispatcher,
        }
    }

    /// Build the current overdue notices without dispatching them
    pub async fn overdue_notices(&self) -> AppResult<Vec<OverdueNotice>> {
        let offset = self.clock.local_offset();
        let overdue = self.circulation.overdue_loans().await?;
        Ok(overdue
            .into_iter()
            .map(|loan| OverdueNotice {
                loan_id: loan.id,
                patron_identifier: loan.patron.identifier,
                patron_name: loan.patron.name,
                title: loan.book.title,
                accession_number: loan.accession_number,
                due_at: loan.due_at,
                due_at_local: loan
                    .due_at
                    .with_timezone(&offset)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
                fine_amount: loan.fine_amount,
            })
            .collect())
    }

    /// Dispatch notices for all currently-overdue loans; no-op when none.
    /// Returns the number of notices sent.
    pub async fn notify_overdue(&self) -> AppResult<usize> {
        let notices = self.overdue_notices().await?;
        if notices.is_empty() {
            return Ok(0);
        }
        self.dispatcher.dispatch(&self.recipients, &notices).await?;
        Ok(notices.len())
    }
}
