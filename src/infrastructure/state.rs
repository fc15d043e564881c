//! Application state shared by the HTTP handlers and the reminder loop

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::services::desk_service::LendingDesk;
use crate::services::reminder_service::ReminderScheduler;

#[derive(Clone)]
pub struct AppState {
    /// Catalog cache and borrow ledger; every borrow/return holds this lock
    /// for its whole remote call + persist sequence
    pub desk: Arc<Mutex<LendingDesk>>,
    /// Due-date checker
    pub reminders: Arc<ReminderScheduler>,
}

impl AppState {
    pub fn new(desk: LendingDesk) -> Self {
        Self {
            desk: Arc::new(Mutex::new(desk)),
            reminders: Arc::new(ReminderScheduler::new()),
        }
    }
}
