//! Periodic due-date check

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::infrastructure::AppState;
use crate::models::{Reminder, ReminderKind};
use crate::services::desk_service::LendingDesk;

/// Runs due-date checks, at most one at a time
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    in_progress: AtomicBool,
}

// Clears the in-progress flag however the check ends
struct CheckGuard<'a>(&'a AtomicBool);

impl Drop for CheckGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_checking(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub async fn check_due_dates(&self, desk: &Mutex<LendingDesk>) -> Option<Vec<Reminder>> {
        self.check_due_dates_at(desk, Utc::now()).await
    }

    /// Evaluate reminders at `now` and log them.
    /// Returns `None` without doing anything if a check is already running.
    pub async fn check_due_dates_at(
        &self,
        desk: &Mutex<LendingDesk>,
        now: DateTime<Utc>,
    ) -> Option<Vec<Reminder>> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Due-date check already running, skipping");
            return None;
        }
        let _guard = CheckGuard(&self.in_progress);

        let reminders = desk.lock().await.reminders(now);

        for reminder in &reminders {
            match reminder.kind {
                ReminderKind::Overdue => tracing::warn!("{}", reminder),
                ReminderKind::DueTomorrow => tracing::info!("{}", reminder),
            }
        }

        Some(reminders)
    }
}

/// Check due dates every `period`, starting immediately. Never returns.
pub async fn run_reminder_loop(state: AppState, period: Duration) {
    tracing::info!("Reminder check started, every {}s", period.as_secs());

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        state.reminders.check_due_dates(&state.desk).await;
    }
}
