//! Services Layer
//!
//! Business logic with no HTTP layer. The API handlers and the reminder
//! loop call into these.

pub mod desk_service;
pub mod ledger_service;
pub mod reminder_service;

// Re-export for convenience
pub use desk_service::LendingDesk;
pub use ledger_service::BorrowLedger;
pub use reminder_service::{ReminderScheduler, run_reminder_loop};
