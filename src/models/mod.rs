pub mod book;
pub mod loan;
pub mod reminder;

pub use book::{BookId, CatalogItem, DISCOVER_SUGGESTIONS, DiscoverSuggestion};
pub use loan::{BorrowRecord, LOAN_PERIOD_DAYS};
pub use reminder::{Reminder, ReminderKind};
