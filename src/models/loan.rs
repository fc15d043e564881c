use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::book::{BookId, CatalogItem};

/// Length of a loan
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// A borrowed item as kept in the ledger and in the persisted history.
///
/// Field names on the wire (`borrowedDate`, `dueDate`) match histories
/// written by earlier versions of the page; extra fields such as a stale
/// `available` flag are ignored when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "borrowedDate")]
    pub borrowed_at: DateTime<Utc>,
    #[serde(rename = "dueDate")]
    pub due_at: DateTime<Utc>,
}

impl BorrowRecord {
    /// Snapshot `item` as borrowed at `borrowed_at`
    pub fn new(item: &CatalogItem, borrowed_at: DateTime<Utc>) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            author: item.author.clone(),
            subject: item.subject.clone(),
            borrowed_at,
            due_at: borrowed_at + loan_period(),
        }
    }
}

pub fn loan_period() -> Duration {
    Duration::days(LOAN_PERIOD_DAYS)
}
