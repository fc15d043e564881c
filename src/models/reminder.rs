use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::book::BookId;
use super::loan::BorrowRecord;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    DueTomorrow,
    Overdue,
}

/// Notice derived from a record's due date relative to a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub kind: ReminderKind,
    pub id: BookId,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub days_left: i64,
}

impl Reminder {
    /// Evaluate `record` at `now`. `None` when the due date is more than a day away.
    pub fn for_record(record: &BorrowRecord, now: DateTime<Utc>) -> Option<Self> {
        let days_left = days_left(record.due_at, now);

        let kind = if days_left <= 0 {
            ReminderKind::Overdue
        } else if days_left <= 1 {
            ReminderKind::DueTomorrow
        } else {
            return None;
        };

        Some(Self {
            kind,
            id: record.id.clone(),
            title: record.title.clone(),
            due_date: record.due_at,
            days_left,
        })
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReminderKind::DueTomorrow => {
                write!(f, "Reminder: \"{}\" is due tomorrow!", self.title)
            }
            ReminderKind::Overdue => write!(
                f,
                "Overdue: \"{}\" was due on {}!",
                self.title,
                self.due_date.format("%Y-%m-%d")
            ),
        }
    }
}

/// `ceil((due - now) / 1 day)`
pub fn days_left(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (due - now).num_milliseconds();
    let whole = ms.div_euclid(DAY_MS);
    if ms.rem_euclid(DAY_MS) == 0 {
        whole
    } else {
        whole + 1
    }
}
