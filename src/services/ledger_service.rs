//! Borrow ledger - the user's currently borrowed books
//!
//! The ledger is the only owner of the borrow history. Every mutation is
//! written through to the key-value store before it returns, and a failed
//! write undoes the in-memory change, so memory and store never disagree.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{BorrowError, KeyValueStore};
use crate::models::{BookId, BorrowRecord, CatalogItem, Reminder};

/// Default store key for the serialized history
pub const DEFAULT_LEDGER_KEY: &str = "borrowedBooks";

pub struct BorrowLedger {
    records: Vec<BorrowRecord>,
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for BorrowLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BorrowLedger")
            .field("key", &self.key)
            .field("records", &self.records)
            .finish()
    }
}

impl BorrowLedger {
    /// Like `restore`, but fails up front when `store` cannot write under `key`
    pub fn open(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Result<Self, BorrowError> {
        let key = key.into();
        store.check_key(&key)?;
        Ok(Self::restore(store, key))
    }

    /// Rebuild the ledger from the store.
    ///
    /// A missing key, an unreadable store or a malformed value all yield an
    /// empty ledger; nothing is surfaced to the caller.
    pub fn restore(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();

        let records = match store.get(&key) {
            Ok(Some(raw)) => match load(&raw) {
                Ok(records) => dedupe(records),
                Err(e) => {
                    tracing::warn!("Ignoring stored history under '{}': {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read history under '{}': {}", key, e);
                Vec::new()
            }
        };

        tracing::debug!("Restored {} borrowed book(s) from '{}'", records.len(), key);

        Self {
            records,
            store,
            key,
        }
    }

    pub fn records(&self) -> &[BorrowRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&BorrowRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.records.iter().any(|r| &r.id == id)
    }

    /// Record `item` as borrowed now
    pub fn borrow(&mut self, item: &CatalogItem) -> Result<BorrowRecord, BorrowError> {
        self.borrow_at(item, Utc::now())
    }

    /// Record `item` as borrowed at `now`, due seven days later.
    ///
    /// The remote service must already have confirmed the reservation.
    pub fn borrow_at(
        &mut self,
        item: &CatalogItem,
        now: DateTime<Utc>,
    ) -> Result<BorrowRecord, BorrowError> {
        if self.contains(&item.id) {
            return Err(BorrowError::AlreadyBorrowed(item.id.clone()));
        }

        let record = BorrowRecord::new(item, now);
        self.records.push(record.clone());

        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        tracing::info!(
            "Borrowed \"{}\" (book {}), due {}",
            record.title,
            record.id,
            record.due_at.to_rfc3339()
        );
        Ok(record)
    }

    /// Remove the record at `index`
    pub fn return_item(&mut self, index: usize) -> Result<BorrowRecord, BorrowError> {
        if index >= self.records.len() {
            return Err(BorrowError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }

        let record = self.records.remove(index);

        if let Err(e) = self.persist() {
            self.records.insert(index, record);
            return Err(e);
        }

        tracing::info!("Returned \"{}\" (book {})", record.title, record.id);
        Ok(record)
    }

    /// Reminders for every record due within a day or already overdue at `now`
    pub fn due_reminders(&self, now: DateTime<Utc>) -> impl Iterator<Item = Reminder> + '_ {
        self.records
            .iter()
            .filter_map(move |record| Reminder::for_record(record, now))
    }

    /// Write the full ledger to the store
    pub fn persist(&self) -> Result<(), BorrowError> {
        let raw = to_json(&self.records)?;
        self.store
            .set(&self.key, &raw)
            .map_err(|e| BorrowError::Storage(e.to_string()))
    }
}

/// Serialize a ledger into its stored form
pub fn to_json(records: &[BorrowRecord]) -> Result<String, BorrowError> {
    serde_json::to_string(records).map_err(|e| BorrowError::Storage(e.to_string()))
}

/// Parse a stored ledger
pub fn load(raw: &str) -> Result<Vec<BorrowRecord>, BorrowError> {
    Ok(serde_json::from_str(raw)?)
}

// Keep the first record per book id
fn dedupe(records: Vec<BorrowRecord>) -> Vec<BorrowRecord> {
    let mut seen = HashSet::new();
    let before = records.len();
    let kept: Vec<BorrowRecord> = records.into_iter().filter(|r| seen.insert(r.id.clone())).collect();

    if kept.len() != before {
        tracing::warn!(
            "Dropped {} duplicate record(s) from stored history",
            before - kept.len()
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::store::MemoryStore;
    use crate::models::{LOAN_PERIOD_DAYS, ReminderKind};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn item(id: i64, title: &str) -> CatalogItem {
        CatalogItem {
            id: BookId::from(id),
            title: title.to_string(),
            author: "Y".to_string(),
            subject: "Z".to_string(),
            available: true,
        }
    }

    fn jan_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn empty_ledger() -> (Arc<MemoryStore>, BorrowLedger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = BorrowLedger::restore(store.clone(), DEFAULT_LEDGER_KEY);
        (store, ledger)
    }

    /// Store that can be switched to refuse writes
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(DomainError::Storage("read-only".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_borrow_sets_due_date_seven_days_out() {
        let (_, mut ledger) = empty_ledger();

        let record = ledger.borrow_at(&item(7, "X"), jan_first()).unwrap();

        assert_eq!(record.id, BookId::from(7));
        assert_eq!(record.title, "X");
        assert_eq!(record.author, "Y");
        assert_eq!(record.subject, "Z");
        assert_eq!(record.borrowed_at, jan_first());
        assert_eq!(
            record.due_at,
            Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(
            record.due_at - record.borrowed_at,
            Duration::days(LOAN_PERIOD_DAYS)
        );
    }

    #[test]
    fn test_borrow_writes_through_to_store() {
        let (store, mut ledger) = empty_ledger();

        ledger.borrow_at(&item(1, "A"), jan_first()).unwrap();
        ledger.borrow_at(&item(2, "B"), jan_first()).unwrap();

        let raw = store.get(DEFAULT_LEDGER_KEY).unwrap().unwrap();
        assert_eq!(load(&raw).unwrap(), ledger.records());
    }

    #[test]
    fn test_duplicate_borrow_rejected() {
        let (_, mut ledger) = empty_ledger();
        ledger.borrow_at(&item(1, "A"), jan_first()).unwrap();

        let err = ledger.borrow_at(&item(1, "A"), jan_first()).unwrap_err();

        assert_eq!(err, BorrowError::AlreadyBorrowed(BookId::from(1)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_return_out_of_range() {
        let (_, mut ledger) = empty_ledger();
        ledger.borrow_at(&item(1, "A"), jan_first()).unwrap();

        let err = ledger.return_item(1).unwrap_err();

        assert_eq!(err, BorrowError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_return_only_record_empties_store() {
        let (store, mut ledger) = empty_ledger();
        let borrowed = ledger.borrow_at(&item(1, "A"), jan_first()).unwrap();

        let returned = ledger.return_item(0).unwrap();

        assert_eq!(returned, borrowed);
        assert!(ledger.is_empty());
        let raw = store.get(DEFAULT_LEDGER_KEY).unwrap().unwrap();
        assert!(load(&raw).unwrap().is_empty());
    }

    #[test]
    fn test_return_keeps_order_of_remaining() {
        let (_, mut ledger) = empty_ledger();
        for (id, title) in [(1, "A"), (2, "B"), (3, "C")] {
            ledger.borrow_at(&item(id, title), jan_first()).unwrap();
        }

        let returned = ledger.return_item(1).unwrap();

        assert_eq!(returned.id, BookId::from(2));
        let ids: Vec<BookId> = ledger.records().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![BookId::from(1), BookId::from(3)]);
    }

    #[test]
    fn test_length_tracks_borrows_minus_returns() {
        let (_, mut ledger) = empty_ledger();
        let mut borrows = 0;
        let mut returns = 0;

        for id in 0..6 {
            ledger.borrow_at(&item(id, "T"), jan_first()).unwrap();
            borrows += 1;
            if id % 2 == 1 {
                ledger.return_item(0).unwrap();
                returns += 1;
            }
            assert_eq!(ledger.len(), borrows - returns);
        }

        while !ledger.is_empty() {
            ledger.return_item(ledger.len() - 1).unwrap();
            returns += 1;
        }
        assert_eq!(borrows, returns);
        assert!(ledger.return_item(0).is_err());
    }

    #[test]
    fn test_restore_round_trips_persisted_ledger() {
        let (store, mut ledger) = empty_ledger();
        ledger.borrow_at(&item(1, "A"), jan_first()).unwrap();
        ledger
            .borrow_at(&item(2, "B"), jan_first() + Duration::hours(5))
            .unwrap();

        let restored = BorrowLedger::restore(store, DEFAULT_LEDGER_KEY);

        assert_eq!(restored.records(), ledger.records());
    }

    #[test]
    fn test_restore_malformed_yields_empty() {
        for raw in ["not json", "{}", "[{\"id\": \"x\"}]", "null", ""] {
            let store = Arc::new(MemoryStore::new());
            store.set(DEFAULT_LEDGER_KEY, raw).unwrap();

            let ledger = BorrowLedger::restore(store.clone(), DEFAULT_LEDGER_KEY);
            assert!(ledger.is_empty(), "input {:?} should give an empty ledger", raw);

            // Restoring twice gives the same answer
            let again = BorrowLedger::restore(store, DEFAULT_LEDGER_KEY);
            assert!(again.is_empty());
        }
    }

    #[test]
    fn test_restore_accepts_legacy_history() {
        let store = Arc::new(MemoryStore::new());
        let raw = r#"[{"id": 3, "title": "SICP", "author": "Abelson", "subject": "CS",
            "available": false,
            "borrowedDate": "2024-02-01T10:00:00.000Z",
            "dueDate": "2024-02-08T10:00:00.000Z"}]"#;
        store.set(DEFAULT_LEDGER_KEY, raw).unwrap();

        let ledger = BorrowLedger::restore(store, DEFAULT_LEDGER_KEY);

        assert_eq!(ledger.len(), 1);
        let record = ledger.get(0).unwrap();
        assert_eq!(record.id, BookId::from(3));
        assert_eq!(
            record.due_at,
            Utc.with_ymd_and_hms(2024, 2, 8, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_restore_keeps_string_ids() {
        let store = Arc::new(MemoryStore::new());
        let raw = r#"[{"id": "a1", "title": "SICP", "author": "Abelson", "subject": "CS",
            "borrowedDate": "2024-02-01T10:00:00.000Z",
            "dueDate": "2024-02-08T10:00:00.000Z"}]"#;
        store.set(DEFAULT_LEDGER_KEY, raw).unwrap();

        let mut ledger = BorrowLedger::restore(store.clone(), DEFAULT_LEDGER_KEY);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0).unwrap().id, BookId::from("a1"));
        assert!(ledger.contains(&BookId::from("a1")));

        // Written back as a string, never as a number
        ledger.borrow_at(&item(2, "B"), jan_first()).unwrap();
        let stored: serde_json::Value =
            serde_json::from_str(&store.get(DEFAULT_LEDGER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored[0]["id"], serde_json::json!("a1"));
        assert_eq!(stored[1]["id"], serde_json::json!(2));
    }

    #[test]
    fn test_open_accepts_usable_key() {
        let store = Arc::new(MemoryStore::new());
        let ledger = BorrowLedger::open(store, DEFAULT_LEDGER_KEY).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_restore_drops_duplicate_ids() {
        let (store, mut ledger) = empty_ledger();
        ledger.borrow_at(&item(1, "A"), jan_first()).unwrap();
        let mut doubled = ledger.records().to_vec();
        doubled.push(doubled[0].clone());
        store
            .set(DEFAULT_LEDGER_KEY, &to_json(&doubled).unwrap())
            .unwrap();

        let restored = BorrowLedger::restore(store, DEFAULT_LEDGER_KEY);

        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            fail_writes: AtomicBool::new(false),
        });
        let mut ledger = BorrowLedger::restore(store.clone(), DEFAULT_LEDGER_KEY);
        ledger.borrow_at(&item(1, "A"), jan_first()).unwrap();
        store.fail_writes.store(true, Ordering::SeqCst);

        let err = ledger.borrow_at(&item(2, "B"), jan_first()).unwrap_err();
        assert!(matches!(err, BorrowError::Storage(_)));
        assert_eq!(ledger.len(), 1);

        let err = ledger.return_item(0).unwrap_err();
        assert!(matches!(err, BorrowError::Storage(_)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0).unwrap().id, BookId::from(1));

        let raw = store.get(DEFAULT_LEDGER_KEY).unwrap().unwrap();
        assert_eq!(load(&raw).unwrap(), ledger.records());
    }

    #[test]
    fn test_due_reminders() {
        let (_, mut ledger) = empty_ledger();
        let now = jan_first();

        // due in 12 hours
        ledger
            .borrow_at(&item(1, "Soon"), now - Duration::days(7) + Duration::hours(12))
            .unwrap();
        // due yesterday
        ledger
            .borrow_at(&item(2, "Late"), now - Duration::days(8))
            .unwrap();
        // due in a week
        ledger.borrow_at(&item(3, "Fresh"), now).unwrap();

        let reminders: Vec<Reminder> = ledger.due_reminders(now).collect();

        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].kind, ReminderKind::DueTomorrow);
        assert_eq!(reminders[0].id, BookId::from(1));
        assert_eq!(reminders[1].kind, ReminderKind::Overdue);
        assert_eq!(reminders[1].id, BookId::from(2));

        // Evaluating reminders leaves the ledger untouched
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.due_reminders(now).count(), 2);
    }
}
