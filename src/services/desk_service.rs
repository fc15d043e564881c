//! Lending desk - catalog cache, search and the borrow/return flow
//!
//! Every state change is confirmed by the remote catalog service first.
//! A remote failure leaves the catalog cache, the ledger and the store as
//! they were.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::{BorrowError, CatalogService};
use crate::models::{
    BookId, BorrowRecord, CatalogItem, DISCOVER_SUGGESTIONS, DiscoverSuggestion, Reminder,
};
use crate::services::ledger_service::BorrowLedger;

pub struct LendingDesk {
    catalog: Vec<CatalogItem>,
    ledger: BorrowLedger,
    remote: Arc<dyn CatalogService>,
}

impl LendingDesk {
    /// Desk with an empty catalog cache; call `refresh_catalog` to fill it
    pub fn new(ledger: BorrowLedger, remote: Arc<dyn CatalogService>) -> Self {
        Self {
            catalog: Vec::new(),
            ledger,
            remote,
        }
    }

    /// Replace the catalog cache with a fresh copy from the remote service
    pub async fn refresh_catalog(&mut self) -> Result<usize, BorrowError> {
        match self.remote.fetch_books().await {
            Ok(books) => {
                self.catalog = books;
                tracing::info!("Catalog refreshed: {} book(s)", self.catalog.len());
                Ok(self.catalog.len())
            }
            Err(e) => {
                tracing::error!("Error fetching books: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn catalog(&self) -> &[CatalogItem] {
        &self.catalog
    }

    /// Catalog entries whose title, author or subject contain `query`,
    /// ignoring case. A blank query returns the whole catalog.
    pub fn search(&self, query: &str) -> Vec<CatalogItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.catalog.clone();
        }

        self.catalog
            .iter()
            .filter(|book| book.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn discover(&self) -> &'static [DiscoverSuggestion] {
        &DISCOVER_SUGGESTIONS
    }

    pub fn history(&self) -> &[BorrowRecord] {
        self.ledger.records()
    }

    pub fn reminders(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        self.ledger.due_reminders(now).collect()
    }

    /// Resolve a path segment to the catalog id it displays as, so "7"
    /// finds a string id "7" as well as the number 7
    pub fn lookup_id(&self, key: &str) -> BookId {
        self.catalog
            .iter()
            .find(|b| b.id.to_string() == key)
            .map(|b| b.id.clone())
            .unwrap_or_else(|| BookId::from_key(key))
    }

    /// Borrow a catalog book: remote reservation first, then the ledger
    pub async fn borrow(&mut self, id: BookId) -> Result<BorrowRecord, BorrowError> {
        let item = self
            .catalog
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| BorrowError::NotInCatalog(id.clone()))?;

        if self.ledger.contains(&id) {
            return Err(BorrowError::AlreadyBorrowed(id));
        }

        if let Err(e) = self.remote.borrow(&id).await {
            tracing::error!("Error borrowing book {}: {}", id, e);
            return Err(e.into());
        }

        let record = self.ledger.borrow(&item)?;
        self.set_available(&id, false);

        Ok(record)
    }

    /// Return the book at `index` in the history
    pub async fn return_item(&mut self, index: usize) -> Result<BorrowRecord, BorrowError> {
        let id = match self.ledger.get(index) {
            Some(record) => record.id.clone(),
            None => {
                return Err(BorrowError::IndexOutOfRange {
                    index,
                    len: self.ledger.len(),
                });
            }
        };

        if let Err(e) = self.remote.return_book(&id).await {
            tracing::error!("Error returning book {}: {}", id, e);
            return Err(e.into());
        }

        let record = self.ledger.return_item(index)?;
        self.set_available(&id, true);

        Ok(record)
    }

    fn set_available(&mut self, id: &BookId, available: bool) {
        if let Some(book) = self.catalog.iter_mut().find(|b| &b.id == id) {
            book.available = available;
        }
    }
}
