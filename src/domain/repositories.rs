//! Collaborator trait definitions
//!
//! These traits define the contract for the key-value store and the
//! remote catalog service. Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::{BookId, CatalogItem};

/// Opaque string-keyed get/set store
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if never written
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Reject a key this store could never write under
    fn check_key(&self, _key: &str) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Remote catalog / borrow / return service
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch the full catalog
    async fn fetch_books(&self) -> Result<Vec<CatalogItem>, DomainError>;

    /// Reserve a book for this user
    async fn borrow(&self, id: &BookId) -> Result<(), DomainError>;

    /// Hand a book back
    async fn return_book(&self, id: &BookId) -> Result<(), DomainError>;
}
