//! Domain error types
//!
//! `DomainError` is what store and remote-service implementations return.
//! `BorrowError` is what ledger and desk operations return to callers.

use std::fmt;

use crate::models::BookId;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation error with message
    Validation(String),
    /// Local persistence error
    Storage(String),
    /// External service error
    External(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Storage(msg) => write!(f, "Storage error: {}", msg),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Failure of a borrow-ledger or lending-desk operation
#[derive(Debug, Clone, PartialEq)]
pub enum BorrowError {
    /// The ledger already holds an active record for this item
    AlreadyBorrowed(BookId),
    /// No record at that ledger position
    IndexOutOfRange { index: usize, len: usize },
    /// Persisted history could not be decoded
    PersistenceCorrupt(String),
    /// The remote catalog service refused or could not be reached
    RemoteFailure(String),
    /// The item is not in the cached catalog
    NotInCatalog(BookId),
    /// The ledger could not be written to the store
    Storage(String),
}

impl fmt::Display for BorrowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorrowError::AlreadyBorrowed(id) => write!(f, "Book {} is already borrowed", id),
            BorrowError::IndexOutOfRange { index, len } => write!(
                f,
                "No borrowed book at position {} (history has {} entries)",
                index, len
            ),
            BorrowError::PersistenceCorrupt(msg) => {
                write!(f, "Stored borrowing history is corrupt: {}", msg)
            }
            BorrowError::RemoteFailure(msg) => write!(f, "Catalog service failure: {}", msg),
            BorrowError::NotInCatalog(id) => write!(f, "Book {} is not in the catalog", id),
            BorrowError::Storage(msg) => write!(f, "Could not save borrowing history: {}", msg),
        }
    }
}

impl std::error::Error for BorrowError {}

impl From<DomainError> for BorrowError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::External(msg) => BorrowError::RemoteFailure(msg),
            other => BorrowError::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for BorrowError {
    fn from(e: serde_json::Error) -> Self {
        BorrowError::PersistenceCorrupt(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_mapping() {
        assert_eq!(
            BorrowError::from(DomainError::External("503".to_string())),
            BorrowError::RemoteFailure("503".to_string())
        );
        assert!(matches!(
            BorrowError::from(DomainError::Storage("disk full".to_string())),
            BorrowError::Storage(msg) if msg.contains("disk full")
        ));
    }
}
