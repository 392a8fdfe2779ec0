//! Transactional persistence boundary.
//!
//! The repository and unit of work only need `begin`/`commit`/`rollback`,
//! insert, select-by-filter and delete-by-field. This module provides an
//! in-memory implementation of that contract with snapshot sessions and
//! per-row optimistic conflict checks.

pub mod filter;
pub mod in_memory;
pub mod record;

pub use filter::Filter;
pub use in_memory::{Database, RowId, Session};
pub use record::{Record, Stored, Table};

use thiserror::Error;

use catalog_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A natural key (sku, email) is already taken in the table.
    #[error("{table} with {field} '{key}' already exists")]
    DuplicateKey {
        table: Table,
        field: &'static str,
        key: String,
    },

    /// Another session wrote or removed a row this one also wrote.
    #[error("concurrent modification of row {row} (read at version {expected}, written at {actual})")]
    Conflict { row: RowId, expected: u64, actual: u64 },

    /// Internal lock poisoning.
    #[error("database lock poisoned")]
    Poisoned,
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateKey { .. } => DomainError::DuplicateKey(value.to_string()),
            StoreError::Conflict { .. } => DomainError::Conflict(value.to_string()),
            StoreError::Poisoned => DomainError::Internal(value.to_string()),
        }
    }
}
