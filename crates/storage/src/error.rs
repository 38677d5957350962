//! Storage error types.

use strata_core::{Cid, ContextError};
use thiserror::Error;

/// Block store operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("block not found: {0}")]
    NotFound(Cid),

    #[error("backend error: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("corrupt block {cid}: {source}")]
    Corrupt {
        cid: Cid,
        #[source]
        source: strata_core::Error,
    },

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl StorageError {
    /// Whether the store simply does not hold the requested block.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
