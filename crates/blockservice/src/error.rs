//! Block service error types.

use strata_core::{Cid, ContextError, VerifyError};
use strata_exchange::ExchangeError;
use strata_storage::StorageError;
use thiserror::Error;

/// Errors returned by the block service and its sessions.
///
/// Store and exchange failures are passed through unchanged.
#[derive(Debug, Error)]
pub enum BlockServiceError {
    #[error("unsafe cid {cid}: {source}")]
    InvalidCid {
        cid: Cid,
        #[source]
        source: VerifyError,
    },

    #[error("block not found: {0}")]
    NotFound(Cid),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl BlockServiceError {
    /// Whether the block could not be found, locally or on the network.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Storage(e) => e.is_not_found(),
            Self::Exchange(e) => e.is_not_found(),
            _ => false,
        }
    }

    pub(crate) fn invalid_cid(cid: &Cid, source: VerifyError) -> Self {
        Self::InvalidCid { cid: *cid, source }
    }
}

/// Result type for block service operations.
pub type Result<T> = std::result::Result<T, BlockServiceError>;
