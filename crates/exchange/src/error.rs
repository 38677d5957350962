//! Exchange error types.

use strata_core::{Cid, ContextError};
use thiserror::Error;

/// Errors surfaced by a network exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("block not found on the network: {0}")]
    NotFound(Cid),

    #[error("exchange closed")]
    Closed,

    #[error("network error: {0}")]
    Network(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl ExchangeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for exchange operations.
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
