//! Local block store abstraction for Strata.
//!
//! This crate provides:
//! - The [`Blockstore`] contract the block service uses for its local fast path
//! - The storage error type shared by every backend
//! - An in-memory backend for offline embedding and tests

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::memory::MemoryBackend;
pub use error::{StorageError, StorageResult};
pub use traits::Blockstore;

use std::sync::Arc;
use strata_core::StorageConfig;

/// Create a block store from configuration.
pub fn from_config(config: &StorageConfig) -> Arc<dyn Blockstore> {
    tracing::debug!(hash_on_read = config.hash_on_read, "Using in-memory block store");
    Arc::new(MemoryBackend::from_config(config))
}
