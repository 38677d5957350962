//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use strata_core::{Block, Cid, Context};

/// Local block store abstraction.
///
/// Implementations must be safe for concurrent use; the block service shares
/// a single store across every in-flight request. Every method takes the
/// caller's [`Context`] and should stop early with
/// [`crate::StorageError::Context`] once it is done.
#[async_trait]
pub trait Blockstore: Send + Sync + 'static {
    /// Check if a block exists.
    async fn has(&self, ctx: &Context, cid: &Cid) -> StorageResult<bool>;

    /// Get a block.
    ///
    /// Returns [`crate::StorageError::NotFound`] when the store does not hold it.
    async fn get(&self, ctx: &Context, cid: &Cid) -> StorageResult<Block>;

    /// Get a block's payload size without copying the payload.
    async fn get_size(&self, ctx: &Context, cid: &Cid) -> StorageResult<usize>;

    /// Store a block. Storing a block that is already present is not an error.
    async fn put(&self, ctx: &Context, block: &Block) -> StorageResult<()>;

    /// Store several blocks in one operation.
    ///
    /// The default implementation stores them one at a time and stops at the
    /// first failure. Backends with native batching should override it.
    async fn put_many(&self, ctx: &Context, blocks: &[Block]) -> StorageResult<()> {
        for block in blocks {
            self.put(ctx, block).await?;
        }
        Ok(())
    }

    /// Delete a block.
    ///
    /// Whether deleting an absent block is an error is up to the backend and
    /// must be documented by it.
    async fn delete_block(&self, ctx: &Context, cid: &Cid) -> StorageResult<()>;

    /// Get the name of this storage backend.
    ///
    /// Returns a static string identifier for the backend type (e.g., "memory").
    /// Used for logging.
    fn backend_name(&self) -> &'static str;
}
