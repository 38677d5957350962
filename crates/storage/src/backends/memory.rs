//! In-memory block store backend.

use crate::error::{StorageError, StorageResult};
use crate::traits::Blockstore;
use async_trait::async_trait;
use std::collections::HashMap;
use strata_core::{Block, Cid, Context, StorageConfig};
use tokio::sync::RwLock;
use tracing::instrument;

/// Block store that keeps every block in process memory.
///
/// Nothing is persisted. Deleting an absent block is a no-op.
#[derive(Default)]
pub struct MemoryBackend {
    blocks: RwLock<HashMap<Cid, Block>>,
    hash_on_read: bool,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store configured from `config`.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new().with_hash_on_read(config.hash_on_read)
    }

    /// Re-hash blocks on every read and reject those that no longer match
    /// their CID.
    pub fn with_hash_on_read(mut self, enabled: bool) -> Self {
        self.hash_on_read = enabled;
        self
    }

    /// Number of blocks currently stored.
    pub async fn len(&self) -> usize {
        self.blocks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blocks.read().await.is_empty()
    }

    fn check(ctx: &Context) -> StorageResult<()> {
        match ctx.error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Blockstore for MemoryBackend {
    #[instrument(skip(self, ctx), fields(backend = "memory"))]
    async fn has(&self, ctx: &Context, cid: &Cid) -> StorageResult<bool> {
        Self::check(ctx)?;
        Ok(self.blocks.read().await.contains_key(cid))
    }

    #[instrument(skip(self, ctx), fields(backend = "memory"))]
    async fn get(&self, ctx: &Context, cid: &Cid) -> StorageResult<Block> {
        Self::check(ctx)?;
        let block = self
            .blocks
            .read()
            .await
            .get(cid)
            .cloned()
            .ok_or(StorageError::NotFound(*cid))?;

        if self.hash_on_read {
            block.verify().map_err(|source| StorageError::Corrupt {
                cid: *cid,
                source,
            })?;
        }

        Ok(block)
    }

    #[instrument(skip(self, ctx), fields(backend = "memory"))]
    async fn get_size(&self, ctx: &Context, cid: &Cid) -> StorageResult<usize> {
        Self::check(ctx)?;
        self.blocks
            .read()
            .await
            .get(cid)
            .map(Block::len)
            .ok_or(StorageError::NotFound(*cid))
    }

    #[instrument(skip(self, ctx, block), fields(backend = "memory", cid = %block.cid(), size = block.len()))]
    async fn put(&self, ctx: &Context, block: &Block) -> StorageResult<()> {
        Self::check(ctx)?;
        self.blocks
            .write()
            .await
            .insert(*block.cid(), block.clone());
        Ok(())
    }

    #[instrument(skip(self, ctx, blocks), fields(backend = "memory", count = blocks.len()))]
    async fn put_many(&self, ctx: &Context, blocks: &[Block]) -> StorageResult<()> {
        Self::check(ctx)?;
        // One lock acquisition so concurrent readers see the batch all at once.
        let mut guard = self.blocks.write().await;
        for block in blocks {
            guard.insert(*block.cid(), block.clone());
        }
        Ok(())
    }

    #[instrument(skip(self, ctx), fields(backend = "memory"))]
    async fn delete_block(&self, ctx: &Context, cid: &Cid) -> StorageResult<()> {
        Self::check(ctx)?;
        self.blocks.write().await.remove(cid);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
