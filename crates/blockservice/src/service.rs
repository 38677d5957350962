//! The block service: a local block store backed by an optional network
//! exchange.

use crate::error::{BlockServiceError, Result};
use crate::fetch::{self, Blocks, FetcherSource};
use crate::getter::BlockGetter;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;
use strata_core::{Block, BlockServiceConfig, Cid, Context, HashPolicy};
use strata_exchange::Exchange;
use strata_storage::Blockstore;

/// Serves blocks from a local store, falling back to a network exchange.
///
/// Reads go to the store first and only reach the exchange on a miss. Writes
/// go to the store and are then announced on the exchange. Without an
/// exchange the service runs offline: misses are final and nothing is
/// announced.
///
/// Blocks fetched from the network are returned to the caller but not
/// written to the store.
pub struct BlockService {
    blockstore: Arc<dyn Blockstore>,
    exchange: Option<Arc<dyn Exchange>>,
    check_first: bool,
    policy: HashPolicy,
}

impl BlockService {
    /// Create a service that skips writing blocks the store already has.
    pub fn new(blockstore: Arc<dyn Blockstore>, exchange: Option<Arc<dyn Exchange>>) -> Self {
        Self::build(blockstore, exchange, true, HashPolicy::default())
    }

    /// Create a service that writes every block, even ones already stored.
    pub fn new_write_through(
        blockstore: Arc<dyn Blockstore>,
        exchange: Option<Arc<dyn Exchange>>,
    ) -> Self {
        Self::build(blockstore, exchange, false, HashPolicy::default())
    }

    /// Create a service from loaded configuration.
    pub fn from_config(
        config: &BlockServiceConfig,
        blockstore: Arc<dyn Blockstore>,
        exchange: Option<Arc<dyn Exchange>>,
    ) -> strata_core::Result<Self> {
        config.validate().map_err(strata_core::Error::Config)?;
        let policy = config.hash_policy.to_policy()?;

        Ok(Self::build(blockstore, exchange, config.check_first, policy))
    }

    fn build(
        blockstore: Arc<dyn Blockstore>,
        exchange: Option<Arc<dyn Exchange>>,
        check_first: bool,
        policy: HashPolicy,
    ) -> Self {
        if exchange.is_none() {
            tracing::debug!(
                backend = blockstore.backend_name(),
                "Block service running in offline mode"
            );
        }

        Self {
            blockstore,
            exchange,
            check_first,
            policy,
        }
    }

    /// Replace the hash policy applied to every CID.
    pub fn with_hash_policy(mut self, policy: HashPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn blockstore(&self) -> &Arc<dyn Blockstore> {
        &self.blockstore
    }

    /// The network exchange, or `None` when running offline.
    pub fn exchange(&self) -> Option<&Arc<dyn Exchange>> {
        self.exchange.as_ref()
    }

    pub fn check_first(&self) -> bool {
        self.check_first
    }

    pub fn hash_policy(&self) -> &HashPolicy {
        &self.policy
    }

    /// Start a session for one logical operation, bound to `ctx`.
    pub fn new_session(&self, ctx: &Context) -> Session {
        Session::new(ctx, self)
    }

    fn source(&self) -> FetcherSource {
        match &self.exchange {
            Some(exchange) => FetcherSource::Direct(exchange.clone()),
            None => FetcherSource::Offline,
        }
    }

    fn validate(&self, cid: &Cid) -> Result<()> {
        self.policy
            .validate(cid)
            .map_err(|e| BlockServiceError::invalid_cid(cid, e))
    }

    /// Store a block and announce it on the exchange.
    ///
    /// With the check-first policy a block the store already has is neither
    /// written nor announced. Announcement failures are logged and never
    /// returned.
    pub async fn add_block(&self, ctx: &Context, block: &Block) -> Result<()> {
        let cid = block.cid();
        self.validate(cid)?;

        if self.check_first && ctx.run(self.blockstore.has(ctx, cid)).await?? {
            return Ok(());
        }

        ctx.run(self.blockstore.put(ctx, block)).await??;
        tracing::debug!(cid = %cid, size = block.len(), "Block added");

        if let Some(exchange) = &self.exchange {
            announce(ctx, exchange.as_ref(), block).await;
        }

        Ok(())
    }

    /// Store several blocks with a single batch write, then announce each
    /// one that was written.
    ///
    /// Every CID is validated before anything is written, so one unsafe CID
    /// rejects the whole batch.
    pub async fn add_blocks(&self, ctx: &Context, blocks: &[Block]) -> Result<()> {
        for block in blocks {
            self.validate(block.cid())?;
        }

        let to_put: Vec<Block> = if self.check_first {
            let mut missing = Vec::with_capacity(blocks.len());
            for block in blocks {
                if !ctx.run(self.blockstore.has(ctx, block.cid())).await?? {
                    missing.push(block.clone());
                }
            }
            missing
        } else {
            blocks.to_vec()
        };

        if to_put.is_empty() {
            return Ok(());
        }

        ctx.run(self.blockstore.put_many(ctx, &to_put)).await??;
        tracing::debug!(count = to_put.len(), "Blocks added");

        if let Some(exchange) = &self.exchange {
            for block in &to_put {
                announce(ctx, exchange.as_ref(), block).await;
            }
        }

        Ok(())
    }

    /// Remove a block from the local store. The network is not involved.
    pub async fn delete_block(&self, ctx: &Context, cid: &Cid) -> Result<()> {
        self.validate(cid)?;

        ctx.run(self.blockstore.delete_block(ctx, cid)).await??;
        tracing::debug!(cid = %cid, "Block removed from block store");

        Ok(())
    }

    /// Shut down the exchange. The block store is left to its owner.
    pub async fn close(&self) -> Result<()> {
        tracing::debug!("Block service is shutting down");

        match &self.exchange {
            Some(exchange) => Ok(exchange.close().await?),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BlockGetter for BlockService {
    async fn get_block(&self, ctx: &Context, cid: &Cid) -> Result<Block> {
        fetch::get_block(
            ctx,
            cid,
            self.blockstore.as_ref(),
            &self.policy,
            &self.source(),
        )
        .await
    }

    fn get_blocks(&self, ctx: &Context, cids: Vec<Cid>) -> Blocks {
        fetch::get_blocks(
            ctx,
            cids,
            self.blockstore.clone(),
            self.policy.clone(),
            self.source(),
        )
    }
}

/// Tell the exchange we have `block`. Failures are logged, not returned.
async fn announce(ctx: &Context, exchange: &dyn Exchange, block: &Block) {
    let result = match ctx.run(exchange.has_block(ctx, block)).await {
        Ok(result) => result,
        Err(err) => Err(err.into()),
    };

    if let Err(err) = result {
        tracing::error!(
            cid = %block.cid(),
            error = %err,
            "Failed to announce block to the exchange"
        );
    }
}
