//! Local-first read path shared by the block service and its sessions.
//!
//! Both readers run the same two algorithms and differ only in where the
//! network fetcher comes from, which [`FetcherSource`] captures. The fetcher
//! is resolved only after a local miss, so requests that are served entirely
//! by the block store never start an exchange session.

use crate::error::{BlockServiceError, Result};
use crate::session::LazySession;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use strata_core::{Block, Cid, Context, HashPolicy};
use strata_exchange::Fetcher;
use strata_storage::Blockstore;
use tokio::sync::mpsc;

/// Where the read path obtains its network fetcher on a local miss.
#[derive(Clone)]
pub(crate) enum FetcherSource {
    /// No exchange configured; local misses are final.
    Offline,
    /// A fetcher that is ready to use.
    Direct(Arc<dyn Fetcher>),
    /// A session fetcher created on first use.
    Session(Arc<LazySession>),
}

impl FetcherSource {
    pub(crate) async fn resolve(&self) -> Option<Arc<dyn Fetcher>> {
        match self {
            Self::Offline => None,
            Self::Direct(fetcher) => Some(fetcher.clone()),
            Self::Session(lazy) => Some(lazy.fetcher().await),
        }
    }
}

/// Blocks produced by a batched read, delivered as they become available.
///
/// Blocks found locally arrive first, in request order; blocks fetched from
/// the network follow in arrival order. The stream may end before every
/// requested block was delivered, so callers compare what they received
/// against what they asked for. Once the context is done the stream ends
/// without yielding anything further. Dropping the stream stops the producer.
pub struct Blocks {
    rx: mpsc::Receiver<Block>,
    ctx: Context,
}

impl Stream for Blocks {
    type Item = Block;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Block>> {
        if self.ctx.is_done() {
            self.rx.close();
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

/// Fetch one block: local store first, then the network.
pub(crate) async fn get_block(
    ctx: &Context,
    cid: &Cid,
    store: &dyn Blockstore,
    policy: &HashPolicy,
    source: &FetcherSource,
) -> Result<Block> {
    policy
        .validate(cid)
        .map_err(|e| BlockServiceError::invalid_cid(cid, e))?;

    let err = match ctx.run(store.get(ctx, cid)).await? {
        Ok(block) => return Ok(block),
        Err(err) => err,
    };

    if !err.is_not_found() {
        tracing::debug!(cid = %cid, error = %err, "Block store lookup failed");
        return Err(err.into());
    }

    // Resolving the source may start an exchange session.
    let Some(fetcher) = source.resolve().await else {
        tracing::debug!(cid = %cid, "Block not found locally and no exchange configured");
        return Err(BlockServiceError::NotFound(*cid));
    };

    tracing::debug!(cid = %cid, "Searching the exchange");
    let block = ctx.run(fetcher.get_block(ctx, cid)).await??;
    tracing::debug!(cid = %cid, "Block fetched");

    Ok(block)
}

/// Start a batched read and return the stream it feeds.
///
/// Must be called from within a Tokio runtime.
///
/// The producer reserves a slot in the channel before each lookup, so it
/// never fetches a block until the consumer has taken the previous one.
pub(crate) fn get_blocks(
    ctx: &Context,
    cids: Vec<Cid>,
    store: Arc<dyn Blockstore>,
    policy: HashPolicy,
    source: FetcherSource,
) -> Blocks {
    let (tx, rx) = mpsc::channel(1);
    let ctx = ctx.clone();
    let producer_ctx = ctx.clone();

    // The sender moves into the task; the stream ends when the task returns.
    tokio::spawn(async move {
        produce(&producer_ctx, cids, store.as_ref(), &policy, &source, &tx).await;
    });

    Blocks { rx, ctx }
}

async fn produce(
    ctx: &Context,
    cids: Vec<Cid>,
    store: &dyn Blockstore,
    policy: &HashPolicy,
    source: &FetcherSource,
    tx: &mpsc::Sender<Block>,
) {
    let cids = retain_valid(policy, cids);

    let mut misses = Vec::new();
    for cid in cids {
        let Some(permit) = reserve(ctx, tx).await else {
            return;
        };

        match ctx.run(store.get(ctx, &cid)).await {
            Err(_) => return,
            Ok(Ok(hit)) => permit.send(hit),
            Ok(Err(_)) => misses.push(cid),
        }
    }

    if misses.is_empty() {
        return;
    }

    let Some(fetcher) = source.resolve().await else {
        return;
    };

    let mut remote = match ctx.run(fetcher.get_blocks(ctx, misses)).await {
        Ok(Ok(remote)) => remote,
        Ok(Err(err)) => {
            tracing::debug!(error = %err, "Exchange batch request failed");
            return;
        }
        Err(_) => return,
    };

    loop {
        let Some(permit) = reserve(ctx, tx).await else {
            return;
        };

        let block = tokio::select! {
            biased;
            _ = ctx.done() => return,
            _ = tx.closed() => return,
            next = remote.next() => match next {
                Some(block) => block,
                None => return,
            },
        };

        tracing::debug!(cid = %block.cid(), "Block fetched");
        permit.send(block);
    }
}

/// Drop CIDs that fail the hash policy, logging each one.
fn retain_valid(policy: &HashPolicy, cids: Vec<Cid>) -> Vec<Cid> {
    if cids.iter().all(|cid| policy.validate(cid).is_ok()) {
        return cids;
    }

    cids.into_iter()
        .filter(|cid| match policy.validate(cid) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(cid = %cid, error = %err, "Unsafe CID passed to get_blocks");
                false
            }
        })
        .collect()
}

/// Wait until the consumer can take another block. `None` once the context
/// is done or the stream was dropped.
async fn reserve<'a>(
    ctx: &Context,
    tx: &'a mpsc::Sender<Block>,
) -> Option<mpsc::Permit<'a, Block>> {
    tokio::select! {
        biased;
        _ = ctx.done() => None,
        permit = tx.reserve() => permit.ok(),
    }
}
