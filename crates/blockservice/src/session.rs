//! Sessions: a block service view that groups related reads on one
//! exchange session.

use crate::error::Result;
use crate::fetch::{self, Blocks, FetcherSource};
use crate::getter::BlockGetter;
use crate::service::BlockService;
use async_trait::async_trait;
use std::sync::Arc;
use strata_core::{Block, Cid, Context, HashPolicy};
use strata_exchange::{Fetcher, SessionExchange};
use strata_storage::Blockstore;
use tokio::sync::Mutex;

/// A read view over a [`BlockService`] for one logical operation, such as
/// walking a DAG.
///
/// When the exchange supports sessions, the first read that misses the local
/// store opens an exchange session bound to the context the `Session` was
/// created with, and every later read reuses it. Reads served entirely from
/// the store never open one. Over an exchange without session support the
/// plain exchange is used; over an offline service the session is offline too.
pub struct Session {
    blockstore: Arc<dyn Blockstore>,
    policy: HashPolicy,
    source: FetcherSource,
}

impl Session {
    pub fn new(ctx: &Context, service: &BlockService) -> Self {
        let source = match service.exchange() {
            None => FetcherSource::Offline,
            Some(exchange) => match exchange.clone().as_session_exchange() {
                Some(sessions) => {
                    FetcherSource::Session(Arc::new(LazySession::new(ctx, sessions)))
                }
                None => FetcherSource::Direct(exchange.clone()),
            },
        };

        Self {
            blockstore: service.blockstore().clone(),
            policy: service.hash_policy().clone(),
            source,
        }
    }

    /// The fetcher this session reads through, creating the exchange session
    /// on first use. `None` when offline.
    pub async fn fetcher(&self) -> Option<Arc<dyn Fetcher>> {
        self.source.resolve().await
    }
}

#[async_trait]
impl BlockGetter for Session {
    async fn get_block(&self, ctx: &Context, cid: &Cid) -> Result<Block> {
        fetch::get_block(ctx, cid, self.blockstore.as_ref(), &self.policy, &self.source).await
    }

    fn get_blocks(&self, ctx: &Context, cids: Vec<Cid>) -> Blocks {
        fetch::get_blocks(
            ctx,
            cids,
            self.blockstore.clone(),
            self.policy.clone(),
            self.source.clone(),
        )
    }
}

/// An exchange session created at most once, on demand.
pub(crate) struct LazySession {
    exchange: Arc<dyn SessionExchange>,
    ctx: Context,
    handle: Mutex<Option<Arc<dyn Fetcher>>>,
}

impl LazySession {
    fn new(ctx: &Context, exchange: Arc<dyn SessionExchange>) -> Self {
        Self {
            exchange,
            ctx: ctx.clone(),
            handle: Mutex::new(None),
        }
    }

    pub(crate) async fn fetcher(&self) -> Arc<dyn Fetcher> {
        let mut handle = self.handle.lock().await;
        if let Some(fetcher) = handle.as_ref() {
            return fetcher.clone();
        }

        tracing::debug!("Creating exchange session");
        let fetcher = self.exchange.new_session(&self.ctx);
        *handle = Some(fetcher.clone());
        fetcher
    }
}
