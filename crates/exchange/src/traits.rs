//! Exchange trait definitions.

use crate::error::ExchangeResult;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use strata_core::{Block, Cid, Context};

/// A boxed stream of blocks delivered by the network, in arrival order.
pub type BlockStream = Pin<Box<dyn Stream<Item = Block> + Send>>;

/// Retrieves blocks from the network.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Fetch one block, waiting until it arrives or the context is done.
    async fn get_block(&self, ctx: &Context, cid: &Cid) -> ExchangeResult<Block>;

    /// Request several blocks at once.
    ///
    /// The stream yields blocks as they arrive, in no particular order, and
    /// may end before every requested block was delivered. Consumers track
    /// which CIDs they received.
    async fn get_blocks(&self, ctx: &Context, cids: Vec<Cid>) -> ExchangeResult<BlockStream>;
}

/// A network exchange: a [`Fetcher`] that can also advertise blocks.
#[async_trait]
pub trait Exchange: Fetcher {
    /// Announce that the local node now has `block`.
    async fn has_block(&self, ctx: &Context, block: &Block) -> ExchangeResult<()>;

    /// Shut the exchange down and release its resources.
    async fn close(&self) -> ExchangeResult<()>;

    /// Session capability of this exchange, if it has one.
    ///
    /// Exchanges that implement [`SessionExchange`] return `Some(self)`.
    fn as_session_exchange(self: Arc<Self>) -> Option<Arc<dyn SessionExchange>> {
        None
    }
}

/// An exchange that can group related requests into sessions.
///
/// A session keeps per-request state (which peers answered, which blocks are
/// wanted) so repeated fetches for one logical operation are cheaper than
/// independent requests.
pub trait SessionExchange: Exchange {
    /// Start a session that lives until `ctx` is done.
    fn new_session(&self, ctx: &Context) -> Arc<dyn Fetcher>;
}
