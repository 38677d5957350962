//! The read contract shared by [`crate::BlockService`] and [`crate::Session`].

use crate::error::Result;
use crate::fetch::Blocks;
use async_trait::async_trait;
use strata_core::{Block, Cid, Context};

/// Something that can retrieve blocks by CID.
#[async_trait]
pub trait BlockGetter: Send + Sync {
    /// Retrieve one block, from the local store if possible and otherwise
    /// from the network.
    async fn get_block(&self, ctx: &Context, cid: &Cid) -> Result<Block>;

    /// Retrieve several blocks as a stream.
    ///
    /// Unsafe CIDs are dropped, and the stream carries no errors: it simply
    /// ends once nothing more can be delivered.
    ///
    /// # Panics
    ///
    /// The lookups run on a task spawned onto the current Tokio runtime, so
    /// this panics when called outside one.
    fn get_blocks(&self, ctx: &Context, cids: Vec<Cid>) -> Blocks;
}
