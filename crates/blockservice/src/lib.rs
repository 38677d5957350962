//! Hybrid block service for Strata.
//!
//! A [`BlockService`] answers block requests from a local [`Blockstore`]
//! first and falls back to a network [`Exchange`] on a miss. Writes land in
//! the store and are announced on the exchange. Every CID is checked against
//! a [`HashPolicy`] before it reaches either collaborator.
//!
//! For operations that issue many related reads, [`BlockService::new_session`]
//! returns a [`Session`] that reuses one exchange session across them.
//!
//! ```ignore
//! let service = BlockService::new(store, Some(exchange));
//! service.add_block(&ctx, &block).await?;
//! let block = service.get_block(&ctx, block.cid()).await?;
//! ```
//!
//! [`Blockstore`]: strata_storage::Blockstore
//! [`Exchange`]: strata_exchange::Exchange
//! [`HashPolicy`]: strata_core::HashPolicy

pub mod error;
mod fetch;
pub mod getter;
pub mod service;
pub mod session;

pub use error::{BlockServiceError, Result};
pub use fetch::Blocks;
pub use getter::BlockGetter;
pub use service::BlockService;
pub use session::Session;
