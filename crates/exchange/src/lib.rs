//! Network exchange contracts for Strata.
//!
//! The block service never talks to the network directly. It consumes an
//! [`Exchange`] that fetches missing blocks and advertises newly stored ones,
//! and, when the exchange supports it, opens per-request sessions through
//! [`SessionExchange`]. Transport, peer discovery and wantlist management all
//! live behind these traits.

pub mod error;
pub mod traits;

pub use error::{ExchangeError, ExchangeResult};
pub use traits::{BlockStream, Exchange, Fetcher, SessionExchange};
