//! Core domain types and shared logic for the Strata block service.
//!
//! This crate defines the data model used across all other crates:
//! - Blocks and their content identifiers (CIDs)
//! - Multihash codes and digest computation
//! - The hash security policy applied to every CID
//! - The cancellation context threaded through every operation
//! - Block service configuration

pub mod block;
pub mod config;
pub mod context;
pub mod error;
pub mod hash;
pub mod verify;

pub use block::Block;
pub use cid::Cid;
pub use config::{BlockServiceConfig, HashPolicyConfig, StorageConfig};
pub use context::{Context, ContextError};
pub use error::{Error, Result};
pub use hash::Multihash;
pub use verify::{HashPolicy, VerifyError, validate_cid};

/// Multicodec for raw binary blocks.
pub const RAW_CODEC: u64 = 0x55;
