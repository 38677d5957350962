//! Block store backends.

pub mod memory;
