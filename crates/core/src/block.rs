//! Immutable content-addressed blocks.

use crate::hash::{self, Multihash};
use crate::{Cid, RAW_CODEC};
use bytes::Bytes;
use std::fmt;

/// An immutable payload together with the CID that addresses it.
///
/// Cloning a block is cheap: the payload is a shared [`Bytes`] buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    data: Bytes,
}

impl Block {
    /// Create a raw block addressed by a CIDv1 over the SHA2-256 of `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let cid = Cid::new_v1(RAW_CODEC, hash::sha2_256(&data));
        Self { cid, data }
    }

    /// Create a block for an existing CID, verifying the payload against it.
    ///
    /// Fails with [`crate::Error::HashMismatch`] when the payload does not hash
    /// to the CID's digest and with [`crate::Error::UnsupportedHash`] when the
    /// CID uses a hash function this crate cannot compute.
    pub fn with_cid(data: impl Into<Bytes>, cid: Cid) -> crate::Result<Self> {
        let block = Self::new_unchecked(data, cid);
        block.verify()?;
        Ok(block)
    }

    /// Create a block without checking that `data` matches `cid`.
    ///
    /// Only for payloads that were already verified by their source.
    pub fn new_unchecked(data: impl Into<Bytes>, cid: Cid) -> Self {
        Self {
            cid,
            data: data.into(),
        }
    }

    /// The block's content identifier.
    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    /// The block's payload.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Re-derive the digest from the payload and compare it with the CID.
    ///
    /// Truncated digests are compared against the matching prefix.
    pub fn verify(&self) -> crate::Result<()> {
        let expected: &Multihash = self.cid.hash();
        let actual = hash::digest(expected.code(), &self.data)?;

        let expected = expected.digest();
        if actual.digest().get(..expected.len()) != Some(expected) {
            return Err(crate::Error::HashMismatch {
                expected: hash::to_hex(expected),
                actual: hash::to_hex(actual.digest()),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({}, {} bytes)", self.cid, self.data.len())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Block {}]", self.cid)
    }
}
