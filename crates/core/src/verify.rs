//! Hash security policy for content identifiers.
//!
//! Every CID is checked against a [`HashPolicy`] before it is used to query or
//! mutate a block store or to ask the network for a block. A CID fails the
//! policy when its hash function is not on the allow-list, when its digest is
//! too short to resist collisions, or when an inline (identity) digest is
//! larger than the policy permits.

use crate::Cid;
use crate::hash::code;
use thiserror::Error;

/// Why a CID was rejected by the hash policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("potentially insecure hash function not allowed: 0x{0:x}")]
    InsecureHashFunction(u64),

    #[error("digest too short: {len} bytes (minimum {min})")]
    DigestTooShort { len: usize, min: usize },

    #[error("identity digest too long: {len} bytes (maximum {max})")]
    IdentityTooLong { len: usize, max: usize },
}

/// Allow-list and length limits applied to every CID.
///
/// The default policy is the loosest one that can be built; [`HashPolicy::new`]
/// only accepts settings that tighten it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashPolicy {
    min_digest_len: usize,
    max_identity_len: usize,
    allow_sha1: bool,
}

impl HashPolicy {
    /// Minimum digest length in bytes for every non-identity hash.
    pub const MIN_DIGEST_LEN: usize = 20;

    /// Maximum length in bytes of an identity digest.
    pub const MAX_IDENTITY_LEN: usize = 128;

    /// Build a policy, rejecting settings looser than the defaults.
    pub fn new(
        min_digest_len: usize,
        max_identity_len: usize,
        allow_sha1: bool,
    ) -> crate::Result<Self> {
        if min_digest_len < Self::MIN_DIGEST_LEN {
            return Err(crate::Error::InvalidPolicy(format!(
                "min_digest_len {min_digest_len} is below the floor of {}",
                Self::MIN_DIGEST_LEN
            )));
        }
        if max_identity_len > Self::MAX_IDENTITY_LEN {
            return Err(crate::Error::InvalidPolicy(format!(
                "max_identity_len {max_identity_len} exceeds the ceiling of {}",
                Self::MAX_IDENTITY_LEN
            )));
        }

        Ok(Self {
            min_digest_len,
            max_identity_len,
            allow_sha1,
        })
    }

    pub fn min_digest_len(&self) -> usize {
        self.min_digest_len
    }

    pub fn max_identity_len(&self) -> usize {
        self.max_identity_len
    }

    /// Whether the hash function with this multihash code is on the allow-list.
    pub fn is_allowed(&self, hash_code: u64) -> bool {
        match hash_code {
            code::SHA1 => self.allow_sha1,
            code::IDENTITY
            | code::SHA2_256
            | code::SHA2_512
            | code::SHA3_224
            | code::SHA3_256
            | code::SHA3_384
            | code::SHA3_512
            | code::DBL_SHA2_256
            | code::KECCAK_256
            | code::KECCAK_512
            | code::BLAKE3 => true,
            // 19 steps above the minimum is the 160-bit variant.
            c if (code::BLAKE2B_MIN + 19..=code::BLAKE2B_MAX).contains(&c) => true,
            c if (code::BLAKE2S_MIN + 19..=code::BLAKE2S_MAX).contains(&c) => true,
            _ => false,
        }
    }

    /// Check a CID against this policy.
    pub fn validate(&self, cid: &Cid) -> Result<(), VerifyError> {
        let mh = cid.hash();
        let hash_code = mh.code();
        let len = usize::from(mh.size());

        if !self.is_allowed(hash_code) {
            return Err(VerifyError::InsecureHashFunction(hash_code));
        }

        if hash_code != code::IDENTITY && len < self.min_digest_len {
            return Err(VerifyError::DigestTooShort {
                len,
                min: self.min_digest_len,
            });
        }

        if hash_code == code::IDENTITY && len > self.max_identity_len {
            return Err(VerifyError::IdentityTooLong {
                len,
                max: self.max_identity_len,
            });
        }

        Ok(())
    }
}

impl Default for HashPolicy {
    fn default() -> Self {
        Self {
            min_digest_len: Self::MIN_DIGEST_LEN,
            max_identity_len: Self::MAX_IDENTITY_LEN,
            allow_sha1: true,
        }
    }
}

/// Check a CID against the default policy.
pub fn validate_cid(cid: &Cid) -> Result<(), VerifyError> {
    HashPolicy::default().validate(cid)
}
