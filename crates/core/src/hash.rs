//! Multihash codes and digest computation.

use sha2::{Digest, Sha256, Sha512};

/// Multihash with the 64-byte digest capacity used by [`cid::Cid`].
pub type Multihash = cid::multihash::Multihash<64>;

/// Multihash function codes from the multicodec table.
pub mod code {
    pub const IDENTITY: u64 = 0x00;
    pub const SHA1: u64 = 0x11;
    pub const SHA2_256: u64 = 0x12;
    pub const SHA2_512: u64 = 0x13;
    pub const SHA3_512: u64 = 0x14;
    pub const SHA3_384: u64 = 0x15;
    pub const SHA3_256: u64 = 0x16;
    pub const SHA3_224: u64 = 0x17;
    pub const KECCAK_256: u64 = 0x1b;
    pub const KECCAK_512: u64 = 0x1d;
    pub const BLAKE3: u64 = 0x1e;
    pub const DBL_SHA2_256: u64 = 0x56;
    pub const MD5: u64 = 0xd5;

    /// BLAKE2b codes run from an 8-bit digest (`0xb201`) to 512 bits (`0xb240`).
    pub const BLAKE2B_MIN: u64 = 0xb201;
    pub const BLAKE2B_MAX: u64 = 0xb240;

    /// BLAKE2s codes run from an 8-bit digest (`0xb241`) to 256 bits (`0xb260`).
    pub const BLAKE2S_MIN: u64 = 0xb241;
    pub const BLAKE2S_MAX: u64 = 0xb260;
}

/// Compute the multihash of `data` with the given hash function.
///
/// Only the functions the block layer needs to verify payloads are supported:
/// identity, SHA2-256 and SHA2-512.
pub fn digest(hash_code: u64, data: &[u8]) -> crate::Result<Multihash> {
    let bytes = match hash_code {
        code::IDENTITY => data.to_vec(),
        code::SHA2_256 => Sha256::digest(data).to_vec(),
        code::SHA2_512 => Sha512::digest(data).to_vec(),
        other => return Err(crate::Error::UnsupportedHash(other)),
    };

    Multihash::wrap(hash_code, &bytes).map_err(|e| crate::Error::InvalidHash(e.to_string()))
}

/// Compute the SHA2-256 multihash of `data`.
pub fn sha2_256(data: &[u8]) -> Multihash {
    let digest: [u8; 32] = Sha256::digest(data).into();
    // 32 bytes always fit the 64-byte buffer.
    Multihash::wrap(code::SHA2_256, &digest).unwrap_or_default()
}

/// Encode bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
