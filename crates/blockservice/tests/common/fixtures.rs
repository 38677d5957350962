use bytes::Bytes;
use strata_core::hash::{Multihash, code};
use strata_core::{Block, Cid, RAW_CODEC};

/// Generate deterministic test data using a seeded pseudo-random generator
/// Same seed produces same output (reproducible tests)
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    // Simple LCG (Linear Congruential Generator)
    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// Raw block over seeded data
pub fn seeded_block(seed: u64) -> Block {
    Block::new(seeded_bytes(seed, 256))
}

/// CID using MD5, which no hash policy accepts
#[allow(dead_code)]
pub fn insecure_cid(seed: u64) -> Cid {
    let digest = seeded_bytes(seed, 16);
    let hash = Multihash::wrap(code::MD5, &digest).expect("16 bytes fits a multihash");
    Cid::new_v1(RAW_CODEC, hash)
}

/// Block whose CID the default policy rejects
#[allow(dead_code)]
pub fn insecure_block(seed: u64) -> Block {
    Block::new_unchecked(seeded_bytes(seed, 64), insecure_cid(seed))
}
