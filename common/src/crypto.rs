//! Hashing helpers

use crate::hash::Hash;
use blake2::{digest::consts::U32, Blake2b, Digest};

/// Blake2b-256 of `bytes`, the hash used for transaction ids and datum hashes
pub fn blake2b_256(bytes: &[u8]) -> Hash<32> {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(bytes);
    Hash::new(hasher.finalize().into())
}
