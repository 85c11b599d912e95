//! Blake2b hashing for digests and the signed-message envelope.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use claw_types::Hash32;

type Blake2b256 = Blake2b<U32>;

/// Prefix applied to a 32-byte digest before it is signed, so that a
/// governance signature can never be replayed as a raw transaction signature.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Claw Signed Message:\n32";

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Wrap a digest in the signed-message envelope. This is the value that is
/// actually signed and recovered against.
pub fn signed_message_hash(digest: &Hash32) -> Hash32 {
    Hash32::new(blake2b_256_multi(&[SIGNED_MESSAGE_PREFIX, digest.as_bytes()]))
}
