//! Address derivation from secp256k1 public keys.

use crate::hash::blake2b_256;
use claw_types::Address;
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

/// Derive the account address of a public key.
///
/// Hashes the 64-byte uncompressed point (without the `0x04` tag) and keeps
/// the trailing 20 bytes.
pub fn derive_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = blake2b_256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::new(out)
}
