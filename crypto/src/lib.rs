//! Cryptographic primitives for Claw governance.
//!
//! - **Blake2b-256** for every digest (domain-separated emergency digests,
//!   the signed-message envelope)
//! - **secp256k1 ECDSA** with public-key recovery for guardian signatures
//! - Address derivation: last 20 bytes of `blake2b_256(uncompressed_pubkey[1..])`

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::derive_address;
pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi, signed_message_hash};
pub use keys::{keypair_from_seed, Keypair};
pub use sign::{recover_signer, sign_digest, RecoverableSignature, SECP256K1_HALF_ORDER};
