//! secp256k1 key handling.

use crate::address::derive_address;
use crate::error::CryptoError;
use claw_types::Address;
use k256::ecdsa::{SigningKey, VerifyingKey};

/// A secp256k1 signing key together with its derived address.
pub struct Keypair {
    signing: SigningKey,
    address: Address,
}

impl Keypair {
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing.verifying_key()
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

/// Derive a key pair from a 32-byte secret (deterministic).
///
/// Fails if the bytes are zero or not below the curve order.
pub fn keypair_from_seed(seed: &[u8; 32]) -> Result<Keypair, CryptoError> {
    let signing = SigningKey::from_slice(seed).map_err(|_| CryptoError::InvalidSecretKey)?;
    let address = derive_address(signing.verifying_key());
    Ok(Keypair { signing, address })
}
