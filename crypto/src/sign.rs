//! Recoverable secp256k1 signatures over Blake2b digests.
//!
//! Wire format is 65 bytes: `r (32) || s (32) || v (1)` with `v ∈ {27, 28}`.
//! Only low-s signatures are accepted so that each (key, message) pair has
//! exactly one valid encoding.

use crate::address::derive_address;
use crate::error::CryptoError;
use crate::hash::signed_message_hash;
use crate::keys::Keypair;
use claw_types::{Address, Hash32};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use std::fmt;

/// `n / 2` for the secp256k1 group order, big-endian.
pub const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// A 65-byte recoverable ECDSA signature.
#[derive(Clone, PartialEq, Eq)]
pub struct RecoverableSignature([u8; 65]);

impl RecoverableSignature {
    pub fn new(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Parse from an arbitrary byte slice, rejecting anything but 65 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 65] = bytes
            .try_into()
            .map_err(|_| CryptoError::MalformedSignature(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// The `v` byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    fn s_bytes(&self) -> &[u8] {
        &self.0[32..64]
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0[..4].iter().map(|b| format!("{b:02x}")).collect();
        write!(f, "RecoverableSignature({head}.., v={})", self.v())
    }
}

/// Sign a digest (wrapped in the signed-message envelope) with `key`.
///
/// The result is always in low-s form.
pub fn sign_digest(digest: &Hash32, key: &Keypair) -> Result<RecoverableSignature, CryptoError> {
    let message = signed_message_hash(digest);
    let (sig, recid) = key
        .signing_key()
        .sign_prehash_recoverable(message.as_bytes())
        .map_err(|_| CryptoError::SigningFailed)?;
    let (sig, recid) = match sig.normalize_s() {
        Some(low) => (low, RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced())),
        None => (sig, recid),
    };

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = 27 + recid.to_byte();
    Ok(RecoverableSignature(out))
}

/// Recover the address that produced `signature` over `digest`.
///
/// Rejects non-canonical `v` values and any `s` above the half-order before
/// attempting recovery.
pub fn recover_signer(digest: &Hash32, signature: &RecoverableSignature) -> Result<Address, CryptoError> {
    let v = signature.v();
    if v != 27 && v != 28 {
        return Err(CryptoError::InvalidRecoveryId(v));
    }
    if signature.s_bytes() > &SECP256K1_HALF_ORDER[..] {
        return Err(CryptoError::HighS);
    }

    let sig = Signature::from_slice(&signature.0[..64]).map_err(|_| CryptoError::InvalidScalar)?;
    let recid = RecoveryId::from_byte(v - 27).ok_or(CryptoError::InvalidRecoveryId(v))?;
    let message = signed_message_hash(digest);
    let key = VerifyingKey::recover_from_prehash(message.as_bytes(), &sig, recid)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(derive_address(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::keypair_from_seed;

    fn digest(byte: u8) -> Hash32 {
        Hash32::new([byte; 32])
    }

    #[test]
    fn sign_and_recover() {
        let kp = keypair_from_seed(&[7u8; 32]).unwrap();
        let sig = sign_digest(&digest(1), &kp).unwrap();
        assert!(sig.v() == 27 || sig.v() == 28);
        assert_eq!(recover_signer(&digest(1), &sig).unwrap(), kp.address());
    }

    #[test]
    fn wrong_digest_recovers_other_address() {
        let kp = keypair_from_seed(&[7u8; 32]).unwrap();
        let sig = sign_digest(&digest(1), &kp).unwrap();
        match recover_signer(&digest(2), &sig) {
            Ok(addr) => assert_ne!(addr, kp.address()),
            Err(e) => assert_eq!(e, CryptoError::RecoveryFailed),
        }
    }

    #[test]
    fn signatures_are_low_s() {
        for seed in 1u8..=8 {
            let kp = keypair_from_seed(&[seed; 32]).unwrap();
            let sig = sign_digest(&digest(seed), &kp).unwrap();
            assert!(sig.s_bytes() <= &SECP256K1_HALF_ORDER[..]);
        }
    }

    #[test]
    fn high_s_twin_is_rejected() {
        let kp = keypair_from_seed(&[9u8; 32]).unwrap();
        let sig = sign_digest(&digest(3), &kp).unwrap();
        let parsed = Signature::from_slice(&sig.as_bytes()[..64]).unwrap();
        let high_s = -*parsed.s();
        let twin = Signature::from_scalars(parsed.r().to_bytes(), high_s.to_bytes()).unwrap();

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&twin.to_bytes());
        bytes[64] = if sig.v() == 27 { 28 } else { 27 };
        let twin = RecoverableSignature::new(bytes);

        assert_eq!(recover_signer(&digest(3), &twin), Err(CryptoError::HighS));
    }

    #[test]
    fn non_canonical_v_is_rejected() {
        let kp = keypair_from_seed(&[9u8; 32]).unwrap();
        let sig = sign_digest(&digest(4), &kp).unwrap();
        for v in [0u8, 1, 29, 30, 255] {
            let mut bytes = *sig.as_bytes();
            bytes[64] = v;
            assert_eq!(
                recover_signer(&digest(4), &RecoverableSignature::new(bytes)),
                Err(CryptoError::InvalidRecoveryId(v))
            );
        }
    }

    #[test]
    fn zero_scalars_are_rejected() {
        let mut bytes = [0u8; 65];
        bytes[64] = 27;
        assert_eq!(
            recover_signer(&digest(5), &RecoverableSignature::new(bytes)),
            Err(CryptoError::InvalidScalar)
        );
    }

    #[test]
    fn from_slice_checks_length() {
        assert_eq!(
            RecoverableSignature::from_slice(&[0u8; 64]).err(),
            Some(CryptoError::MalformedSignature(64))
        );
        assert!(RecoverableSignature::from_slice(&[0u8; 65]).is_ok());
    }
}
