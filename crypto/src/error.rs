use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("signature must be 65 bytes, got {0}")]
    MalformedSignature(usize),

    #[error("signature r/s components are not valid scalars")]
    InvalidScalar,

    #[error("recovery id {0} is not canonical (expected 27 or 28)")]
    InvalidRecoveryId(u8),

    #[error("signature s value exceeds the curve half-order")]
    HighS,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("secret key bytes are not a valid secp256k1 scalar")]
    InvalidSecretKey,

    #[error("signing failed")]
    SigningFailed,
}
