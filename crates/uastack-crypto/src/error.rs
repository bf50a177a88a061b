//! Error types for the crypto crate.

/// Errors raised by the cryptographic primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid AES key length: {actual} bytes (expected 16 or 32)")]
    InvalidKeyLength { actual: usize },

    #[error("invalid IV length: {actual} bytes (expected 16)")]
    InvalidIvLength { actual: usize },

    #[error("buffer length {actual} is not a multiple of the cipher block size")]
    UnalignedBlockLength { actual: usize },

    #[error("plaintext block too long: {actual} bytes (maximum {max})")]
    BlockTooLong { max: usize, actual: usize },

    #[error("signature generation failed")]
    SignatureFailed,

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,
}
