//! Error types for secure-channel encoding.

use uastack_crypto::CryptoError;

use crate::status::StatusCode;

/// Errors raised while encoding a message into secure-channel chunks.
///
/// None of these are recoverable within the failed `encode` call; the
/// mapping to a wire status code is given by [`status`](Self::status).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The channel and buffer parameters leave no room for message bytes.
    #[error(
        "invalid channel configuration: send buffer of {max_chunk_size} bytes \
         yields max body size {max_body_size}"
    )]
    InvalidConfiguration {
        max_chunk_size: usize,
        max_body_size: isize,
    },

    /// A computed chunk violated the block-alignment contract. Indicates a
    /// bug rather than bad input.
    #[error("chunk geometry violation: {reason}")]
    InvalidGeometry { reason: &'static str },

    /// A cryptographic primitive failed (cipher init, sign, or encrypt).
    #[error("security operation failed: {0}")]
    SecurityChecksFailed(#[from] CryptoError),

    /// Key material required by the active security mode is not present on
    /// the channel.
    #[error("missing key material: {what}")]
    MissingKeyMaterial { what: &'static str },

    /// The message would need more chunks than the channel allows.
    #[error("message requires {chunks} chunks (limit {max})")]
    PayloadTooLarge { chunks: usize, max: usize },

    /// The 32-bit request id space has been used up.
    #[error("request id space exhausted")]
    RequestIdExhausted,
}

impl EncodeError {
    /// The status code a channel reports when closing over this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            EncodeError::InvalidConfiguration { .. } => StatusCode::BAD_CONFIGURATION_ERROR,
            EncodeError::InvalidGeometry { .. } | EncodeError::RequestIdExhausted => {
                StatusCode::BAD_INTERNAL_ERROR
            }
            EncodeError::SecurityChecksFailed(_) | EncodeError::MissingKeyMaterial { .. } => {
                StatusCode::BAD_SECURITY_CHECKS_FAILED
            }
            EncodeError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST_TOO_LARGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_status_all_variants() {
        let variants: Vec<(EncodeError, StatusCode)> = vec![
            (
                EncodeError::InvalidConfiguration {
                    max_chunk_size: 64,
                    max_body_size: -8,
                },
                StatusCode::BAD_CONFIGURATION_ERROR,
            ),
            (
                EncodeError::InvalidGeometry {
                    reason: "plaintext not block-aligned",
                },
                StatusCode::BAD_INTERNAL_ERROR,
            ),
            (
                EncodeError::SecurityChecksFailed(CryptoError::EncryptionFailed),
                StatusCode::BAD_SECURITY_CHECKS_FAILED,
            ),
            (
                EncodeError::MissingKeyMaterial {
                    what: "local private key",
                },
                StatusCode::BAD_SECURITY_CHECKS_FAILED,
            ),
            (
                EncodeError::PayloadTooLarge { chunks: 9, max: 4 },
                StatusCode::BAD_REQUEST_TOO_LARGE,
            ),
            (
                EncodeError::RequestIdExhausted,
                StatusCode::BAD_INTERNAL_ERROR,
            ),
        ];
        for (error, status) in &variants {
            assert!(!error.to_string().is_empty());
            assert_eq!(error.status(), *status);
            assert!(status.is_bad());
        }
    }

    #[test]
    fn test_from_crypto_error() {
        let err: EncodeError = CryptoError::SignatureFailed.into();
        assert!(matches!(err, EncodeError::SecurityChecksFailed(_)));
    }
}
