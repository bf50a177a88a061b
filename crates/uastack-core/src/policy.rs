//! Security policies and message security modes.
//!
//! A security policy names the full set of algorithms a channel uses: the
//! HMAC flavor for symmetric chunk signatures, the AES key size for
//! symmetric encryption, and the RSA signature/encryption schemes applied
//! to channel-open chunks. The message security mode selects which of
//! signing and encryption are active once the channel is established.

use uastack_crypto::{HmacAlgorithm, RsaEncryptionAlgorithm, RsaSignatureAlgorithm};

const POLICY_URI_BASE: &str = "http://opcfoundation.org/UA/SecurityPolicy#";

/// The negotiated security policy of a secure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityPolicy {
    None,
    Basic128Rsa15,
    Basic256,
    Basic256Sha256,
}

impl SecurityPolicy {
    /// The policy URI exchanged in the asymmetric security header.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            SecurityPolicy::None => "http://opcfoundation.org/UA/SecurityPolicy#None",
            SecurityPolicy::Basic128Rsa15 => {
                "http://opcfoundation.org/UA/SecurityPolicy#Basic128Rsa15"
            }
            SecurityPolicy::Basic256 => "http://opcfoundation.org/UA/SecurityPolicy#Basic256",
            SecurityPolicy::Basic256Sha256 => {
                "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256"
            }
        }
    }

    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri.strip_prefix(POLICY_URI_BASE)? {
            "None" => Some(SecurityPolicy::None),
            "Basic128Rsa15" => Some(SecurityPolicy::Basic128Rsa15),
            "Basic256" => Some(SecurityPolicy::Basic256),
            "Basic256Sha256" => Some(SecurityPolicy::Basic256Sha256),
            _ => None,
        }
    }

    /// The HMAC flavor used for symmetric chunk signatures, if any.
    #[must_use]
    pub const fn symmetric_signature_algorithm(self) -> Option<HmacAlgorithm> {
        match self {
            SecurityPolicy::None => None,
            SecurityPolicy::Basic128Rsa15 | SecurityPolicy::Basic256 => Some(HmacAlgorithm::Sha1),
            SecurityPolicy::Basic256Sha256 => Some(HmacAlgorithm::Sha256),
        }
    }

    /// Length in bytes of a symmetric chunk signature.
    #[must_use]
    pub const fn symmetric_signature_size(self) -> usize {
        match self.symmetric_signature_algorithm() {
            Some(algorithm) => algorithm.output_size(),
            None => 0,
        }
    }

    /// AES key size in bytes for symmetric encryption.
    #[must_use]
    pub const fn symmetric_encryption_key_size(self) -> usize {
        match self {
            SecurityPolicy::None => 0,
            SecurityPolicy::Basic128Rsa15 => 16,
            SecurityPolicy::Basic256 | SecurityPolicy::Basic256Sha256 => 32,
        }
    }

    /// The RSA signature scheme applied to channel-open chunks, if any.
    #[must_use]
    pub const fn asymmetric_signature_algorithm(self) -> Option<RsaSignatureAlgorithm> {
        match self {
            SecurityPolicy::None => None,
            SecurityPolicy::Basic128Rsa15 | SecurityPolicy::Basic256 => {
                Some(RsaSignatureAlgorithm::RsaSha1)
            }
            SecurityPolicy::Basic256Sha256 => Some(RsaSignatureAlgorithm::RsaSha256),
        }
    }

    /// The RSA encryption scheme applied to channel-open chunks, if any.
    #[must_use]
    pub const fn asymmetric_encryption_algorithm(self) -> Option<RsaEncryptionAlgorithm> {
        match self {
            SecurityPolicy::None => None,
            SecurityPolicy::Basic128Rsa15 => Some(RsaEncryptionAlgorithm::Pkcs1V15),
            SecurityPolicy::Basic256 | SecurityPolicy::Basic256Sha256 => {
                Some(RsaEncryptionAlgorithm::OaepSha1)
            }
        }
    }
}

/// Which of signing and encryption a channel applies to symmetric chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSecurityMode {
    None,
    Sign,
    SignAndEncrypt,
}
