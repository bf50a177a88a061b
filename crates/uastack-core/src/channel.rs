//! Secure-channel state as seen by the chunk encoder.
//!
//! A [`SecureChannel`] bundles the negotiated policy and mode, the local and
//! remote key material, and the current symmetric secrets. The size
//! accessors fold the enabled flags in: block sizes collapse to 1 and
//! signature sizes to 0 when the corresponding security feature is off, so
//! the chunk geometry arithmetic needs no special cases.

use core::fmt;

use uastack_crypto::{
    RsaPrivateKey, RsaPublicKey, certificate_thumbprint, rsa_cipher_text_block_size,
    rsa_plain_text_block_size, rsa_signature_size,
};

use crate::policy::{MessageSecurityMode, SecurityPolicy};

/// AES block size; symmetric chunk regions are aligned to this.
pub const SYMMETRIC_BLOCK_SIZE: usize = uastack_crypto::aes_cbc::AES_BLOCK_SIZE;

/// Transport parameters negotiated during the Hello/Acknowledge exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelParameters {
    /// Maximum bytes per chunk on the wire.
    pub local_send_buffer_size: usize,
    /// Maximum chunks per message; 0 means unlimited.
    pub local_max_chunk_count: usize,
}

impl ChannelParameters {
    #[must_use]
    pub fn new(local_send_buffer_size: usize) -> Self {
        Self {
            local_send_buffer_size,
            local_max_chunk_count: 0,
        }
    }
}

/// Keys derived for one send direction of a security token.
#[derive(Clone)]
pub struct SecuritySecrets {
    pub signature_key: Vec<u8>,
    pub encryption_key: Vec<u8>,
    pub initialization_vector: Vec<u8>,
}

impl fmt::Debug for SecuritySecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecuritySecrets")
            .field("signature_key_len", &self.signature_key.len())
            .field("encryption_key_len", &self.encryption_key.len())
            .field("iv_len", &self.initialization_vector.len())
            .finish()
    }
}

/// The active security token and its derived outbound keys.
#[derive(Debug, Clone)]
pub struct ChannelSecurity {
    pub token_id: u32,
    pub keys: SecuritySecrets,
}

/// State of one secure channel, owned by the caller of the encoder.
pub struct SecureChannel {
    pub channel_id: u32,
    pub security_policy: SecurityPolicy,
    pub security_mode: MessageSecurityMode,
    /// Local RSA keypair used to sign channel-open chunks.
    pub keypair: Option<RsaPrivateKey>,
    /// DER-encoded local certificate sent in the asymmetric header.
    pub local_certificate: Option<Vec<u8>>,
    /// DER-encoded remote certificate; thumbprinted into the asymmetric
    /// header, its public key encrypts channel-open chunks.
    pub remote_certificate: Option<Vec<u8>>,
    pub remote_public_key: Option<RsaPublicKey>,
    /// Symmetric token state; absent until key derivation completes.
    pub security: Option<ChannelSecurity>,
}

impl SecureChannel {
    #[must_use]
    pub fn new(channel_id: u32, policy: SecurityPolicy, mode: MessageSecurityMode) -> Self {
        Self {
            channel_id,
            security_policy: policy,
            security_mode: mode,
            keypair: None,
            local_certificate: None,
            remote_certificate: None,
            remote_public_key: None,
            security: None,
        }
    }

    /// SHA-1 thumbprint of the remote certificate, if one is present.
    #[must_use]
    pub fn remote_certificate_thumbprint(&self) -> Option<[u8; 20]> {
        self.remote_certificate
            .as_deref()
            .map(certificate_thumbprint)
    }

    // ------------------------------------------------------------------ //
    // Enabled flags
    // ------------------------------------------------------------------ //

    /// Channel-open chunks are signed whenever a real policy is negotiated.
    #[must_use]
    pub fn is_asymmetric_signing_enabled(&self) -> bool {
        self.security_policy != SecurityPolicy::None
    }

    /// Channel-open chunks are encrypted whenever a real policy is negotiated.
    #[must_use]
    pub fn is_asymmetric_encryption_enabled(&self) -> bool {
        self.security_policy != SecurityPolicy::None
    }

    #[must_use]
    pub fn is_symmetric_signing_enabled(&self) -> bool {
        self.security_policy != SecurityPolicy::None
            && self.security_mode != MessageSecurityMode::None
    }

    #[must_use]
    pub fn is_symmetric_encryption_enabled(&self) -> bool {
        self.security_policy != SecurityPolicy::None
            && self.security_mode == MessageSecurityMode::SignAndEncrypt
    }

    // ------------------------------------------------------------------ //
    // Derived sizes
    // ------------------------------------------------------------------ //

    /// Length of the signature appended to channel-open chunks.
    #[must_use]
    pub fn local_asymmetric_signature_size(&self) -> usize {
        if !self.is_asymmetric_signing_enabled() {
            return 0;
        }
        self.keypair.as_ref().map_or(0, rsa_signature_size)
    }

    /// Plaintext bytes per RSA block under the remote key, or 1 when
    /// asymmetric encryption is off.
    #[must_use]
    pub fn remote_asymmetric_plain_text_block_size(&self) -> usize {
        if !self.is_asymmetric_encryption_enabled() {
            return 1;
        }
        match (
            self.security_policy.asymmetric_encryption_algorithm(),
            self.remote_public_key.as_ref(),
        ) {
            (Some(algorithm), Some(key)) => rsa_plain_text_block_size(algorithm, key),
            _ => 1,
        }
    }

    /// Ciphertext bytes per RSA block under the remote key, or 1 when
    /// asymmetric encryption is off.
    #[must_use]
    pub fn remote_asymmetric_cipher_text_block_size(&self) -> usize {
        if !self.is_asymmetric_encryption_enabled() {
            return 1;
        }
        self.remote_public_key
            .as_ref()
            .map_or(1, rsa_cipher_text_block_size)
    }

    /// Length of the HMAC appended to symmetric chunks.
    #[must_use]
    pub fn symmetric_signature_size(&self) -> usize {
        if !self.is_symmetric_signing_enabled() {
            return 0;
        }
        self.security_policy.symmetric_signature_size()
    }

    /// AES block size, or 1 when symmetric encryption is off.
    #[must_use]
    pub fn symmetric_plain_text_block_size(&self) -> usize {
        if self.is_symmetric_encryption_enabled() {
            SYMMETRIC_BLOCK_SIZE
        } else {
            1
        }
    }

    /// AES-CBC does not expand, so this equals the plaintext block size.
    #[must_use]
    pub fn symmetric_cipher_text_block_size(&self) -> usize {
        self.symmetric_plain_text_block_size()
    }
}

impl fmt::Debug for SecureChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureChannel")
            .field("channel_id", &self.channel_id)
            .field("security_policy", &self.security_policy)
            .field("security_mode", &self.security_mode)
            .field("has_keypair", &self.keypair.is_some())
            .field("has_remote_public_key", &self.remote_public_key.is_some())
            .field("token_id", &self.security.as_ref().map(|s| s.token_id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secured_channel(mode: MessageSecurityMode) -> SecureChannel {
        SecureChannel::new(1, SecurityPolicy::Basic128Rsa15, mode)
    }

    #[test]
    fn test_none_policy_disables_everything() {
        let channel = SecureChannel::new(
            1,
            SecurityPolicy::None,
            MessageSecurityMode::SignAndEncrypt,
        );
        assert!(!channel.is_asymmetric_signing_enabled());
        assert!(!channel.is_asymmetric_encryption_enabled());
        assert!(!channel.is_symmetric_signing_enabled());
        assert!(!channel.is_symmetric_encryption_enabled());
        assert_eq!(channel.local_asymmetric_signature_size(), 0);
        assert_eq!(channel.symmetric_signature_size(), 0);
        assert_eq!(channel.symmetric_plain_text_block_size(), 1);
        assert_eq!(channel.remote_asymmetric_cipher_text_block_size(), 1);
    }

    #[test]
    fn test_sign_mode_signs_without_encrypting() {
        let channel = secured_channel(MessageSecurityMode::Sign);
        assert!(channel.is_symmetric_signing_enabled());
        assert!(!channel.is_symmetric_encryption_enabled());
        assert_eq!(channel.symmetric_signature_size(), 20);
        assert_eq!(channel.symmetric_plain_text_block_size(), 1);
        assert_eq!(channel.symmetric_cipher_text_block_size(), 1);
    }

    #[test]
    fn test_sign_and_encrypt_mode_block_sizes() {
        let channel = secured_channel(MessageSecurityMode::SignAndEncrypt);
        assert!(channel.is_symmetric_encryption_enabled());
        assert_eq!(channel.symmetric_plain_text_block_size(), 16);
        assert_eq!(channel.symmetric_cipher_text_block_size(), 16);
    }

    #[test]
    fn test_thumbprint_of_remote_certificate() {
        let mut channel = secured_channel(MessageSecurityMode::Sign);
        assert_eq!(channel.remote_certificate_thumbprint(), None);

        let der = vec![0x30, 0x82, 0x01, 0x0a];
        channel.remote_certificate = Some(der.clone());
        assert_eq!(
            channel.remote_certificate_thumbprint(),
            Some(certificate_thumbprint(&der))
        );
    }

    #[test]
    fn test_secrets_debug_does_not_leak() {
        let secrets = SecuritySecrets {
            signature_key: vec![0xAA; 20],
            encryption_key: vec![0xBB; 16],
            initialization_vector: vec![0xCC; 16],
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("aa"));
        assert!(!rendered.contains("AA"));
        assert!(rendered.contains("signature_key_len"));
    }
}
