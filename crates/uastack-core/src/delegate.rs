//! Security delegates: the parts of chunk construction that differ between
//! channel-open (asymmetric) and steady-state (symmetric) security.
//!
//! The encoder is generic over the delegate, so the two variants are
//! monomorphized rather than dispatched dynamically. A delegate's
//! `encode_security_header` returns the key snapshot for that chunk; the
//! encoder threads the same snapshot through `sign_chunk` and `init_cipher`,
//! so a token rollover between chunks can never split key material within
//! one chunk.

use uastack_crypto::{
    AesCbcEncryptor, RsaBlockEncryptor, hmac, rsa_sign,
};

use crate::channel::{SecureChannel, SecuritySecrets};
use crate::constants::SYMMETRIC_SECURITY_HEADER_SIZE;
use crate::error::EncodeError;
use crate::headers::{AsymmetricSecurityHeader, SymmetricSecurityHeader};

/// A single-use cipher covering one chunk's plaintext content region.
pub trait ChunkCipher {
    /// Encrypt `plaintext` into `ciphertext`. The plaintext length must be
    /// a whole number of plaintext blocks and the ciphertext buffer must
    /// hold exactly the corresponding ciphertext blocks.
    fn encrypt(self, plaintext: &[u8], ciphertext: &mut [u8]) -> Result<(), EncodeError>;
}

/// The security-mode-specific capabilities the encoder queries per chunk.
pub trait SecurityDelegate {
    /// Key material snapshotted at security-header encode time.
    type Keys;
    type Cipher: ChunkCipher;

    fn security_header_size(&self, channel: &SecureChannel) -> usize;
    fn cipher_text_block_size(&self, channel: &SecureChannel) -> usize;
    fn plain_text_block_size(&self, channel: &SecureChannel) -> usize;
    fn signature_size(&self, channel: &SecureChannel) -> usize;
    fn is_encryption_enabled(&self, channel: &SecureChannel) -> bool;
    fn is_signing_enabled(&self, channel: &SecureChannel) -> bool;

    /// Write the security header and return the key snapshot this chunk
    /// will sign and encrypt with.
    fn encode_security_header(
        &self,
        channel: &SecureChannel,
        out: &mut Vec<u8>,
    ) -> Result<Self::Keys, EncodeError>;

    /// Sign the chunk bytes written so far (from the start of the chunk).
    fn sign_chunk(
        &self,
        channel: &SecureChannel,
        keys: &Self::Keys,
        data: &[u8],
    ) -> Result<Vec<u8>, EncodeError>;

    /// Build the single-use cipher for this chunk's content region.
    fn init_cipher(
        &self,
        channel: &SecureChannel,
        keys: &Self::Keys,
    ) -> Result<Self::Cipher, EncodeError>;
}

// ---------------------------------------------------------------------- //
// Asymmetric (channel-open)
// ---------------------------------------------------------------------- //

/// Delegate for channel-open chunks: RSA signatures under the local private
/// key, block-wise RSA encryption under the remote public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsymmetricDelegate;

fn asymmetric_security_header(channel: &SecureChannel) -> AsymmetricSecurityHeader {
    AsymmetricSecurityHeader {
        security_policy_uri: channel.security_policy.uri().to_string(),
        sender_certificate: channel.local_certificate.clone(),
        receiver_certificate_thumbprint: channel
            .remote_certificate_thumbprint()
            .map(|thumbprint| thumbprint.to_vec()),
    }
}

impl SecurityDelegate for AsymmetricDelegate {
    type Keys = ();
    type Cipher = RsaChunkCipher;

    fn security_header_size(&self, channel: &SecureChannel) -> usize {
        asymmetric_security_header(channel).encoded_size()
    }

    fn cipher_text_block_size(&self, channel: &SecureChannel) -> usize {
        channel.remote_asymmetric_cipher_text_block_size()
    }

    fn plain_text_block_size(&self, channel: &SecureChannel) -> usize {
        channel.remote_asymmetric_plain_text_block_size()
    }

    fn signature_size(&self, channel: &SecureChannel) -> usize {
        channel.local_asymmetric_signature_size()
    }

    fn is_encryption_enabled(&self, channel: &SecureChannel) -> bool {
        channel.is_asymmetric_encryption_enabled()
    }

    fn is_signing_enabled(&self, channel: &SecureChannel) -> bool {
        channel.is_asymmetric_signing_enabled()
    }

    fn encode_security_header(
        &self,
        channel: &SecureChannel,
        out: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        asymmetric_security_header(channel).encode(out);
        Ok(())
    }

    fn sign_chunk(
        &self,
        channel: &SecureChannel,
        _keys: &(),
        data: &[u8],
    ) -> Result<Vec<u8>, EncodeError> {
        let algorithm = channel
            .security_policy
            .asymmetric_signature_algorithm()
            .ok_or(EncodeError::MissingKeyMaterial {
                what: "asymmetric signature algorithm",
            })?;
        let keypair = channel
            .keypair
            .as_ref()
            .ok_or(EncodeError::MissingKeyMaterial {
                what: "local private key",
            })?;
        Ok(rsa_sign(algorithm, keypair, data)?)
    }

    fn init_cipher(
        &self,
        channel: &SecureChannel,
        _keys: &(),
    ) -> Result<RsaChunkCipher, EncodeError> {
        let algorithm = channel
            .security_policy
            .asymmetric_encryption_algorithm()
            .ok_or(EncodeError::MissingKeyMaterial {
                what: "asymmetric encryption algorithm",
            })?;
        let key = channel
            .remote_public_key
            .clone()
            .ok_or(EncodeError::MissingKeyMaterial {
                what: "remote public key",
            })?;
        Ok(RsaChunkCipher {
            inner: RsaBlockEncryptor::new(algorithm, key),
        })
    }
}

/// RSA content cipher: every plaintext block is an independent encryption
/// producing exactly one modulus-sized ciphertext block.
pub struct RsaChunkCipher {
    inner: RsaBlockEncryptor,
}

impl ChunkCipher for RsaChunkCipher {
    fn encrypt(self, plaintext: &[u8], ciphertext: &mut [u8]) -> Result<(), EncodeError> {
        let plain_block = self.inner.plain_text_block_size();
        let cipher_block = self.inner.cipher_text_block_size();

        if !plaintext.len().is_multiple_of(plain_block) {
            return Err(EncodeError::InvalidGeometry {
                reason: "plaintext region is not a whole number of RSA blocks",
            });
        }
        let block_count = plaintext.len() / plain_block;
        if ciphertext.len() != block_count * cipher_block {
            return Err(EncodeError::InvalidGeometry {
                reason: "ciphertext region does not match the RSA block count",
            });
        }

        for (index, block) in plaintext.chunks(plain_block).enumerate() {
            let encrypted = self.inner.encrypt_block(block)?;
            if encrypted.len() != cipher_block {
                return Err(EncodeError::InvalidGeometry {
                    reason: "RSA ciphertext block has unexpected length",
                });
            }
            ciphertext[index * cipher_block..(index + 1) * cipher_block]
                .copy_from_slice(&encrypted);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------- //
// Symmetric (steady-state)
// ---------------------------------------------------------------------- //

/// Delegate for steady-state chunks: HMAC signatures and AES-CBC encryption
/// under the current token's derived keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricDelegate;

impl SecurityDelegate for SymmetricDelegate {
    type Keys = Option<SecuritySecrets>;
    type Cipher = AesChunkCipher;

    fn security_header_size(&self, _channel: &SecureChannel) -> usize {
        SYMMETRIC_SECURITY_HEADER_SIZE
    }

    fn cipher_text_block_size(&self, channel: &SecureChannel) -> usize {
        channel.symmetric_cipher_text_block_size()
    }

    fn plain_text_block_size(&self, channel: &SecureChannel) -> usize {
        channel.symmetric_plain_text_block_size()
    }

    fn signature_size(&self, channel: &SecureChannel) -> usize {
        channel.symmetric_signature_size()
    }

    fn is_encryption_enabled(&self, channel: &SecureChannel) -> bool {
        channel.is_symmetric_encryption_enabled()
    }

    fn is_signing_enabled(&self, channel: &SecureChannel) -> bool {
        channel.is_symmetric_signing_enabled()
    }

    fn encode_security_header(
        &self,
        channel: &SecureChannel,
        out: &mut Vec<u8>,
    ) -> Result<Option<SecuritySecrets>, EncodeError> {
        let (token_id, keys) = match channel.security.as_ref() {
            Some(security) => (security.token_id, Some(security.keys.clone())),
            None => (0, None),
        };
        SymmetricSecurityHeader { token_id }.encode(out);
        Ok(keys)
    }

    fn sign_chunk(
        &self,
        channel: &SecureChannel,
        keys: &Option<SecuritySecrets>,
        data: &[u8],
    ) -> Result<Vec<u8>, EncodeError> {
        let algorithm = channel
            .security_policy
            .symmetric_signature_algorithm()
            .ok_or(EncodeError::MissingKeyMaterial {
                what: "symmetric signature algorithm",
            })?;
        let keys = keys.as_ref().ok_or(EncodeError::MissingKeyMaterial {
            what: "derived signature key",
        })?;
        Ok(hmac(algorithm, &keys.signature_key, data))
    }

    fn init_cipher(
        &self,
        _channel: &SecureChannel,
        keys: &Option<SecuritySecrets>,
    ) -> Result<AesChunkCipher, EncodeError> {
        let keys = keys.as_ref().ok_or(EncodeError::MissingKeyMaterial {
            what: "derived encryption key",
        })?;
        let inner = AesCbcEncryptor::new(&keys.encryption_key, &keys.initialization_vector)?;
        Ok(AesChunkCipher { inner })
    }
}

/// AES-CBC content cipher: the whole region is encrypted in one pass with
/// no length expansion.
pub struct AesChunkCipher {
    inner: AesCbcEncryptor,
}

impl ChunkCipher for AesChunkCipher {
    fn encrypt(self, plaintext: &[u8], ciphertext: &mut [u8]) -> Result<(), EncodeError> {
        if ciphertext.len() != plaintext.len() {
            return Err(EncodeError::InvalidGeometry {
                reason: "AES ciphertext region must equal the plaintext length",
            });
        }
        ciphertext.copy_from_slice(plaintext);
        self.inner.encrypt_in_place(ciphertext)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelSecurity;
    use crate::policy::{MessageSecurityMode, SecurityPolicy};

    fn symmetric_channel() -> SecureChannel {
        let mut channel = SecureChannel::new(
            5,
            SecurityPolicy::Basic128Rsa15,
            MessageSecurityMode::SignAndEncrypt,
        );
        channel.security = Some(ChannelSecurity {
            token_id: 99,
            keys: SecuritySecrets {
                signature_key: vec![0x11; 16],
                encryption_key: vec![0x22; 16],
                initialization_vector: vec![0x33; 16],
            },
        });
        channel
    }

    #[test]
    fn test_symmetric_header_carries_token_id() {
        let channel = symmetric_channel();
        let mut out = Vec::new();
        let keys = SymmetricDelegate
            .encode_security_header(&channel, &mut out)
            .unwrap();
        assert_eq!(out, 99u32.to_le_bytes());
        assert!(keys.is_some());
    }

    #[test]
    fn test_symmetric_header_token_zero_without_security() {
        let channel = SecureChannel::new(
            5,
            SecurityPolicy::Basic128Rsa15,
            MessageSecurityMode::SignAndEncrypt,
        );
        let mut out = Vec::new();
        let keys = SymmetricDelegate
            .encode_security_header(&channel, &mut out)
            .unwrap();
        assert_eq!(out, 0u32.to_le_bytes());
        assert!(keys.is_none());
    }

    #[test]
    fn test_symmetric_sign_without_keys_fails() {
        let channel = symmetric_channel();
        let result = SymmetricDelegate.sign_chunk(&channel, &None, b"data");
        assert!(matches!(
            result,
            Err(EncodeError::MissingKeyMaterial { .. })
        ));
    }

    #[test]
    fn test_symmetric_snapshot_survives_token_rollover() {
        let mut channel = symmetric_channel();
        let mut out = Vec::new();
        let keys = SymmetricDelegate
            .encode_security_header(&channel, &mut out)
            .unwrap();

        // Rotate the channel's keys after the header snapshot.
        channel.security.as_mut().unwrap().keys.signature_key = vec![0x77; 16];

        let signature = SymmetricDelegate
            .sign_chunk(&channel, &keys, b"chunk")
            .unwrap();
        let expected = uastack_crypto::hmac_sha1(&[0x11; 16], b"chunk");
        assert_eq!(signature, expected);
    }

    #[test]
    fn test_asymmetric_header_size_matches_encoding() {
        let mut channel = SecureChannel::new(
            7,
            SecurityPolicy::Basic256,
            MessageSecurityMode::SignAndEncrypt,
        );
        channel.local_certificate = Some(vec![0xC1; 321]);
        channel.remote_certificate = Some(vec![0xC2; 400]);

        let mut out = Vec::new();
        AsymmetricDelegate
            .encode_security_header(&channel, &mut out)
            .unwrap();
        assert_eq!(out.len(), AsymmetricDelegate.security_header_size(&channel));
        assert_eq!(
            out.len(),
            12 + SecurityPolicy::Basic256.uri().len() + 321 + 20
        );
    }

    #[test]
    fn test_asymmetric_sign_without_keypair_fails() {
        let channel = SecureChannel::new(
            7,
            SecurityPolicy::Basic256,
            MessageSecurityMode::SignAndEncrypt,
        );
        let result = AsymmetricDelegate.sign_chunk(&channel, &(), b"data");
        assert!(matches!(
            result,
            Err(EncodeError::MissingKeyMaterial {
                what: "local private key"
            })
        ));
    }
}
