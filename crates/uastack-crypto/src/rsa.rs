//! RSA signing and block-wise encryption for channel-open security.
//!
//! Channel-open chunks are signed with the local private key and encrypted
//! block by block under the peer's public key; RSA has no streaming mode, so
//! each plaintext block is an independent `encrypt` call producing exactly
//! one modulus-sized ciphertext block. Scheme overheads fix the plaintext
//! block size: 11 bytes for PKCS#1 v1.5, 42 bytes for OAEP with SHA-1.

use ::rsa::traits::PublicKeyParts;
use ::rsa::{Oaep, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::CryptoError;

/// The signature algorithm a security policy uses for channel-open chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaSignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 over SHA-1.
    RsaSha1,
    /// RSASSA-PKCS1-v1_5 over SHA-256.
    RsaSha256,
}

/// The encryption scheme a security policy uses for channel-open chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaEncryptionAlgorithm {
    /// RSAES-PKCS1-v1_5.
    Pkcs1V15,
    /// RSAES-OAEP with SHA-1.
    OaepSha1,
}

impl RsaEncryptionAlgorithm {
    /// Bytes of each modulus-sized block consumed by scheme overhead.
    #[must_use]
    pub const fn overhead(self) -> usize {
        match self {
            RsaEncryptionAlgorithm::Pkcs1V15 => 11,
            RsaEncryptionAlgorithm::OaepSha1 => 42,
        }
    }
}

/// Sign `data` with the local private key.
pub fn rsa_sign(
    algorithm: RsaSignatureAlgorithm,
    key: &RsaPrivateKey,
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let result = match algorithm {
        RsaSignatureAlgorithm::RsaSha1 => {
            let digest = Sha1::digest(data);
            key.sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
        }
        RsaSignatureAlgorithm::RsaSha256 => {
            let digest = Sha256::digest(data);
            key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        }
    };
    result.map_err(|_| CryptoError::SignatureFailed)
}

/// Verify a signature over `data` against the signer's public key.
pub fn rsa_verify(
    algorithm: RsaSignatureAlgorithm,
    key: &RsaPublicKey,
    data: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let result = match algorithm {
        RsaSignatureAlgorithm::RsaSha1 => {
            let digest = Sha1::digest(data);
            key.verify(Pkcs1v15Sign::new::<Sha1>(), &digest, signature)
        }
        RsaSignatureAlgorithm::RsaSha256 => {
            let digest = Sha256::digest(data);
            key.verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        }
    };
    result.map_err(|_| CryptoError::InvalidSignature)
}

/// Signature length in bytes produced by the given signing key.
#[must_use]
pub fn rsa_signature_size(key: &RsaPrivateKey) -> usize {
    key.size()
}

/// Plaintext bytes consumed per encrypted block under `key` and `algorithm`.
#[must_use]
pub fn rsa_plain_text_block_size(algorithm: RsaEncryptionAlgorithm, key: &RsaPublicKey) -> usize {
    key.size() - algorithm.overhead()
}

/// Ciphertext bytes produced per encrypted block under `key`.
#[must_use]
pub fn rsa_cipher_text_block_size(key: &RsaPublicKey) -> usize {
    key.size()
}

/// A single-use block encryptor bound to the peer's public key.
pub struct RsaBlockEncryptor {
    algorithm: RsaEncryptionAlgorithm,
    key: RsaPublicKey,
}

impl RsaBlockEncryptor {
    pub fn new(algorithm: RsaEncryptionAlgorithm, key: RsaPublicKey) -> Self {
        Self { algorithm, key }
    }

    /// Plaintext bytes consumed per [`encrypt_block`](Self::encrypt_block) call.
    #[must_use]
    pub fn plain_text_block_size(&self) -> usize {
        rsa_plain_text_block_size(self.algorithm, &self.key)
    }

    /// Ciphertext bytes produced per [`encrypt_block`](Self::encrypt_block) call.
    #[must_use]
    pub fn cipher_text_block_size(&self) -> usize {
        rsa_cipher_text_block_size(&self.key)
    }

    /// Encrypt one plaintext block, producing exactly one ciphertext block.
    pub fn encrypt_block(&self, block: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let max = self.plain_text_block_size();
        if block.len() > max {
            return Err(CryptoError::BlockTooLong {
                max,
                actual: block.len(),
            });
        }
        let mut rng = rand::thread_rng();
        let result = match self.algorithm {
            RsaEncryptionAlgorithm::Pkcs1V15 => self.key.encrypt(&mut rng, Pkcs1v15Encrypt, block),
            RsaEncryptionAlgorithm::OaepSha1 => {
                self.key.encrypt(&mut rng, Oaep::new::<Sha1>(), block)
            }
        };
        result.map_err(|_| CryptoError::EncryptionFailed)
    }
}
