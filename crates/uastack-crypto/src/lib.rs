//! Cryptographic primitives for the OPC-UA secure-channel stack.
//!
//! This crate provides the security-policy primitives used when building
//! secure-channel chunks: SHA-1 certificate thumbprints, HMAC signatures,
//! AES-CBC encryption of padded chunk regions, and RSA signing and
//! block-wise encryption for channel-open messages.

pub mod aes_cbc;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod rsa;

pub use crate::aes_cbc::{AesCbcEncryptor, aes_cbc_decrypt};
pub use crate::error::CryptoError;
pub use crate::hash::{certificate_thumbprint, sha1};
pub use crate::hmac::{HmacAlgorithm, hmac, hmac_sha1, hmac_sha256, hmac_verify};
pub use crate::rsa::{
    RsaBlockEncryptor, RsaEncryptionAlgorithm, RsaSignatureAlgorithm, rsa_cipher_text_block_size,
    rsa_plain_text_block_size, rsa_sign, rsa_signature_size, rsa_verify,
};

pub use ::rsa::{RsaPrivateKey, RsaPublicKey};
