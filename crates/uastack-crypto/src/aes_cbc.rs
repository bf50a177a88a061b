//! AES-CBC encryption of secure-channel chunk regions.
//!
//! Chunk padding is written explicitly by the encoder before encryption, so
//! the cipher always operates on block-aligned input with `NoPadding` and
//! ciphertext length equals plaintext length. Key size (16 or 32 bytes) is
//! selected by the negotiated security policy; the IV comes from the derived
//! channel secrets and is **not** carried on the wire.

use aes::{Aes128, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::CryptoError;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes, for both key sizes.
pub const AES_BLOCK_SIZE: usize = 16;

#[derive(Clone)]
enum AesKey {
    Aes128([u8; 16]),
    Aes256([u8; 32]),
}

/// A single-use AES-CBC encryptor bound to a key and IV.
///
/// Construct one per chunk and consume it with
/// [`encrypt_in_place`](Self::encrypt_in_place) over the whole region from
/// the end of the security header to the end of the chunk.
pub struct AesCbcEncryptor {
    key: AesKey,
    iv: [u8; 16],
}

impl AesCbcEncryptor {
    /// Create an encryptor from a policy-sized key (16 or 32 bytes) and a
    /// 16-byte IV.
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let key = match key.len() {
            16 => AesKey::Aes128(key.try_into().expect("length checked")),
            32 => AesKey::Aes256(key.try_into().expect("length checked")),
            actual => return Err(CryptoError::InvalidKeyLength { actual }),
        };
        let iv: [u8; 16] = iv
            .try_into()
            .map_err(|_| CryptoError::InvalidIvLength { actual: iv.len() })?;
        Ok(Self { key, iv })
    }

    /// Encrypt `buf` in place. The buffer length must be a multiple of the
    /// AES block size.
    pub fn encrypt_in_place(self, buf: &mut [u8]) -> Result<(), CryptoError> {
        if !buf.len().is_multiple_of(AES_BLOCK_SIZE) {
            return Err(CryptoError::UnalignedBlockLength { actual: buf.len() });
        }
        let len = buf.len();
        let result = match &self.key {
            AesKey::Aes128(key) => Aes128CbcEnc::new(key.into(), (&self.iv).into())
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ()),
            AesKey::Aes256(key) => Aes256CbcEnc::new(key.into(), (&self.iv).into())
                .encrypt_padded_mut::<NoPadding>(buf, len)
                .map(|_| ()),
        };
        result.map_err(|_| CryptoError::EncryptionFailed)
    }
}

/// Decrypt an AES-CBC region in place.
///
/// The inverse of [`AesCbcEncryptor::encrypt_in_place`]; padding removal is
/// the caller's concern.
pub fn aes_cbc_decrypt(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CryptoError> {
    if !buf.len().is_multiple_of(AES_BLOCK_SIZE) {
        return Err(CryptoError::UnalignedBlockLength { actual: buf.len() });
    }
    let iv: [u8; 16] = iv
        .try_into()
        .map_err(|_| CryptoError::InvalidIvLength { actual: iv.len() })?;
    let result = match key.len() {
        16 => {
            let key: [u8; 16] = key.try_into().expect("length checked");
            Aes128CbcDec::new((&key).into(), (&iv).into())
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ())
        }
        32 => {
            let key: [u8; 32] = key.try_into().expect("length checked");
            Aes256CbcDec::new((&key).into(), (&iv).into())
                .decrypt_padded_mut::<NoPadding>(buf)
                .map(|_| ())
        }
        actual => return Err(CryptoError::InvalidKeyLength { actual }),
    };
    result.map_err(|_| CryptoError::DecryptionFailed)
}
