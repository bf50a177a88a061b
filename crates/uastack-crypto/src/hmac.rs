//! HMAC message authentication for symmetric chunk signing.
//!
//! Security policies select either HMAC-SHA1 or HMAC-SHA256; the derived
//! signature key is applied over the plaintext chunk up to the signature
//! field. Verification is constant-time via the underlying `hmac` crate.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

use crate::CryptoError;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// The keyed-hash algorithm a security policy uses for symmetric signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    Sha1,
    Sha256,
}

impl HmacAlgorithm {
    /// Length of the MAC output in bytes.
    #[must_use]
    pub const fn output_size(self) -> usize {
        match self {
            HmacAlgorithm::Sha1 => 20,
            HmacAlgorithm::Sha256 => 32,
        }
    }
}

/// Compute the HMAC-SHA1 of `data` using the given `key`.
pub fn hmac_sha1(key: &[u8], data: &[u8]) -> [u8; 20] {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC-SHA1 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Compute the HMAC-SHA256 of `data` using the given `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Compute the MAC of `data` under `key` with the given algorithm.
#[must_use]
pub fn hmac(algorithm: HmacAlgorithm, key: &[u8], data: &[u8]) -> Vec<u8> {
    match algorithm {
        HmacAlgorithm::Sha1 => hmac_sha1(key, data).to_vec(),
        HmacAlgorithm::Sha256 => hmac_sha256(key, data).to_vec(),
    }
}

/// Verify that the MAC of `data` under `key` matches `expected`.
///
/// Returns `Err(CryptoError::InvalidSignature)` on mismatch. The comparison
/// is performed in constant time.
pub fn hmac_verify(
    algorithm: HmacAlgorithm,
    key: &[u8],
    data: &[u8],
    expected: &[u8],
) -> Result<(), CryptoError> {
    let result = match algorithm {
        HmacAlgorithm::Sha1 => {
            let mut mac =
                HmacSha1::new_from_slice(key).expect("HMAC-SHA1 accepts keys of any length");
            mac.update(data);
            mac.verify_slice(expected)
        }
        HmacAlgorithm::Sha256 => {
            let mut mac =
                HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
            mac.update(data);
            mac.verify_slice(expected)
        }
    };
    result.map_err(|_| CryptoError::InvalidSignature)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn hmac_verify_roundtrip(
            key in proptest::collection::vec(any::<u8>(), 1..64),
            data in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            for algorithm in [HmacAlgorithm::Sha1, HmacAlgorithm::Sha256] {
                let mac = hmac(algorithm, &key, &data);
                prop_assert_eq!(mac.len(), algorithm.output_size());
                prop_assert!(hmac_verify(algorithm, &key, &data, &mac).is_ok());
            }
        }
    }
}
