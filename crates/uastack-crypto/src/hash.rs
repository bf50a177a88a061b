//! SHA-1 hashing for certificate thumbprints.
//!
//! OPC-UA identifies X.509 certificates on the wire by the SHA-1 digest of
//! their DER encoding, regardless of the negotiated security policy.

use sha1::{Digest, Sha1};

/// Compute the SHA-1 hash of the given data.
#[must_use]
pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the thumbprint of a DER-encoded certificate.
#[must_use]
pub fn certificate_thumbprint(der: &[u8]) -> [u8; 20] {
    sha1(der)
}
