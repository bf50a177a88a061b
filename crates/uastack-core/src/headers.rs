//! On-wire header layouts for secure-channel chunks.
//!
//! All multi-byte integers are little-endian. Length-prefixed byte strings
//! in the asymmetric security header use a 4-byte signed length, with `-1`
//! denoting null.

use crate::constants::{
    ChunkFinality, MessageType, SECURE_MESSAGE_HEADER_SIZE, SEQUENCE_HEADER_SIZE,
    SYMMETRIC_SECURITY_HEADER_SIZE,
};

/// The 12-byte header that starts every chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureMessageHeader {
    pub message_type: MessageType,
    pub finality: ChunkFinality,
    /// Total chunk length in bytes, including this header.
    pub chunk_length: u32,
    pub channel_id: u32,
}

impl SecureMessageHeader {
    pub const SIZE: usize = SECURE_MESSAGE_HEADER_SIZE;

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.message_type.tag());
        out.push(self.finality.to_byte());
        out.extend_from_slice(&self.chunk_length.to_le_bytes());
        out.extend_from_slice(&self.channel_id.to_le_bytes());
    }
}

/// The security header of channel-open (asymmetric) chunks: policy URI,
/// sender certificate, and receiver certificate thumbprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricSecurityHeader {
    pub security_policy_uri: String,
    /// DER-encoded local certificate; absent when the policy needs none.
    pub sender_certificate: Option<Vec<u8>>,
    /// SHA-1 thumbprint of the receiver's certificate (20 bytes).
    pub receiver_certificate_thumbprint: Option<Vec<u8>>,
}

impl AsymmetricSecurityHeader {
    /// Encoded size: three 4-byte length fields plus the present bytes.
    /// Null fields contribute only their length field.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        12 + self.security_policy_uri.len()
            + self.sender_certificate.as_ref().map_or(0, Vec::len)
            + self
                .receiver_certificate_thumbprint
                .as_ref()
                .map_or(0, Vec::len)
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        write_byte_string(out, Some(self.security_policy_uri.as_bytes()));
        write_byte_string(out, self.sender_certificate.as_deref());
        write_byte_string(out, self.receiver_certificate_thumbprint.as_deref());
    }
}

/// The 4-byte security header of symmetric chunks: the active token id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricSecurityHeader {
    pub token_id: u32,
}

impl SymmetricSecurityHeader {
    pub const SIZE: usize = SYMMETRIC_SECURITY_HEADER_SIZE;

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.token_id.to_le_bytes());
    }
}

/// The 8-byte sequence header preceding the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceHeader {
    pub sequence_number: u32,
    pub request_id: u32,
}

impl SequenceHeader {
    pub const SIZE: usize = SEQUENCE_HEADER_SIZE;

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.sequence_number.to_le_bytes());
        out.extend_from_slice(&self.request_id.to_le_bytes());
    }
}

fn write_byte_string(out: &mut Vec<u8>, bytes: Option<&[u8]>) {
    match bytes {
        Some(bytes) => {
            out.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        None => out.extend_from_slice(&(-1i32).to_le_bytes()),
    }
}
