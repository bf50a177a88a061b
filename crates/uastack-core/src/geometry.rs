//! Chunk geometry: body, padding, and chunk size arithmetic.
//!
//! All computations are pure functions of the channel parameters as seen
//! through a security delegate. The governing relations:
//!
//! ```text
//! plain_text_content_size = SEQUENCE_HEADER_SIZE + body + signature + padding + overhead
//! chunk_size = headers + (plain_text_content_size / plain_block) * cipher_block
//! ```
//!
//! with `plain_text_content_size` always divisible by the plaintext block
//! size. When encryption is off both block sizes are 1, padding is absent,
//! and the relations degenerate to plain concatenation.

use crate::constants::{SECURE_MESSAGE_HEADER_SIZE, SEQUENCE_HEADER_SIZE};
use crate::error::EncodeError;

/// The security delegate's view of a channel, fixed for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGeometry {
    /// Maximum bytes per chunk on the wire (`local_send_buffer_size`).
    pub max_chunk_size: usize,
    pub security_header_size: usize,
    pub cipher_text_block_size: usize,
    pub plain_text_block_size: usize,
    pub signature_size: usize,
    pub encrypted: bool,
}

impl ChunkGeometry {
    /// Bytes spent encoding the padding length: one when ciphertext blocks
    /// fit a single length byte, two above that. Zero when not encrypting.
    #[must_use]
    pub fn padding_overhead(&self) -> usize {
        if !self.encrypted {
            0
        } else if self.cipher_text_block_size > 256 {
            2
        } else {
            1
        }
    }

    /// Combined size of the message header and security header.
    #[must_use]
    pub fn header_sizes(&self) -> usize {
        SECURE_MESSAGE_HEADER_SIZE + self.security_header_size
    }

    /// The largest message-body slice one chunk can carry.
    ///
    /// Fails with [`EncodeError::InvalidConfiguration`] when the send buffer
    /// cannot fit even one body byte next to the headers, signature, and
    /// padding overhead.
    pub fn max_body_size(&self) -> Result<usize, EncodeError> {
        if self.cipher_text_block_size == 0 || self.plain_text_block_size == 0 {
            return Err(EncodeError::InvalidConfiguration {
                max_chunk_size: self.max_chunk_size,
                max_body_size: 0,
            });
        }

        let available = self.max_chunk_size as isize
            - self.header_sizes() as isize
            - self.signature_size as isize
            - self.padding_overhead() as isize;
        let max_block_count = available.div_euclid(self.cipher_text_block_size as isize);
        let max_body_size =
            self.plain_text_block_size as isize * max_block_count - SEQUENCE_HEADER_SIZE as isize;

        if available < 0 || max_body_size < 1 {
            return Err(EncodeError::InvalidConfiguration {
                max_chunk_size: self.max_chunk_size,
                max_body_size,
            });
        }
        Ok(max_body_size as usize)
    }

    /// Padding bytes needed to align a chunk with `body_size` body bytes to
    /// the plaintext block size. Always 0 when not encrypting; when the
    /// content is already aligned a full block of padding is emitted.
    #[must_use]
    pub fn padding_size(&self, body_size: usize) -> usize {
        if !self.encrypted {
            return 0;
        }
        let unpadded =
            SEQUENCE_HEADER_SIZE + body_size + self.signature_size + self.padding_overhead();
        self.plain_text_block_size - unpadded % self.plain_text_block_size
    }

    /// Plaintext bytes covered by the cipher: sequence header, body,
    /// padding (with its length bytes), and signature.
    #[must_use]
    pub fn plain_text_content_size(&self, body_size: usize) -> usize {
        SEQUENCE_HEADER_SIZE
            + body_size
            + self.signature_size
            + self.padding_size(body_size)
            + self.padding_overhead()
    }

    /// Total on-wire chunk size for a chunk carrying `body_size` body bytes.
    ///
    /// Fails with [`EncodeError::InvalidGeometry`] if the plaintext content
    /// does not divide into whole blocks, which indicates a bug.
    pub fn chunk_size(&self, body_size: usize) -> Result<usize, EncodeError> {
        let content = self.plain_text_content_size(body_size);
        if !content.is_multiple_of(self.plain_text_block_size) {
            return Err(EncodeError::InvalidGeometry {
                reason: "plaintext content size is not divisible by the plaintext block size",
            });
        }
        Ok(self.header_sizes()
            + (content / self.plain_text_block_size) * self.cipher_text_block_size)
    }
}
