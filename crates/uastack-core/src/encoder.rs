//! The chunk encoder: fragmentation of outgoing secure-channel messages.
//!
//! One encoder exists per channel and owns its sequence-number and
//! request-id counters; callers must serialize `encode` invocations for a
//! channel and deliver the returned chunks to the transport in order.

use tracing::{debug, trace};

use crate::channel::{ChannelParameters, SecureChannel};
use crate::constants::{ChunkFinality, MessageType};
use crate::delegate::{AsymmetricDelegate, ChunkCipher, SecurityDelegate, SymmetricDelegate};
use crate::error::EncodeError;
use crate::geometry::ChunkGeometry;
use crate::headers::{SecureMessageHeader, SequenceHeader};
use crate::sequence::{RequestId, SequenceNumber};

/// Fragments outgoing messages into framed, signed, and optionally
/// encrypted chunks.
#[derive(Debug)]
pub struct ChunkEncoder {
    parameters: ChannelParameters,
    sequence_number: SequenceNumber,
    request_id: RequestId,
}

impl ChunkEncoder {
    #[must_use]
    pub fn new(parameters: ChannelParameters) -> Self {
        Self::with_sequence_number(parameters, SequenceNumber::new())
    }

    /// Create an encoder resuming at an explicit sequence position.
    #[must_use]
    pub fn with_sequence_number(
        parameters: ChannelParameters,
        sequence_number: SequenceNumber,
    ) -> Self {
        Self {
            parameters,
            sequence_number,
            request_id: RequestId::new(),
        }
    }

    /// Allocate the request id for the next outbound request.
    pub fn next_request_id(&self) -> Result<u32, EncodeError> {
        self.request_id.next()
    }

    /// Encode a message under channel-open (asymmetric) security.
    pub fn encode_asymmetric(
        &mut self,
        channel: &SecureChannel,
        message_type: MessageType,
        payload: &[u8],
        request_id: u32,
    ) -> Result<Vec<Vec<u8>>, EncodeError> {
        self.encode(
            &AsymmetricDelegate,
            channel,
            message_type,
            payload,
            request_id,
            false,
        )
    }

    /// Encode a message under steady-state (symmetric) security.
    pub fn encode_symmetric(
        &mut self,
        channel: &SecureChannel,
        message_type: MessageType,
        payload: &[u8],
        request_id: u32,
    ) -> Result<Vec<Vec<u8>>, EncodeError> {
        self.encode(
            &SymmetricDelegate,
            channel,
            message_type,
            payload,
            request_id,
            false,
        )
    }

    /// Encode a single abort chunk (`'A'` finality) carrying a status-code
    /// payload. The payload must fit one chunk.
    pub fn encode_symmetric_abort(
        &mut self,
        channel: &SecureChannel,
        payload: &[u8],
        request_id: u32,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut chunks = self.encode(
            &SymmetricDelegate,
            channel,
            MessageType::Message,
            payload,
            request_id,
            true,
        )?;
        chunks.pop().ok_or(EncodeError::InvalidGeometry {
            reason: "encoding produced no chunks",
        })
    }

    fn encode<D: SecurityDelegate>(
        &mut self,
        delegate: &D,
        channel: &SecureChannel,
        message_type: MessageType,
        payload: &[u8],
        request_id: u32,
        abort: bool,
    ) -> Result<Vec<Vec<u8>>, EncodeError> {
        let encrypted = delegate.is_encryption_enabled(channel);
        let signed = delegate.is_signing_enabled(channel);

        let geometry = ChunkGeometry {
            max_chunk_size: self.parameters.local_send_buffer_size,
            security_header_size: delegate.security_header_size(channel),
            cipher_text_block_size: delegate.cipher_text_block_size(channel),
            plain_text_block_size: delegate.plain_text_block_size(channel),
            signature_size: delegate.signature_size(channel),
            encrypted,
        };
        let max_body_size = geometry.max_body_size()?;

        let chunk_count = payload.len().div_ceil(max_body_size).max(1);
        let chunk_limit = if abort {
            1
        } else {
            self.parameters.local_max_chunk_count
        };
        if chunk_limit > 0 && chunk_count > chunk_limit {
            return Err(EncodeError::PayloadTooLarge {
                chunks: chunk_count,
                max: chunk_limit,
            });
        }

        debug!(
            channel_id = channel.channel_id,
            message_type = ?message_type,
            payload_len = payload.len(),
            chunk_count,
            encrypted,
            signed,
            "encoding message"
        );

        let mut chunks = Vec::with_capacity(chunk_count);
        let mut remaining = payload;
        loop {
            let body_size = remaining.len().min(max_body_size);
            let chunk_size = geometry.chunk_size(body_size)?;
            let finality = if abort {
                ChunkFinality::Abort
            } else if remaining.len() > body_size {
                ChunkFinality::Intermediate
            } else {
                ChunkFinality::Final
            };

            let mut chunk = Vec::with_capacity(chunk_size);

            SecureMessageHeader {
                message_type,
                finality,
                chunk_length: chunk_size as u32,
                channel_id: channel.channel_id,
            }
            .encode(&mut chunk);

            let keys = delegate.encode_security_header(channel, &mut chunk)?;

            let sequence_number = self.sequence_number.next();
            SequenceHeader {
                sequence_number,
                request_id,
            }
            .encode(&mut chunk);

            chunk.extend_from_slice(&remaining[..body_size]);
            remaining = &remaining[body_size..];

            if encrypted {
                write_padding(
                    geometry.cipher_text_block_size,
                    geometry.padding_size(body_size),
                    &mut chunk,
                );
            }

            if signed {
                let signature = delegate.sign_chunk(channel, &keys, &chunk)?;
                chunk.extend_from_slice(&signature);
            }

            if encrypted {
                let content_start = geometry.header_sizes();
                let plaintext = chunk[content_start..].to_vec();
                chunk.resize(chunk_size, 0);
                delegate
                    .init_cipher(channel, &keys)?
                    .encrypt(&plaintext, &mut chunk[content_start..])?;
            }

            if chunk.len() != chunk_size {
                return Err(EncodeError::InvalidGeometry {
                    reason: "assembled chunk length does not match the computed chunk size",
                });
            }

            trace!(
                sequence_number,
                chunk_size,
                body_size,
                finality = %(finality.to_byte() as char),
                "emitted chunk"
            );
            chunks.push(chunk);

            if remaining.is_empty() {
                break;
            }
        }

        Ok(chunks)
    }
}

/// Write the padding region: the low length byte, `padding_size` copies of
/// it, and for ciphers with blocks over 256 bytes the high length byte.
fn write_padding(cipher_text_block_size: usize, padding_size: usize, out: &mut Vec<u8>) {
    let low = (padding_size & 0xFF) as u8;
    out.push(low);
    out.extend(std::iter::repeat_n(low, padding_size));
    if cipher_text_block_size > 256 {
        out.push((padding_size >> 8) as u8);
    }
}
