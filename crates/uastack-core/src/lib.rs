//! Secure-channel core for the uastack OPC-UA TCP stack.
//!
//! This crate defines the secure-channel wire headers, security policies,
//! chunk geometry, and the chunk encoder that fragments outgoing messages
//! into framed, signed, and optionally encrypted chunks.

pub mod channel;
pub mod constants;
pub mod delegate;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod headers;
pub mod policy;
pub mod sequence;
pub mod status;

pub use channel::{ChannelParameters, ChannelSecurity, SecureChannel, SecuritySecrets};
pub use constants::{ChunkFinality, MessageType};
pub use delegate::{AsymmetricDelegate, ChunkCipher, SecurityDelegate, SymmetricDelegate};
pub use encoder::ChunkEncoder;
pub use error::EncodeError;
pub use geometry::ChunkGeometry;
pub use headers::{
    AsymmetricSecurityHeader, SecureMessageHeader, SequenceHeader, SymmetricSecurityHeader,
};
pub use policy::{MessageSecurityMode, SecurityPolicy};
pub use sequence::{RequestId, SequenceNumber};
pub use status::StatusCode;
