//! Endpoint demultiplexing and connection acceptance for uastack servers.
//!
//! An [`EndpointRegistry`] maps endpoint-URL paths to logical server
//! instances; a [`SocketAcceptor`] listens for TCP connections, drives the
//! opening Hello exchange through a collaborator, and hands matched
//! connections to the owning server.

pub mod acceptor;
pub mod error;
pub mod registry;
pub mod shutdown;

pub use acceptor::{AcceptorConfig, ChannelHost, HelloExchange, SocketAcceptor};
pub use error::ServerError;
pub use registry::{EndpointRegistry, EndpointServer, path_or_url};
pub use shutdown::ShutdownSignal;
