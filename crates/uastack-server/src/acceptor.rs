//! TCP socket acceptor: listens for connections and routes them to the
//! server registered for the endpoint URL named in the opening Hello.
//!
//! Hello/Acknowledge framing is owned by an injected [`HelloExchange`]
//! collaborator; the acceptor only drives it, consults the registry, and
//! either hands the connection to the matched [`ChannelHost`] or rejects it
//! with `Bad_TcpEndpointUrlInvalid`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use uastack_core::StatusCode;

use crate::error::ServerError;
use crate::registry::{EndpointRegistry, EndpointServer};
use crate::shutdown::ShutdownSignal;

/// Drives the opening Hello exchange on a fresh connection.
pub trait HelloExchange: Send + Sync + 'static {
    /// Read the Hello frame and return the endpoint URL the peer requested.
    fn read_endpoint_url(
        &self,
        stream: &mut TcpStream,
    ) -> impl Future<Output = std::io::Result<String>> + Send;

    /// Report `status` to the peer before the connection is dropped.
    fn reject(&self, stream: TcpStream, status: StatusCode) -> impl Future<Output = ()> + Send;
}

/// A server instance that can take ownership of matched connections.
pub trait ChannelHost: EndpointServer + Send + Sync + 'static {
    /// Take the connection over for secure-channel open.
    fn open_connection(
        &self,
        stream: TcpStream,
        endpoint_url: String,
    ) -> impl Future<Output = ()> + Send;
}

/// Configuration for a [`SocketAcceptor`].
#[derive(Debug, Clone)]
pub struct AcceptorConfig {
    /// Human-readable name used in log output.
    pub name: String,
    /// Address to bind the TCP listener to.
    pub bind_addr: SocketAddr,
}

impl AcceptorConfig {
    pub fn new(name: impl Into<String>, bind_addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            bind_addr,
        }
    }
}

/// Accepts TCP connections and demultiplexes them onto registered servers.
pub struct SocketAcceptor<S, H> {
    config: AcceptorConfig,
    registry: Arc<EndpointRegistry<S>>,
    hello: Arc<H>,
    /// Bound local address (available after `bind()`).
    local_addr: Mutex<Option<SocketAddr>>,
    shutdown: ShutdownSignal,
}

impl<S, H> SocketAcceptor<S, H>
where
    S: ChannelHost,
    H: HelloExchange,
{
    pub fn new(config: AcceptorConfig, registry: Arc<EndpointRegistry<S>>, hello: Arc<H>) -> Self {
        Self {
            config,
            registry,
            hello,
            local_addr: Mutex::new(None),
            shutdown: ShutdownSignal::new(),
        }
    }

    /// The registry this acceptor routes through.
    pub fn registry(&self) -> &Arc<EndpointRegistry<S>> {
        &self.registry
    }

    /// The local address the listener is bound to. Available after `bind()`.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }

    pub fn is_listening(&self) -> bool {
        self.shutdown.is_online()
    }

    /// Bind the listener and start the accept loop.
    pub async fn bind(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let addr = listener.local_addr()?;
        info!("{}: listening on {}", self.config.name, addr);
        *self.local_addr.lock().await = Some(addr);
        self.shutdown.set_online();

        let registry = Arc::clone(&self.registry);
        let hello = Arc::clone(&self.hello);
        let stop_rx = self.shutdown.subscribe();
        let name = self.config.name.clone();

        let handle = tokio::spawn(async move {
            Self::accept_loop(listener, registry, hello, stop_rx, name).await;
        });
        self.shutdown.set_task(handle).await;

        Ok(())
    }

    /// Stop accepting and wait for the accept loop to finish. Connections
    /// already handed to servers are unaffected.
    pub async fn shutdown(&self) {
        self.shutdown.stop();
        self.shutdown.join().await;
    }

    async fn accept_loop(
        listener: TcpListener,
        registry: Arc<EndpointRegistry<S>>,
        hello: Arc<H>,
        mut stop_rx: tokio::sync::watch::Receiver<bool>,
        name: String,
    ) {
        loop {
            let (stream, peer_addr) = tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("{name}: accept error: {e}");
                            continue;
                        }
                    }
                }
                _ = stop_rx.changed() => {
                    debug!("{name}: accept loop stopping");
                    break;
                }
            };

            debug!("{name}: accepted connection from {peer_addr}");

            let registry = Arc::clone(&registry);
            let hello = Arc::clone(&hello);
            let name = name.clone();
            tokio::spawn(async move {
                Self::handle_connection(registry, hello, stream, peer_addr, name).await;
            });
        }
    }

    async fn handle_connection(
        registry: Arc<EndpointRegistry<S>>,
        hello: Arc<H>,
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        name: String,
    ) {
        let endpoint_url = match hello.read_endpoint_url(&mut stream).await {
            Ok(url) => url,
            Err(e) => {
                warn!("{name}: failed to read hello from {peer_addr}: {e}");
                return;
            }
        };

        match registry.lookup(&endpoint_url) {
            Some(server) => {
                debug!("{name}: routing {peer_addr} to server for \"{endpoint_url}\"");
                server.open_connection(stream, endpoint_url).await;
            }
            None => {
                let error = ServerError::EndpointUrlInvalid(endpoint_url);
                warn!("{name}: rejecting {peer_addr}: {error}");
                hello.reject(stream, error.status()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

    /// Test Hello exchange: the endpoint URL is a single newline-terminated
    /// line; rejections are reported as "ERR <status>\n".
    struct LineHello;

    impl HelloExchange for LineHello {
        async fn read_endpoint_url(&self, stream: &mut TcpStream) -> std::io::Result<String> {
            let mut line = String::new();
            BufReader::new(stream).read_line(&mut line).await?;
            Ok(line.trim_end().to_string())
        }

        async fn reject(&self, mut stream: TcpStream, status: StatusCode) {
            let _ = stream.write_all(format!("ERR {status}\n").as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    }

    struct RecordingHost {
        endpoints: Vec<String>,
        opened: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        fn new(endpoints: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
                opened: Mutex::new(Vec::new()),
            })
        }
    }

    impl EndpointServer for RecordingHost {
        fn endpoint_urls(&self) -> Vec<String> {
            self.endpoints.clone()
        }

        fn discovery_urls(&self) -> Vec<String> {
            Vec::new()
        }
    }

    impl ChannelHost for RecordingHost {
        async fn open_connection(&self, mut stream: TcpStream, endpoint_url: String) {
            self.opened.lock().await.push(endpoint_url);
            let _ = stream.write_all(b"OK\n").await;
            let _ = stream.shutdown().await;
        }
    }

    async fn acceptor_with_host(
        host: &Arc<RecordingHost>,
    ) -> SocketAcceptor<RecordingHost, LineHello> {
        let registry = Arc::new(EndpointRegistry::new());
        registry.register(host);
        let acceptor = SocketAcceptor::new(
            AcceptorConfig::new("test-acceptor", "127.0.0.1:0".parse().unwrap()),
            registry,
            Arc::new(LineHello),
        );
        acceptor.bind().await.unwrap();
        acceptor
    }

    #[tokio::test]
    async fn matched_connection_is_handed_to_server() {
        let host = RecordingHost::new(&["opc.tcp://localhost:4840/a"]);
        let acceptor = acceptor_with_host(&host).await;
        let addr = acceptor.local_addr().await.unwrap();
        assert!(acceptor.is_listening());

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"opc.tcp://anything:4840/a\n")
            .await
            .unwrap();

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert_eq!(response, "OK\n");

        for _ in 0..50 {
            if !host.opened.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(
            host.opened.lock().await.as_slice(),
            &["opc.tcp://anything:4840/a".to_string()]
        );

        acceptor.shutdown().await;
        assert!(!acceptor.is_listening());
    }

    #[tokio::test]
    async fn unknown_endpoint_url_is_rejected() {
        let host = RecordingHost::new(&["opc.tcp://localhost:4840/a"]);
        let acceptor = acceptor_with_host(&host).await;
        let addr = acceptor.local_addr().await.unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"opc.tcp://anything:4840/nope\n")
            .await
            .unwrap();

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert_eq!(response, "ERR 0x80830000\n");
        assert!(host.opened.lock().await.is_empty());

        acceptor.shutdown().await;
    }

    #[tokio::test]
    async fn relaxed_mode_routes_unknown_paths_to_single_server() {
        let host = RecordingHost::new(&["opc.tcp://localhost:4840/a"]);
        let acceptor = acceptor_with_host(&host).await;
        acceptor.registry().set_strict_endpoint_urls(false);
        let addr = acceptor.local_addr().await.unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        client
            .write_all(b"opc.tcp://anything:4840/other\n")
            .await
            .unwrap();

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert_eq!(response, "OK\n");

        acceptor.shutdown().await;
    }
}
