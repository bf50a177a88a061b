//! Endpoint registry: routing endpoint URLs to logical server instances.
//!
//! Servers register under the path component of each of their endpoint and
//! discovery URLs. Registration is first-writer-wins per path, and an entry
//! is only ever removed by the server it belongs to. Lookup can optionally
//! relax to "the only registered server" when strict endpoint URLs are
//! disabled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};
use url::Url;

/// A logical server instance that can be bound to endpoint paths.
pub trait EndpointServer: Send + Sync {
    /// URLs the server serves sessions on.
    fn endpoint_urls(&self) -> Vec<String>;
    /// URLs the server answers discovery requests on.
    fn discovery_urls(&self) -> Vec<String>;
}

/// Extract the routing key from an endpoint URL: the path component of an
/// absolute URL with authority, or the original string when it is not one.
#[must_use]
pub fn path_or_url(endpoint_url: &str) -> String {
    match Url::parse(endpoint_url) {
        Ok(url) if url.has_authority() => url.path().to_string(),
        Ok(_) => endpoint_url.to_string(),
        Err(error) => {
            warn!(url = endpoint_url, %error, "endpoint URL is not a valid URI");
            endpoint_url.to_string()
        }
    }
}

/// Concurrent map from endpoint-URL paths to server handles.
pub struct EndpointRegistry<S: ?Sized> {
    servers: RwLock<HashMap<String, Arc<S>>>,
    strict_endpoint_urls: AtomicBool,
}

impl<S: EndpointServer + ?Sized> EndpointRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            servers: RwLock::new(HashMap::new()),
            strict_endpoint_urls: AtomicBool::new(true),
        }
    }

    /// Bind every endpoint and discovery path of `server` that is not
    /// already taken. Existing bindings are never overwritten.
    pub fn register(&self, server: &Arc<S>) {
        let mut servers = self
            .servers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for url in server
            .endpoint_urls()
            .into_iter()
            .chain(server.discovery_urls())
        {
            let path = path_or_url(&url);
            if !servers.contains_key(&path) {
                debug!(%path, "added server at path");
                servers.insert(path, Arc::clone(server));
            }
        }
    }

    /// Remove every path binding that currently maps to `server`.
    pub fn unregister(&self, server: &Arc<S>) {
        let mut servers = self
            .servers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for url in server
            .endpoint_urls()
            .into_iter()
            .chain(server.discovery_urls())
        {
            let path = path_or_url(&url);
            let owned = servers
                .get(&path)
                .is_some_and(|bound| Arc::ptr_eq(bound, server));
            if owned {
                servers.remove(&path);
                debug!(%path, "removed server at path");
            }
        }
    }

    /// Resolve `endpoint_url` to a registered server.
    ///
    /// When no path matches and strict endpoint URLs are disabled, the
    /// lookup falls back to the single registered server, if exactly one
    /// distinct server is registered (however many paths it occupies).
    #[must_use]
    pub fn lookup(&self, endpoint_url: &str) -> Option<Arc<S>> {
        let path = path_or_url(endpoint_url);
        let servers = self.servers.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(server) = servers.get(&path) {
            return Some(Arc::clone(server));
        }

        if !self.is_strict_endpoint_urls() {
            let mut values = servers.values();
            let first = values.next()?;
            if values.all(|other| Arc::ptr_eq(other, first)) {
                return Some(Arc::clone(first));
            }
        }

        None
    }

    pub fn set_strict_endpoint_urls(&self, strict: bool) {
        self.strict_endpoint_urls.store(strict, Ordering::SeqCst);
    }

    /// Whether lookups require an exact path match.
    #[must_use]
    pub fn is_strict_endpoint_urls(&self) -> bool {
        self.strict_endpoint_urls.load(Ordering::SeqCst)
    }

    /// Number of bound paths (not distinct servers).
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.servers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path_count() == 0
    }
}

impl<S: EndpointServer + ?Sized> Default for EndpointRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
