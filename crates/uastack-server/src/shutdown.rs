//! Lifecycle signal for the acceptor's background task.
//!
//! Bundles the listening flag, the stop signal, and the accept-loop task
//! handle so `bind`/`shutdown` stay symmetric.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// Coordinates shutdown of a single background task.
pub struct ShutdownSignal {
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    online: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            stop_tx,
            stop_rx,
            online: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// A receiver the background task selects on to observe the stop signal.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    pub fn set_online(&self) {
        self.online.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Register the background task to await on shutdown, replacing any
    /// previous one.
    pub async fn set_task(&self, handle: JoinHandle<()>) {
        *self.task.lock().await = Some(handle);
    }

    /// Signal stop and mark offline. Idempotent.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
        self.online.store(false, Ordering::SeqCst);
    }

    /// Await the registered background task, if any.
    pub async fn join(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            let _ = handle.await;
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
