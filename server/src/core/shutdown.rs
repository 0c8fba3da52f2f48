//! Centralized shutdown management

use std::sync::Arc;

use tokio::sync::watch;

/// Shutdown service coordinating graceful teardown
///
/// Long-lived handles (cache backend, warehouse client) are connectionless or
/// pooled, so shutdown only needs to stop accepting requests and let in-flight
/// ones finish; axum's `with_graceful_shutdown` handles the draining.
#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for ShutdownService {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownService {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Subscribe to the shutdown signal
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    /// Trigger shutdown
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Resolve when shutdown is triggered (for axum graceful shutdown)
    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Spawn a task that triggers shutdown on ctrl-c
    pub fn listen_for_ctrl_c(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received ctrl-c, shutting down");
                service.trigger();
            }
        });
    }
}
