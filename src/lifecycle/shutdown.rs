//! Shutdown coordination for the serve loop.

use tokio::sync::watch;

/// Coordinator that unblocks the accept loop when the server closes.
///
/// Backed by a watch channel so the signal is level-triggered: a
/// subscriber created after the trigger still observes it immediately.
/// Triggering is idempotent and safe from any task.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A future that resolves once [`trigger`](Self::trigger) has run.
    pub fn notified(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            // An error means the coordinator was dropped, which also
            // counts as shutdown.
            let _ = rx.wait_for(|triggered| *triggered).await;
        }
    }

    /// Fire the shutdown signal. Subsequent calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
