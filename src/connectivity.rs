//! Backend connectivity monitor
//!
//! Owns the shared [`ConnectivityState`]: probes the backend health endpoint
//! once at startup and then on a fixed interval, mapping the outcome to a
//! terminal state. A probe never fails past its boundary; anything
//! unexpected lands on `Offline` and the next cycle retries.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::{ConnectivityState, StatusCell};
use crate::remote::ChatBackend;

pub struct ConnectivityMonitor {
    backend: Arc<dyn ChatBackend>,
    status: Arc<StatusCell>,
    probe_timeout: Duration,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        status: Arc<StatusCell>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            status,
            probe_timeout,
            poll_task: Mutex::new(None),
        }
    }

    /// Current shared state, as last written by any probe or send attempt.
    pub fn state(&self) -> ConnectivityState {
        self.status.get()
    }

    /// Run a single health probe and publish the result.
    ///
    /// Idempotent and safe to invoke concurrently with the scheduled timer;
    /// the status cell is last-writer-wins. Also serves as the manual
    /// re-check triggered from the UI.
    pub async fn probe(&self) -> ConnectivityState {
        probe_once(self.backend.as_ref(), &self.status, self.probe_timeout).await
    }

    /// Start the periodic probe task. The first probe fires immediately.
    ///
    /// Restarting replaces (and aborts) any previous task, so at most one
    /// timer is ever live.
    pub fn start(&self, interval: Duration) {
        let backend = Arc::clone(&self.backend);
        let status = Arc::clone(&self.status);
        let probe_timeout = self.probe_timeout;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            info!("Connectivity monitor started ({:?} interval)", interval);

            loop {
                ticker.tick().await;
                let state = probe_once(backend.as_ref(), &status, probe_timeout).await;
                debug!(state = %state, "Scheduled probe completed");
            }
        });

        if let Some(previous) = self.poll_task.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the periodic probe task. In-flight probes are abandoned.
    pub fn shutdown(&self) {
        if let Some(handle) = self.poll_task.lock().unwrap().take() {
            handle.abort();
            info!("Connectivity monitor stopped");
        }
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        // No orphaned timers past the monitor's lifetime.
        if let Some(handle) = self.poll_task.lock().unwrap().take() {
            handle.abort();
        }
    }
}

/// One probe cycle: transient `Checking`, then exactly one terminal value.
async fn probe_once(
    backend: &dyn ChatBackend,
    status: &StatusCell,
    probe_timeout: Duration,
) -> ConnectivityState {
    status.set(ConnectivityState::Checking);

    let outcome = tokio::time::timeout(probe_timeout, backend.health()).await;

    let state = match outcome {
        Ok(Ok(health)) if health.is_ok() => ConnectivityState::Connected,
        Ok(Ok(health)) => {
            warn!(status = %health.status, "Backend reachable but not healthy");
            ConnectivityState::Degraded
        }
        Ok(Err(error)) => {
            warn!("Backend health probe failed: {}", error);
            ConnectivityState::Offline
        }
        Err(_) => {
            warn!("Backend health probe timed out after {:?}", probe_timeout);
            ConnectivityState::Offline
        }
    };

    status.set(state);
    state
}
