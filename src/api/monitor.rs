//! Periodic backend connection monitoring.
//!
//! Keeps the client's `online` flag current so the dashboard can show
//! a demo-mode notice while the backend is unreachable and drop it as
//! soon as the backend comes back.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::client::PredictionClient;

/// Handle to a background health-polling task.
///
/// The task is aborted when the handle is stopped or dropped.
pub struct ConnectionMonitor {
    handle: JoinHandle<()>,
}

impl ConnectionMonitor {
    /// Start polling with the interval from the client configuration.
    pub fn spawn(client: Arc<PredictionClient>) -> Self {
        let interval = client.config().monitor_interval();
        Self::spawn_with_interval(client, interval)
    }

    /// Start polling with an explicit interval.
    pub fn spawn_with_interval(client: Arc<PredictionClient>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut was_online = client.is_online();

            loop {
                ticker.tick().await;
                let online = client.probe_health().await;

                if online != was_online {
                    if online {
                        tracing::info!("backend connection restored");
                    } else {
                        tracing::warn!("backend unreachable, dashboard degrades to demo data");
                    }
                    was_online = online;
                }
            }
        });

        Self { handle }
    }

    /// Whether the polling task is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop polling.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for ConnectionMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
