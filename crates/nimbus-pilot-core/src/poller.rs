//! Generic long-running task polling
//!
//! Protocol: submit returns a task id; status is then polled on a fixed
//! cadence until the task reports ready. Polls are strictly sequential -
//! the next one is only scheduled after the previous response arrives, so
//! requests for one task never overlap. Cancellation is cooperative: the
//! flag is checked before each request and before each re-schedule, and a
//! cancelled poller sends one best-effort revoke. The remote task may
//! keep running after a revoke; that is a documented limitation of the
//! protocol, not something this layer papers over.

use nimbus_rs::{CloudGateway, DiscoveredCluster};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Reference poll cadence
pub const POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Cooperative cancellation flag shared between the UI and a poller
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal result of one polling run
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The task finished and handed over its payload
    Ready {
        clusters: Vec<DiscoveredCluster>,
        error: Option<String>,
    },
    /// The cancellation flag stopped the poller; the remote task may
    /// still be running
    Cancelled,
    /// A poll failed; a single failure is terminal, no retry
    Failed(String),
}

/// Poll `task_id` until it is ready, cancelled, or a poll fails.
///
/// Progress text from not-ready responses is forwarded on `progress`; the
/// terminal payload is delivered exactly once via the return value.
pub async fn poll_task(
    gateway: &dyn CloudGateway,
    task_id: &str,
    cancel: &CancelToken,
    interval: Duration,
    progress: &mpsc::UnboundedSender<String>,
) -> PollOutcome {
    loop {
        if cancel.is_cancelled() {
            return revoke_and_finish(gateway, task_id).await;
        }

        let status = match gateway.update_clusters(task_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(task_id, error = %e, "task poll failed");
                return PollOutcome::Failed(e.to_string());
            }
        };

        if status.ready {
            tracing::info!(task_id, clusters = status.clusters_list.len(), "task ready");
            return PollOutcome::Ready {
                clusters: status.clusters_list,
                error: status.error.filter(|e| !e.is_empty()),
            };
        }

        if let Some(text) = status.wait_text {
            let _ = progress.send(text);
        }

        // Check again before scheduling the next poll so a flag set while
        // the response was in flight stops us here.
        if cancel.is_cancelled() {
            return revoke_and_finish(gateway, task_id).await;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Best-effort revoke. Failure to revoke is logged and ignored; there is
/// no server-side termination guarantee either way.
async fn revoke_and_finish(gateway: &dyn CloudGateway, task_id: &str) -> PollOutcome {
    if let Err(e) = gateway.revoke_fetch_clusters(task_id).await {
        tracing::warn!(task_id, error = %e, "revoke notification failed");
    } else {
        tracing::info!(task_id, "revoke notification sent");
    }
    PollOutcome::Cancelled
}
