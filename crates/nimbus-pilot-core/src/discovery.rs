//! Cluster discovery workflow
//!
//! Composes a `fetch_clusters` submission with the task poller and shapes
//! the terminal payload for the form. The discovered cluster list is the
//! session cache consulted by the placement resolver; it lives with one
//! (cloud, credentials) pair and is dropped when either changes. At most
//! one discovery session runs at a time - starting a new one cancels the
//! previous session's token, abandoning its task.

use crate::fields::{Choice, FieldId, FormState, hints};
use crate::poller::{CancelToken, PollOutcome, poll_task};
use nimbus_rs::{CloudGateway, CredentialQuery, DiscoveredCluster};
use std::time::Duration;
use tokio::sync::mpsc;

/// Terminal result of one discovery session
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryOutcome {
    /// Clusters were found; this list becomes the session cache
    Clusters(Vec<DiscoveredCluster>),
    /// The job finished cleanly with nothing to show; the user enters a
    /// name manually
    Empty,
    /// Submission or a poll failed, or the job itself reported an error
    Failed(String),
    Cancelled,
}

/// Handle for the single active session
#[derive(Debug, Clone, Default)]
pub struct DiscoverySession {
    cancel: CancelToken,
}

impl DiscoverySession {
    /// Begin a new session, cancelling and abandoning whatever the
    /// previous token still controlled.
    pub fn begin(&mut self) -> CancelToken {
        self.cancel.cancel();
        self.cancel = CancelToken::new();
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Both credential fields must be non-empty before any discovery traffic
pub fn credentials_ready(form: &FormState) -> bool {
    !form.control(FieldId::AccessKey).text.trim().is_empty()
        && !form.control(FieldId::SecretKey).text.trim().is_empty()
}

/// Run one discovery session to its terminal state.
///
/// Progress text from pending polls is forwarded on `progress`. Callers
/// check [`credentials_ready`] first; this function assumes the query is
/// complete.
pub async fn run_discovery(
    gateway: &dyn CloudGateway,
    query: &CredentialQuery,
    cancel: &CancelToken,
    interval: Duration,
    progress: &mpsc::UnboundedSender<String>,
) -> DiscoveryOutcome {
    let task_id = match gateway.fetch_clusters(query).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "cluster discovery submission failed");
            return DiscoveryOutcome::Failed(e.to_string());
        }
    };
    tracing::info!(%task_id, cloud = query.cloud_id, "cluster discovery submitted");

    match poll_task(gateway, &task_id, cancel, interval, progress).await {
        PollOutcome::Ready {
            error: Some(error), ..
        } => DiscoveryOutcome::Failed(error),
        PollOutcome::Ready { clusters, .. } if clusters.is_empty() => DiscoveryOutcome::Empty,
        PollOutcome::Ready { clusters, .. } => DiscoveryOutcome::Clusters(clusters),
        PollOutcome::Cancelled => DiscoveryOutcome::Cancelled,
        PollOutcome::Failed(e) => DiscoveryOutcome::Failed(e),
    }
}

/// Rebuild the cluster-name control as a selection list seeded from the
/// cache. Subsequent selection changes drive the placement resolver in
/// implicit mode.
pub fn apply_cluster_list(form: &mut FormState, clusters: &[DiscoveredCluster]) {
    let options: Vec<Choice> = clusters
        .iter()
        .enumerate()
        .map(|(i, c)| Choice::new(i as i64 + 1, c.cluster_name.clone()))
        .collect();
    let control = form.control_mut(FieldId::ClusterName);
    control.kind = crate::fields::FieldKind::Select;
    control.text.clear();
    form.set_options(FieldId::ClusterName, options, Some(0));
}

/// Hint shown on the cluster-name field when credentials are missing
pub fn apply_missing_credentials(form: &mut FormState) {
    form.control_mut(FieldId::ClusterName).hint = Some(hints::ENTER_CREDENTIALS.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::tests::ScriptedGateway;
    use nimbus_rs::TaskStatus;

    fn query() -> CredentialQuery {
        CredentialQuery {
            cloud_id: 1,
            access_key: "AKIA".into(),
            secret_key: "secret".into(),
        }
    }

    fn fast() -> Duration {
        Duration::from_millis(1)
    }

    fn ready(clusters: Vec<DiscoveredCluster>, error: Option<String>) -> Result<TaskStatus, String> {
        Ok(TaskStatus {
            ready: true,
            clusters_list: clusters,
            error,
            wait_text: None,
        })
    }

    #[test]
    fn credentials_gate_blocks_empty_fields() {
        let mut form = FormState::new();
        assert!(!credentials_ready(&form));
        form.control_mut(FieldId::AccessKey).text = "AKIA".into();
        assert!(!credentials_ready(&form));
        form.control_mut(FieldId::SecretKey).text = "  ".into();
        assert!(!credentials_ready(&form));
        form.control_mut(FieldId::SecretKey).text = "secret".into();
        assert!(credentials_ready(&form));
    }

    #[tokio::test]
    async fn ready_error_beats_cluster_list() {
        let gateway = ScriptedGateway::new(vec![ready(
            vec![DiscoveredCluster {
                cluster_name: "foo".into(),
                placement: None,
            }],
            Some("expired keys".into()),
        )]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let outcome =
            run_discovery(&gateway, &query(), &CancelToken::new(), fast(), &tx).await;
        assert_eq!(outcome, DiscoveryOutcome::Failed("expired keys".into()));
    }

    #[tokio::test]
    async fn empty_list_without_error_is_empty_outcome() {
        let gateway = ScriptedGateway::new(vec![ready(vec![], None)]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let outcome =
            run_discovery(&gateway, &query(), &CancelToken::new(), fast(), &tx).await;
        assert_eq!(outcome, DiscoveryOutcome::Empty);
    }

    #[tokio::test]
    async fn discovered_clusters_become_the_outcome() {
        let clusters = vec![
            DiscoveredCluster {
                cluster_name: "foo".into(),
                placement: Some("us-east-1a".into()),
            },
            DiscoveredCluster {
                cluster_name: "bar".into(),
                placement: None,
            },
        ];
        let gateway = ScriptedGateway::new(vec![ready(clusters.clone(), None)]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let outcome =
            run_discovery(&gateway, &query(), &CancelToken::new(), fast(), &tx).await;
        assert_eq!(outcome, DiscoveryOutcome::Clusters(clusters));
    }

    #[test]
    fn beginning_a_session_cancels_the_previous_token() {
        let mut session = DiscoverySession::default();
        let first = session.begin();
        assert!(!first.is_cancelled());
        let second = session.begin();
        assert!(first.is_cancelled(), "prior task is abandoned");
        assert!(!second.is_cancelled());
    }

    #[test]
    fn cluster_list_rebuilds_name_control_as_select() {
        let mut form = FormState::new();
        form.control_mut(FieldId::ClusterName).text = "typed-name".into();
        apply_cluster_list(
            &mut form,
            &[DiscoveredCluster {
                cluster_name: "foo".into(),
                placement: None,
            }],
        );
        let control = form.control(FieldId::ClusterName);
        assert_eq!(control.kind, crate::fields::FieldKind::Select);
        assert_eq!(control.selected_choice().unwrap().label, "foo");
        assert!(control.text.is_empty());
    }
}
