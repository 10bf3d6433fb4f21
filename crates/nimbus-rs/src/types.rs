//! Wire types for the launch service API
//!
//! All operations are POST with JSON bodies. Field names follow the
//! service's camelCase convention except the launch form itself, which
//! uses the form field names the service validates against.

use serde::{Deserialize, Serialize};

/// Provider-dependent option lists returned for a cloud selection.
///
/// Each entry is an `(id, label)` pair. An id of `0` is never returned by
/// the service; it is reserved client-side for the "custom" sentinel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFields {
    #[serde(default)]
    pub instance_types: Vec<(i64, String)>,
    #[serde(default)]
    pub image_ids: Vec<(i64, String)>,
}

/// A machine flavor available for an image
#[derive(Debug, Clone, Deserialize)]
pub struct FlavorInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
}

/// Credentials plus cloud id, used by key pair and cluster discovery calls
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialQuery {
    pub cloud_id: i64,
    pub access_key: String,
    pub secret_key: String,
}

/// Request body for a live placement lookup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementQuery {
    pub cloud_id: i64,
    pub access_key: String,
    pub secret_key: String,
    pub instance_type: String,
}

/// Response to a live placement lookup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementsResponse {
    #[serde(default)]
    pub placements: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response to a key pair lookup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairsResponse {
    #[serde(default)]
    pub key_pairs: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response to a cluster discovery submission: the job handle
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchClustersResponse {
    pub task_id: String,
}

/// A cluster found by the discovery job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredCluster {
    pub cluster_name: String,
    #[serde(default)]
    pub placement: Option<String>,
}

/// Poll response for a discovery task.
///
/// While `ready` is false only `wait_text` is meaningful; once `ready`
/// flips, `clusters_list` and `error` carry the terminal payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub ready: bool,
    #[serde(default)]
    pub clusters_list: Vec<DiscoveredCluster>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub wait_text: Option<String>,
}

/// The assembled launch form.
///
/// Serialized field names match the names the service reports back in
/// `formErrors`, so validation failures can be mapped onto controls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LaunchRequest {
    pub cloud: i64,
    pub cluster_name: String,
    pub password: String,
    pub access_key: String,
    pub secret_key: String,
    pub instance_type: String,
    pub image_id: String,
    pub flavor: String,
    pub placement: String,
    pub key_pair: String,
}

/// Response to a launch submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub form_errors: Vec<(String, String)>,
    /// Monitor destination, present on success
    #[serde(default)]
    pub redirect: Option<String>,
}

impl LaunchResponse {
    /// A launch succeeded when the service reported neither a general
    /// error nor any field-scoped validation failures.
    pub fn is_ok(&self) -> bool {
        self.error.as_deref().unwrap_or("").is_empty() && self.form_errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dynamic_fields() {
        let json = r#"{
            "instanceTypes": [[3, "Micro"], [4, "Large"]],
            "imageIds": [[7, "Galaxy CloudMan (default)"]]
        }"#;
        let fields: DynamicFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.instance_types.len(), 2);
        assert_eq!(fields.instance_types[0], (3, "Micro".to_string()));
        assert_eq!(fields.image_ids[0].0, 7);
    }

    #[test]
    fn parse_dynamic_fields_empty_object() {
        let fields: DynamicFields = serde_json::from_str("{}").unwrap();
        assert!(fields.instance_types.is_empty());
        assert!(fields.image_ids.is_empty());
    }

    #[test]
    fn parse_pending_task_status() {
        let json = r#"{"ready": false, "waitText": "Still looking..."}"#;
        let status: TaskStatus = serde_json::from_str(json).unwrap();
        assert!(!status.ready);
        assert_eq!(status.wait_text.as_deref(), Some("Still looking..."));
        assert!(status.clusters_list.is_empty());
    }

    #[test]
    fn parse_ready_task_status() {
        let json = r#"{
            "ready": true,
            "clustersList": [
                {"clusterName": "foo", "placement": "us-east-1a"},
                {"clusterName": "bar", "placement": null}
            ],
            "error": null
        }"#;
        let status: TaskStatus = serde_json::from_str(json).unwrap();
        assert!(status.ready);
        assert_eq!(status.clusters_list.len(), 2);
        assert_eq!(status.clusters_list[0].cluster_name, "foo");
        assert_eq!(status.clusters_list[1].placement, None);
    }

    #[test]
    fn launch_response_ok_only_without_errors() {
        let ok: LaunchResponse =
            serde_json::from_str(r#"{"redirect": "/monitor"}"#).unwrap();
        assert!(ok.is_ok());

        // An empty error string with field errors is still a failure
        let rejected: LaunchResponse = serde_json::from_str(
            r#"{"error": "", "formErrors": [["instance_type", "required"]]}"#,
        )
        .unwrap();
        assert!(!rejected.is_ok());
        assert_eq!(rejected.form_errors[0].0, "instance_type");
    }

    #[test]
    fn launch_request_serializes_form_field_names() {
        let req = LaunchRequest {
            cloud: 1,
            cluster_name: "demo".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("cluster_name").is_some());
        assert!(value.get("key_pair").is_some());
    }
}
