//! HTTP client for the launch service
//!
//! All operations are POST with JSON bodies against fixed paths below the
//! configured base endpoint. The session token from the client config is
//! attached as a header; obtaining and refreshing it is the caller's
//! concern.

use crate::config::PilotConfig;
use crate::error::ApiError;
use crate::gateway::CloudGateway;
use crate::types::{
    CredentialQuery, DynamicFields, FetchClustersResponse, FlavorInfo, KeyPairsResponse,
    LaunchRequest, LaunchResponse, PlacementQuery, PlacementsResponse, TaskStatus,
};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Header carrying the session anti-forgery token
const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// HTTP client for one launch service endpoint
#[derive(Debug, Clone)]
pub struct LaunchClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl LaunchClient {
    /// Build a client for the given base endpoint.
    ///
    /// A stalled request would otherwise hang its workflow forever, so the
    /// client carries connect and request timeouts. The discovery poll
    /// cadence is managed above this layer.
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, ApiError> {
        let base = endpoint.trim_end_matches('/').to_string();
        if base.is_empty() {
            return Err(ApiError::ConfigInvalid("empty service endpoint".into()));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, base, token })
    }

    /// Build a client from a loaded config
    pub fn from_config(config: &PilotConfig) -> Result<Self, ApiError> {
        Self::new(&config.endpoint, config.token.clone())
    }

    fn url(&self, operation: &str) -> String {
        format!("{}/{}", self.base, operation)
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let mut request = self.http.post(self.url(operation)).json(body);
        if let Some(token) = &self.token {
            request = request.header(SESSION_TOKEN_HEADER, token);
        }
        tracing::debug!(operation, "calling launch service");
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CloudGateway for LaunchClient {
    async fn dynamic_fields(&self, cloud_id: i64) -> Result<DynamicFields, ApiError> {
        self.post("dynamic_fields", &json!({ "cloudId": cloud_id }))
            .await
    }

    async fn get_flavors(&self, image_id: i64) -> Result<Vec<FlavorInfo>, ApiError> {
        #[derive(serde::Deserialize)]
        struct FlavorsResponse {
            #[serde(default)]
            flavors: Vec<FlavorInfo>,
        }
        let response: FlavorsResponse = self
            .post("get_flavors", &json!({ "imageId": image_id }))
            .await?;
        Ok(response.flavors)
    }

    async fn get_placements(&self, query: &PlacementQuery) -> Result<PlacementsResponse, ApiError> {
        self.post("get_placements", query).await
    }

    async fn get_key_pairs(&self, query: &CredentialQuery) -> Result<KeyPairsResponse, ApiError> {
        self.post("get_key_pairs", query).await
    }

    async fn fetch_clusters(&self, query: &CredentialQuery) -> Result<String, ApiError> {
        let response: FetchClustersResponse = self.post("fetch_clusters", query).await?;
        Ok(response.task_id)
    }

    async fn update_clusters(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        self.post("update_clusters", &json!({ "taskId": task_id }))
            .await
    }

    async fn revoke_fetch_clusters(&self, task_id: &str) -> Result<(), ApiError> {
        // Acknowledgement body is ignored; the revoke has no guaranteed
        // effect on the remote job.
        let _: serde_json::Value = self
            .post("revoke_fetch_clusters", &json!({ "taskId": task_id }))
            .await?;
        Ok(())
    }

    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchResponse, ApiError> {
        self.post("launch", request).await
    }
}
