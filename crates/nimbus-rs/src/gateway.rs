//! Gateway trait over the launch service
//!
//! The orchestration core drives this trait rather than the concrete HTTP
//! client, so resolvers and pollers can be exercised against in-memory
//! fakes in tests.

use crate::error::ApiError;
use crate::types::{
    CredentialQuery, DynamicFields, FlavorInfo, KeyPairsResponse, LaunchRequest, LaunchResponse,
    PlacementQuery, PlacementsResponse, TaskStatus,
};
use async_trait::async_trait;

/// Client-side view of the launch service RPC boundary
#[async_trait]
pub trait CloudGateway: Send + Sync {
    /// Fetch instance type and image choices for a cloud
    async fn dynamic_fields(&self, cloud_id: i64) -> Result<DynamicFields, ApiError>;

    /// Fetch the flavors available for an image
    async fn get_flavors(&self, image_id: i64) -> Result<Vec<FlavorInfo>, ApiError>;

    /// Live placement lookup for the current credentials and instance type
    async fn get_placements(&self, query: &PlacementQuery) -> Result<PlacementsResponse, ApiError>;

    /// Key pairs visible to the given credentials
    async fn get_key_pairs(&self, query: &CredentialQuery) -> Result<KeyPairsResponse, ApiError>;

    /// Submit a cluster discovery job; returns the task id immediately
    async fn fetch_clusters(&self, query: &CredentialQuery) -> Result<String, ApiError>;

    /// Poll a discovery task by id
    async fn update_clusters(&self, task_id: &str) -> Result<TaskStatus, ApiError>;

    /// Best-effort revoke of a discovery task. The remote job may keep
    /// running; callers must not rely on server-side termination.
    async fn revoke_fetch_clusters(&self, task_id: &str) -> Result<(), ApiError>;

    /// Submit the assembled launch form
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchResponse, ApiError>;
}
