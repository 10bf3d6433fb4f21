//! nimbus-rs: client SDK for the nimbus cluster launch service
//!
//! Provides the typed HTTP client, wire types, and the [`CloudGateway`]
//! trait the orchestration core is written against.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod types;

pub use client::LaunchClient;
pub use config::{CloudInfo, PilotConfig};
pub use error::ApiError;
pub use gateway::CloudGateway;
pub use types::{
    CredentialQuery, DiscoveredCluster, DynamicFields, FetchClustersResponse, FlavorInfo,
    KeyPairsResponse, LaunchRequest, LaunchResponse, PlacementQuery, PlacementsResponse,
    TaskStatus,
};
