//! nimbus-pilot-core: orchestration logic for the cluster launch workflow
//!
//! Holds the field-state table and the resolvers, poller, and workflows
//! that mutate it. Network access goes through the `CloudGateway` trait
//! from nimbus-rs; nothing in this crate renders UI.

pub mod discovery;
pub mod fields;
pub mod launch;
pub mod placement;
pub mod poller;
pub mod resolver;

pub use discovery::{DiscoveryOutcome, DiscoverySession, credentials_ready, run_discovery};
pub use fields::{Choice, FieldControl, FieldId, FieldKind, FormState, hints};
pub use launch::{LaunchOutcome, apply_launch_rejection, build_launch_request, submit_launch};
pub use placement::{PlacementPlan, PlacementTrigger, plan_placement};
pub use poller::{CancelToken, POLL_INTERVAL, PollOutcome, poll_task};
pub use resolver::{CUSTOM_CHOICE_ID, DEFAULT_IMAGE_MARKER};
