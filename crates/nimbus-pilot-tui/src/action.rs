//! Actions for the nimbus-pilot TUI
//!
//! Actions represent events that can modify application state or start
//! background work.

use nimbus_pilot_core::PlacementTrigger;

/// Actions that can be dispatched in the application
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    Quit,

    // UI state
    Tick,
    Resize(u16, u16),

    // Cascade triggers
    /// Cloud selection changed: downstream state was invalidated and the
    /// provider's dynamic fields must be fetched
    CloudChanged,
    /// Fetch flavors for the given image id
    FetchFlavors(i64),
    /// Both credential fields are present: fetch key pairs
    FetchKeyPairs,
    /// Resolve the placement field
    ResolvePlacement(PlacementTrigger),

    // Discovery session
    StartDiscovery,
    CancelDiscovery,

    // Terminal stage
    Launch,
}
