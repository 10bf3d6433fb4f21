//! Placement resolution
//!
//! Placements are scoped to a (cluster name, cloud) pair. A resolution is
//! planned from the cluster cache first; only an explicit refresh with no
//! cache hit goes to the network. The decision is a pure function so the
//! mutually-exclusive outcomes stay unit-testable.

use crate::fields::{Choice, FieldId, FormState, hints};
use nimbus_rs::DiscoveredCluster;

/// What caused this resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementTrigger {
    /// User pressed refresh
    Explicit,
    /// User picked an existing cluster from the discovered list
    Implicit,
}

/// The resolved next step
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementPlan {
    /// Cache hit: render this placement as the only option
    UseCached(String),
    /// Implicit trigger without a cache hit: the user moved off a cached
    /// cluster, prompt instead of fetching
    PromptRefill,
    /// Explicit trigger without a cache hit: issue one live lookup
    FetchLive,
}

/// Decide how to resolve the placement for `cluster_name`. Exactly one of
/// the non-cached outcomes applies, keyed off the trigger mode.
pub fn plan_placement(
    cache: &[DiscoveredCluster],
    cluster_name: &str,
    trigger: PlacementTrigger,
) -> PlacementPlan {
    let hit = cache
        .iter()
        .find(|c| c.cluster_name == cluster_name)
        .and_then(|c| c.placement.clone());
    match (hit, trigger) {
        (Some(placement), _) => PlacementPlan::UseCached(placement),
        (None, PlacementTrigger::Implicit) => PlacementPlan::PromptRefill,
        (None, PlacementTrigger::Explicit) => PlacementPlan::FetchLive,
    }
}

/// Render a cached placement as the single enabled option
pub fn apply_cached(form: &mut FormState, placement: &str) {
    form.set_options(FieldId::Placement, vec![Choice::new(1, placement)], Some(0));
}

/// Disable with the fill-and-refresh prompt (implicit miss)
pub fn apply_prompt_refill(form: &mut FormState) {
    form.disable_with_hint(FieldId::Placement, hints::FILL_AND_REFRESH);
}

/// Disable with the in-flight indicator while the live lookup runs
pub fn apply_fetch_pending(form: &mut FormState) {
    form.disable_with_hint(FieldId::Placement, hints::FETCHING);
}

/// Apply the result of a live lookup
pub fn apply_live_result(form: &mut FormState, placements: &[String]) {
    if placements.is_empty() {
        form.disable_with_hint(FieldId::Placement, hints::REFRESH_TO_UPDATE);
        return;
    }
    let options: Vec<Choice> = placements
        .iter()
        .enumerate()
        .map(|(i, p)| Choice::new(i as i64 + 1, p.clone()))
        .collect();
    form.set_options(FieldId::Placement, options, Some(0));
}

/// Disable and attach the remote error inline. The caller also surfaces
/// the message in the page-level error region.
pub fn apply_fetch_error(form: &mut FormState, error: &str) {
    form.disable_with_hint(FieldId::Placement, hints::REFRESH_TO_UPDATE);
    form.set_field_error(FieldId::Placement, error);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> Vec<DiscoveredCluster> {
        vec![
            DiscoveredCluster {
                cluster_name: "foo".into(),
                placement: Some("us-east-1a".into()),
            },
            DiscoveredCluster {
                cluster_name: "unplaced".into(),
                placement: None,
            },
        ]
    }

    #[test]
    fn cached_hit_needs_no_network_in_either_mode() {
        for trigger in [PlacementTrigger::Implicit, PlacementTrigger::Explicit] {
            assert_eq!(
                plan_placement(&cache(), "foo", trigger),
                PlacementPlan::UseCached("us-east-1a".into())
            );
        }
    }

    #[test]
    fn cached_hit_renders_single_enabled_option() {
        let mut form = FormState::new();
        if let PlacementPlan::UseCached(p) =
            plan_placement(&cache(), "foo", PlacementTrigger::Implicit)
        {
            apply_cached(&mut form, &p);
        }
        let control = form.control(FieldId::Placement);
        assert!(control.enabled);
        assert_eq!(control.options.len(), 1);
        assert_eq!(control.selected_choice().unwrap().label, "us-east-1a");
    }

    #[test]
    fn implicit_miss_prompts_without_fetching() {
        assert_eq!(
            plan_placement(&cache(), "bar", PlacementTrigger::Implicit),
            PlacementPlan::PromptRefill
        );
        let mut form = FormState::new();
        apply_prompt_refill(&mut form);
        let control = form.control(FieldId::Placement);
        assert!(!control.enabled);
        assert_eq!(control.hint.as_deref(), Some(hints::FILL_AND_REFRESH));
    }

    #[test]
    fn explicit_miss_plans_exactly_one_live_fetch() {
        assert_eq!(
            plan_placement(&cache(), "bar", PlacementTrigger::Explicit),
            PlacementPlan::FetchLive
        );
    }

    #[test]
    fn cached_entry_without_placement_is_a_miss() {
        assert_eq!(
            plan_placement(&cache(), "unplaced", PlacementTrigger::Explicit),
            PlacementPlan::FetchLive
        );
    }

    #[test]
    fn empty_live_result_disables_with_refresh_hint() {
        let mut form = FormState::new();
        apply_live_result(&mut form, &[]);
        let control = form.control(FieldId::Placement);
        assert!(!control.enabled);
        assert_eq!(control.hint.as_deref(), Some(hints::REFRESH_TO_UPDATE));
    }

    #[test]
    fn live_result_enables_all_returned_values() {
        let mut form = FormState::new();
        apply_live_result(&mut form, &["us-east-1a".into(), "us-east-1b".into()]);
        let control = form.control(FieldId::Placement);
        assert!(control.enabled);
        assert_eq!(control.options.len(), 2);
    }

    #[test]
    fn fetch_error_lands_inline() {
        let mut form = FormState::new();
        apply_fetch_error(&mut form, "boom");
        let control = form.control(FieldId::Placement);
        assert!(!control.enabled);
        assert_eq!(control.error.as_deref(), Some("boom"));
    }
}
