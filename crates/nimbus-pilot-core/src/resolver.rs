//! Dependent field resolution
//!
//! The cascade: cloud -> {instance types, images} -> flavors -> placement.
//! Each function here applies one fetched payload to the field table and,
//! where the cascade continues, tells the caller which follow-up fetch to
//! issue. Network calls themselves happen above this layer; everything
//! here is a pure state transition and idempotent over the fields it owns,
//! so independently-triggered resolutions cannot corrupt each other.

use crate::fields::{Choice, FieldId, FormState, hints};
use nimbus_rs::{DynamicFields, FlavorInfo};

/// Sentinel id for the "custom" entry, which switches the category to a
/// free-text input. Always at index 0 of the option list.
pub const CUSTOM_CHOICE_ID: i64 = 0;

/// Images whose label contains this marker are the category default.
pub const DEFAULT_IMAGE_MARKER: &str = "(default)";

/// Glyph appended to a flavor name flagged as default
const DEFAULT_FLAVOR_GLYPH: &str = " \u{2605}";

/// Invalidate everything downstream of the cloud selector. Called on a
/// provider change before the new `dynamic_fields` payload arrives.
pub fn invalidate_downstream(form: &mut FormState) {
    form.disable_with_hint(FieldId::InstanceType, hints::CHOOSE_CLOUD_FIRST);
    form.disable_with_hint(FieldId::ImageId, hints::CHOOSE_CLOUD_FIRST);
    form.disable_with_hint(FieldId::Flavor, hints::CHOOSE_CLOUD_FIRST);
    form.disable_with_hint(FieldId::Placement, hints::FILL_AND_REFRESH);
    form.disable_with_hint(FieldId::KeyPair, hints::ENTER_CREDENTIALS);
    form.control_mut(FieldId::CustomInstanceType).visible = false;
    form.control_mut(FieldId::CustomImageId).visible = false;
}

/// Apply a `dynamic_fields` payload for the selected cloud.
///
/// Returns the image id whose flavors must be fetched next, when an image
/// was auto-selected by the default marker. That fetch is a dependency of
/// the image selection, never a parallel request.
pub fn apply_dynamic_fields(form: &mut FormState, fields: &DynamicFields) -> Option<i64> {
    // Instance types: index 0 is reserved for the custom sentinel; the
    // first fetched (non-custom) entry becomes the selection.
    if fields.instance_types.is_empty() {
        form.disable_with_hint(FieldId::InstanceType, hints::CHOOSE_CLOUD_FIRST);
    } else {
        let mut options = vec![Choice::new(CUSTOM_CHOICE_ID, "Custom...")];
        options.extend(
            fields
                .instance_types
                .iter()
                .map(|(id, label)| Choice::new(*id, label.clone())),
        );
        form.set_options(FieldId::InstanceType, options, Some(1));
    }
    sync_custom_visibility(form, FieldId::InstanceType, FieldId::CustomInstanceType);

    // Images: same shape, but the default is marker-driven.
    let mut flavor_fetch = None;
    if fields.image_ids.is_empty() {
        form.disable_with_hint(FieldId::ImageId, hints::CHOOSE_CLOUD_FIRST);
        form.disable_with_hint(FieldId::Flavor, hints::CHOOSE_CLOUD_FIRST);
    } else {
        let mut options = vec![Choice::new(CUSTOM_CHOICE_ID, "Custom...")];
        options.extend(
            fields
                .image_ids
                .iter()
                .map(|(id, label)| Choice::new(*id, label.clone())),
        );
        let marker_index = options
            .iter()
            .position(|c| c.id != CUSTOM_CHOICE_ID && c.label.contains(DEFAULT_IMAGE_MARKER));
        // Selecting the marker image triggers its flavor fetch; without a
        // marker we still select the first real image but leave the flavor
        // fetch to an explicit selection change.
        let selected = marker_index.unwrap_or(1);
        let selected_id = options[selected].id;
        form.set_options(FieldId::ImageId, options, Some(selected));
        if marker_index.is_some() {
            flavor_fetch = Some(selected_id);
        }
    }
    sync_custom_visibility(form, FieldId::ImageId, FieldId::CustomImageId);

    flavor_fetch
}

/// Apply a flavor list fetched for the currently selected image.
///
/// When several flavors are flagged default the last one listed wins.
pub fn apply_flavors(form: &mut FormState, flavors: &[FlavorInfo]) {
    if flavors.is_empty() {
        form.disable_with_hint(FieldId::Flavor, hints::NO_FLAVORS);
        return;
    }
    let mut selected = None;
    let options: Vec<Choice> = flavors
        .iter()
        .enumerate()
        .map(|(i, flavor)| {
            if flavor.default {
                selected = Some(i);
            }
            let label = if flavor.default {
                format!("{}{}", flavor.name, DEFAULT_FLAVOR_GLYPH)
            } else {
                flavor.name.clone()
            };
            Choice {
                id: flavor.id,
                label,
                detail: Some(flavor.description.clone()),
                default: flavor.default,
            }
        })
        .collect();
    form.set_options(FieldId::Flavor, options, selected.or(Some(0)));
}

/// Apply the key pair list for the current credentials. Key pairs carry no
/// default-selection rule; the first entry is merely the cursor position.
pub fn apply_key_pairs(form: &mut FormState, key_pairs: &[String]) {
    if key_pairs.is_empty() {
        form.disable_with_hint(FieldId::KeyPair, hints::ENTER_CREDENTIALS);
        return;
    }
    let options: Vec<Choice> = key_pairs
        .iter()
        .enumerate()
        .map(|(i, name)| Choice::new(i as i64 + 1, name.clone()))
        .collect();
    form.set_options(FieldId::KeyPair, options, Some(0));
}

/// Show or hide the free-text twin of a category depending on whether the
/// custom sentinel is selected.
pub fn sync_custom_visibility(form: &mut FormState, select: FieldId, custom: FieldId) {
    let is_custom = form
        .control(select)
        .selected_choice()
        .is_some_and(|c| c.id == CUSTOM_CHOICE_ID);
    form.control_mut(custom).visible = is_custom;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic(
        instance_types: Vec<(i64, &str)>,
        image_ids: Vec<(i64, &str)>,
    ) -> DynamicFields {
        DynamicFields {
            instance_types: instance_types
                .into_iter()
                .map(|(id, l)| (id, l.to_string()))
                .collect(),
            image_ids: image_ids
                .into_iter()
                .map(|(id, l)| (id, l.to_string()))
                .collect(),
        }
    }

    #[test]
    fn categories_toggle_independently_on_empty_lists() {
        let mut form = FormState::new();
        let fetch = apply_dynamic_fields(
            &mut form,
            &dynamic(vec![(3, "Micro")], vec![]),
        );
        assert!(form.control(FieldId::InstanceType).enabled);
        assert!(!form.control(FieldId::ImageId).enabled);
        assert_eq!(fetch, None);

        let mut form = FormState::new();
        apply_dynamic_fields(&mut form, &dynamic(vec![], vec![(7, "Base image")]));
        assert!(!form.control(FieldId::InstanceType).enabled);
        assert_eq!(
            form.control(FieldId::InstanceType).hint.as_deref(),
            Some(hints::CHOOSE_CLOUD_FIRST)
        );
        assert!(form.control(FieldId::ImageId).enabled);
    }

    #[test]
    fn first_non_custom_instance_type_is_selected() {
        let mut form = FormState::new();
        apply_dynamic_fields(
            &mut form,
            &dynamic(vec![(3, "Micro"), (4, "Large")], vec![]),
        );
        let control = form.control(FieldId::InstanceType);
        assert_eq!(control.options[0].id, CUSTOM_CHOICE_ID);
        assert_eq!(control.selected_choice().unwrap().id, 3);
        assert!(!form.control(FieldId::CustomInstanceType).visible);
    }

    #[test]
    fn marker_image_selection_triggers_exactly_one_flavor_fetch() {
        let mut form = FormState::new();
        let fetch = apply_dynamic_fields(
            &mut form,
            &dynamic(
                vec![(3, "Micro")],
                vec![(6, "Old image"), (7, "Base image (default)"), (8, "Other")],
            ),
        );
        assert_eq!(fetch, Some(7));
        assert_eq!(form.control(FieldId::ImageId).selected_choice().unwrap().id, 7);
    }

    #[test]
    fn no_marker_image_selects_first_but_fetches_nothing() {
        let mut form = FormState::new();
        let fetch = apply_dynamic_fields(
            &mut form,
            &dynamic(vec![(3, "Micro")], vec![(6, "A"), (7, "B")]),
        );
        assert_eq!(fetch, None);
        assert_eq!(form.control(FieldId::ImageId).selected_choice().unwrap().id, 6);
    }

    #[test]
    fn last_default_flavor_wins() {
        let mut form = FormState::new();
        let flavors = vec![
            FlavorInfo {
                id: 1,
                name: "small".into(),
                description: "1 core".into(),
                default: true,
            },
            FlavorInfo {
                id: 2,
                name: "medium".into(),
                description: "2 cores".into(),
                default: false,
            },
            FlavorInfo {
                id: 3,
                name: "large".into(),
                description: "4 cores".into(),
                default: true,
            },
        ];
        apply_flavors(&mut form, &flavors);
        let control = form.control(FieldId::Flavor);
        assert_eq!(control.selected_choice().unwrap().id, 3);
        assert!(control.selected_choice().unwrap().label.ends_with("\u{2605}"));
        assert_eq!(control.options[1].detail.as_deref(), Some("2 cores"));
    }

    #[test]
    fn empty_flavor_list_disables_with_hint() {
        let mut form = FormState::new();
        apply_flavors(&mut form, &[]);
        let control = form.control(FieldId::Flavor);
        assert!(!control.enabled);
        assert_eq!(control.hint.as_deref(), Some(hints::NO_FLAVORS));
    }

    #[test]
    fn cloud_change_invalidates_downstream_state() {
        let mut form = FormState::new();
        apply_dynamic_fields(
            &mut form,
            &dynamic(vec![(3, "Micro")], vec![(7, "Base (default)")]),
        );
        apply_key_pairs(&mut form, &["kp".to_string()]);
        invalidate_downstream(&mut form);
        for id in [
            FieldId::InstanceType,
            FieldId::ImageId,
            FieldId::Flavor,
            FieldId::Placement,
            FieldId::KeyPair,
        ] {
            let control = form.control(id);
            assert!(!control.enabled, "{id:?} should be disabled");
            assert!(control.options.is_empty(), "{id:?} should drop options");
        }
    }
}
