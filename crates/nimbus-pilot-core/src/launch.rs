//! Launch submission
//!
//! The terminal stage of the workflow: serialize the field table into the
//! launch request, submit it, and map the structured failure response
//! back onto individual controls. Every failure path leaves the form
//! editable so the user can correct and retry.

use crate::fields::{FieldId, FormState};
use crate::resolver::CUSTOM_CHOICE_ID;
use nimbus_rs::{CloudGateway, LaunchRequest};

/// Terminal result of one submission
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchOutcome {
    /// No error and no field errors: redirect to the monitor destination
    Redirected(String),
    /// The service rejected the form
    Rejected {
        error: String,
        field_errors: Vec<(String, String)>,
    },
    /// No structured response at all
    TransportFailed(String),
}

/// Serialize the current form values into the launch request. A category
/// on the custom sentinel contributes its free-text twin instead of the
/// sentinel id.
pub fn build_launch_request(form: &FormState, cloud_id: i64) -> LaunchRequest {
    LaunchRequest {
        cloud: cloud_id,
        cluster_name: cluster_name_value(form),
        password: form.value(FieldId::Password),
        access_key: form.value(FieldId::AccessKey),
        secret_key: form.value(FieldId::SecretKey),
        instance_type: custom_or_selected(form, FieldId::InstanceType, FieldId::CustomInstanceType),
        image_id: custom_or_selected(form, FieldId::ImageId, FieldId::CustomImageId),
        flavor: form.value(FieldId::Flavor),
        placement: form
            .selected_label(FieldId::Placement)
            .unwrap_or_default()
            .to_string(),
        key_pair: form
            .selected_label(FieldId::KeyPair)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Cluster name comes from the discovered selection when present, else
/// from the typed text.
fn cluster_name_value(form: &FormState) -> String {
    match form.selected_label(FieldId::ClusterName) {
        Some(label) => label.to_string(),
        None => form.value(FieldId::ClusterName),
    }
}

fn custom_or_selected(form: &FormState, select: FieldId, custom: FieldId) -> String {
    let on_custom = form
        .control(select)
        .selected_choice()
        .is_some_and(|c| c.id == CUSTOM_CHOICE_ID);
    if on_custom {
        form.control(custom).text.clone()
    } else {
        form.value(select)
    }
}

/// Submit the request and classify the response
pub async fn submit_launch(gateway: &dyn CloudGateway, request: &LaunchRequest) -> LaunchOutcome {
    match gateway.launch(request).await {
        Ok(response) if response.is_ok() => {
            let destination = response.redirect.unwrap_or_else(|| "/monitor".to_string());
            tracing::info!(cluster = %request.cluster_name, "launch accepted");
            LaunchOutcome::Redirected(destination)
        }
        Ok(response) => {
            tracing::warn!(
                cluster = %request.cluster_name,
                field_errors = response.form_errors.len(),
                "launch rejected"
            );
            LaunchOutcome::Rejected {
                error: response.error.unwrap_or_default(),
                field_errors: response.form_errors,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "launch transport failure");
            LaunchOutcome::TransportFailed(e.to_string())
        }
    }
}

/// Map a rejection onto the form: each field error lands inline at its
/// control, the form is restored to an editable state, and the combined
/// page-level message is returned for the error region.
pub fn apply_launch_rejection(
    form: &mut FormState,
    error: &str,
    field_errors: &[(String, String)],
) -> String {
    form.clear_field_errors();
    form.restore_all();

    let mut unknown = Vec::new();
    for (name, message) in field_errors {
        match FieldId::from_form_name(name) {
            Some(id) => form.set_field_error(id, message),
            None => unknown.push(format!("{name}: {message}")),
        }
    }

    let mut parts = Vec::new();
    if !error.is_empty() {
        parts.push(error.to_string());
    }
    if !field_errors.is_empty() {
        parts.push(format!(
            "{} field(s) need attention",
            field_errors.len()
        ));
    }
    parts.extend(unknown);
    if parts.is_empty() {
        "Launch request was not accepted".to_string()
    } else {
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Choice;
    use crate::poller::tests::ScriptedGateway;

    fn filled_form() -> FormState {
        let mut form = FormState::new();
        form.control_mut(FieldId::ClusterName).text = "demo".into();
        form.control_mut(FieldId::Password).text = "hunter2".into();
        form.control_mut(FieldId::AccessKey).text = "AKIA".into();
        form.control_mut(FieldId::SecretKey).text = "secret".into();
        form.set_options(
            FieldId::InstanceType,
            vec![Choice::new(0, "Custom..."), Choice::new(3, "Micro")],
            Some(1),
        );
        form.set_options(
            FieldId::ImageId,
            vec![Choice::new(0, "Custom..."), Choice::new(7, "Base (default)")],
            Some(1),
        );
        form.set_options(FieldId::Flavor, vec![Choice::new(2, "m1.small")], Some(0));
        form.set_options(FieldId::Placement, vec![Choice::new(1, "us-east-1a")], Some(0));
        form.set_options(FieldId::KeyPair, vec![Choice::new(1, "default_kp")], Some(0));
        form
    }

    #[test]
    fn request_carries_selected_values() {
        let request = build_launch_request(&filled_form(), 1);
        assert_eq!(request.cloud, 1);
        assert_eq!(request.cluster_name, "demo");
        assert_eq!(request.instance_type, "3");
        assert_eq!(request.image_id, "7");
        assert_eq!(request.placement, "us-east-1a");
        assert_eq!(request.key_pair, "default_kp");
    }

    #[test]
    fn custom_sentinel_uses_free_text_value() {
        let mut form = filled_form();
        form.control_mut(FieldId::InstanceType).selected = Some(0);
        form.control_mut(FieldId::CustomInstanceType).text = "c7g.metal".into();
        let request = build_launch_request(&form, 1);
        assert_eq!(request.instance_type, "c7g.metal");
    }

    #[test]
    fn discovered_selection_overrides_typed_name() {
        let mut form = filled_form();
        crate::discovery::apply_cluster_list(
            &mut form,
            &[nimbus_rs::DiscoveredCluster {
                cluster_name: "found-cluster".into(),
                placement: None,
            }],
        );
        let request = build_launch_request(&form, 1);
        assert_eq!(request.cluster_name, "found-cluster");
    }

    #[test]
    fn rejection_maps_one_inline_error_and_restores_form() {
        let mut form = filled_form();
        form.disable_all();
        let message = apply_launch_rejection(
            &mut form,
            "",
            &[("instance_type".to_string(), "required".to_string())],
        );
        assert_eq!(
            form.control(FieldId::InstanceType).error.as_deref(),
            Some("required")
        );
        assert!(form.control(FieldId::ClusterName).enabled, "form editable again");
        assert!(form.control(FieldId::Flavor).enabled);
        assert!(message.contains("1 field(s)"));
        // Only the named field carries an inline error
        assert!(form.control(FieldId::ImageId).error.is_none());
    }

    #[test]
    fn unknown_field_names_surface_in_page_message() {
        let mut form = filled_form();
        let message = apply_launch_rejection(
            &mut form,
            "bad request",
            &[("mystery".to_string(), "nope".to_string())],
        );
        assert!(message.contains("bad request"));
        assert!(message.contains("mystery: nope"));
    }

    #[tokio::test]
    async fn clean_response_redirects() {
        let gateway = ScriptedGateway::new(vec![]);
        let outcome = submit_launch(&gateway, &build_launch_request(&filled_form(), 1)).await;
        assert_eq!(outcome, LaunchOutcome::Redirected("/monitor".to_string()));
    }
}
