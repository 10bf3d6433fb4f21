//! Declarative field-state table
//!
//! Every control on the launch form is described by a [`FieldControl`] in a
//! table keyed by [`FieldId`]. Resolvers and workflows mutate this table
//! only; a single projection step in the UI turns it into widgets. The
//! option list and the enabled flag always change together, so a disabled
//! control never carries stale options and an enabled select is never
//! empty.

use std::collections::BTreeMap;

/// Logical field identifiers, one per form control
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldId {
    Cloud,
    ClusterName,
    Password,
    AccessKey,
    SecretKey,
    InstanceType,
    CustomInstanceType,
    ImageId,
    CustomImageId,
    Flavor,
    Placement,
    KeyPair,
}

impl FieldId {
    /// All fields in form order
    pub const ALL: [FieldId; 12] = [
        FieldId::Cloud,
        FieldId::ClusterName,
        FieldId::Password,
        FieldId::AccessKey,
        FieldId::SecretKey,
        FieldId::InstanceType,
        FieldId::CustomInstanceType,
        FieldId::ImageId,
        FieldId::CustomImageId,
        FieldId::Flavor,
        FieldId::Placement,
        FieldId::KeyPair,
    ];

    /// Fields taken out of play while a discovery session runs. The cloud
    /// selector and credentials stay editable so the user can correct them
    /// after cancelling.
    pub const DISABLEABLE: [FieldId; 9] = [
        FieldId::ClusterName,
        FieldId::Password,
        FieldId::InstanceType,
        FieldId::CustomInstanceType,
        FieldId::ImageId,
        FieldId::CustomImageId,
        FieldId::Flavor,
        FieldId::Placement,
        FieldId::KeyPair,
    ];

    /// The form field name used on the wire and in `formErrors` entries
    pub fn form_name(&self) -> &'static str {
        match self {
            FieldId::Cloud => "cloud",
            FieldId::ClusterName => "cluster_name",
            FieldId::Password => "password",
            FieldId::AccessKey => "access_key",
            FieldId::SecretKey => "secret_key",
            FieldId::InstanceType => "instance_type",
            FieldId::CustomInstanceType => "custom_instance_type",
            FieldId::ImageId => "image_id",
            FieldId::CustomImageId => "custom_image_id",
            FieldId::Flavor => "flavor",
            FieldId::Placement => "placement",
            FieldId::KeyPair => "key_pair",
        }
    }

    /// Reverse mapping for validation failures coming back from the service
    pub fn from_form_name(name: &str) -> Option<FieldId> {
        FieldId::ALL.iter().copied().find(|f| f.form_name() == name)
    }

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::Cloud => "Cloud",
            FieldId::ClusterName => "Cluster Name",
            FieldId::Password => "Cluster Password",
            FieldId::AccessKey => "Access Key",
            FieldId::SecretKey => "Secret Key",
            FieldId::InstanceType => "Instance Type",
            FieldId::CustomInstanceType => "Custom Instance Type",
            FieldId::ImageId => "Image",
            FieldId::CustomImageId => "Custom Image Id",
            FieldId::Flavor => "Flavor",
            FieldId::Placement => "Placement",
            FieldId::KeyPair => "Key Pair",
        }
    }
}

/// How a field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text input
    Text,
    /// Free text input, rendered masked
    Secret,
    /// One-of-n selection
    Select,
}

/// One selectable option
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: i64,
    pub label: String,
    /// Tooltip text (flavor descriptions)
    pub detail: Option<String>,
    pub default: bool,
}

impl Choice {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            detail: None,
            default: false,
        }
    }
}

/// State of one form control
#[derive(Debug, Clone)]
pub struct FieldControl {
    pub kind: FieldKind,
    pub options: Vec<Choice>,
    pub selected: Option<usize>,
    pub text: String,
    pub enabled: bool,
    pub visible: bool,
    /// Explanatory label shown while the control is disabled or empty
    pub hint: Option<String>,
    /// Inline validation error attached to this control
    pub error: Option<String>,
}

impl FieldControl {
    fn text_field(kind: FieldKind) -> Self {
        Self {
            kind,
            options: Vec::new(),
            selected: None,
            text: String::new(),
            enabled: true,
            visible: true,
            hint: None,
            error: None,
        }
    }

    fn select_field(hint: &str) -> Self {
        Self {
            kind: FieldKind::Select,
            options: Vec::new(),
            selected: None,
            text: String::new(),
            enabled: false,
            visible: true,
            hint: Some(hint.to_string()),
            error: None,
        }
    }

    /// Currently selected choice, if any
    pub fn selected_choice(&self) -> Option<&Choice> {
        self.selected.and_then(|i| self.options.get(i))
    }
}

/// Hints for empty or not-yet-resolvable categories
pub mod hints {
    pub const CHOOSE_CLOUD_FIRST: &str = "choose cloud type first";
    pub const NO_FLAVORS: &str = "no flavors available";
    pub const FILL_AND_REFRESH: &str = "fill above fields and click refresh";
    pub const FETCHING: &str = "fetching\u{2026}";
    pub const REFRESH_TO_UPDATE: &str = "click refresh to update";
    pub const ENTER_CREDENTIALS: &str = "enter cloud credentials first";
}

/// The whole form as a table of field states
#[derive(Debug, Clone)]
pub struct FormState {
    fields: BTreeMap<FieldId, FieldControl>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(FieldId::Cloud, FieldControl::select_field("no clouds configured"));
        fields.insert(FieldId::ClusterName, FieldControl::text_field(FieldKind::Text));
        fields.insert(FieldId::Password, FieldControl::text_field(FieldKind::Secret));
        fields.insert(FieldId::AccessKey, FieldControl::text_field(FieldKind::Text));
        fields.insert(FieldId::SecretKey, FieldControl::text_field(FieldKind::Secret));
        fields.insert(
            FieldId::InstanceType,
            FieldControl::select_field(hints::CHOOSE_CLOUD_FIRST),
        );
        let mut custom_type = FieldControl::text_field(FieldKind::Text);
        custom_type.visible = false;
        fields.insert(FieldId::CustomInstanceType, custom_type);
        fields.insert(
            FieldId::ImageId,
            FieldControl::select_field(hints::CHOOSE_CLOUD_FIRST),
        );
        let mut custom_image = FieldControl::text_field(FieldKind::Text);
        custom_image.visible = false;
        fields.insert(FieldId::CustomImageId, custom_image);
        fields.insert(
            FieldId::Flavor,
            FieldControl::select_field(hints::CHOOSE_CLOUD_FIRST),
        );
        fields.insert(
            FieldId::Placement,
            FieldControl::select_field(hints::FILL_AND_REFRESH),
        );
        fields.insert(
            FieldId::KeyPair,
            FieldControl::select_field(hints::ENTER_CREDENTIALS),
        );
        Self { fields }
    }

    pub fn control(&self, id: FieldId) -> &FieldControl {
        // The table is total over FieldId by construction
        &self.fields[&id]
    }

    pub fn control_mut(&mut self, id: FieldId) -> &mut FieldControl {
        self.fields
            .get_mut(&id)
            .expect("field table is total over FieldId")
    }

    /// Replace a select's options and enable it in one step. The hint is
    /// cleared and a selection applied together with the new list, so the
    /// control is never enabled-but-empty or disabled-with-stale-options.
    pub fn set_options(&mut self, id: FieldId, options: Vec<Choice>, selected: Option<usize>) {
        let control = self.control_mut(id);
        debug_assert!(!options.is_empty(), "enabled select must carry options");
        let selected = selected.filter(|i| *i < options.len());
        control.options = options;
        control.selected = selected;
        control.enabled = true;
        control.hint = None;
    }

    /// Disable a select and drop its options, leaving an explanatory hint
    pub fn disable_with_hint(&mut self, id: FieldId, hint: &str) {
        let control = self.control_mut(id);
        control.options.clear();
        control.selected = None;
        control.enabled = false;
        control.hint = Some(hint.to_string());
    }

    /// The value a field contributes to the launch request
    pub fn value(&self, id: FieldId) -> String {
        let control = self.control(id);
        match control.kind {
            FieldKind::Text | FieldKind::Secret => control.text.clone(),
            FieldKind::Select => control
                .selected_choice()
                .map(|c| c.id.to_string())
                .unwrap_or_default(),
        }
    }

    /// The label of the selected choice, for display and name matching
    pub fn selected_label(&self, id: FieldId) -> Option<&str> {
        self.control(id).selected_choice().map(|c| c.label.as_str())
    }

    pub fn set_field_error(&mut self, id: FieldId, message: &str) {
        self.control_mut(id).error = Some(message.to_string());
    }

    pub fn clear_field_errors(&mut self) {
        for control in self.fields.values_mut() {
            control.error = None;
        }
    }

    /// Disable the discovery-time subset
    pub fn disable_subset(&mut self) {
        for id in FieldId::DISABLEABLE {
            self.control_mut(id).enabled = false;
        }
    }

    /// Disable every control (launch submission)
    pub fn disable_all(&mut self) {
        for control in self.fields.values_mut() {
            control.enabled = false;
        }
    }

    /// Restore editability after a failed or finished operation. Text
    /// fields come back unconditionally; selects come back only when they
    /// still have options, keeping the empty-category invariant.
    pub fn restore_all(&mut self) {
        for control in self.fields.values_mut() {
            control.enabled = match control.kind {
                FieldKind::Text | FieldKind::Secret => true,
                FieldKind::Select => !control.options.is_empty(),
            };
        }
    }
}
