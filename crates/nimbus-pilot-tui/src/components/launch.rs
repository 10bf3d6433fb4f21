//! Cluster launch form - state machine driven provisioning flow
//!
//! Guides the user through assembling a cluster launch request:
//! 1. Pick a cloud; instance types and images resolve from it
//! 2. Enter credentials; key pairs resolve from them
//! 3. Optionally discover existing clusters (background job with polling)
//! 4. Resolve a placement, from the discovery cache or live
//! 5. Submit the launch and map any validation failures back onto fields
//!
//! All form state lives in the core field table; this component projects
//! it to widgets and turns key events into actions.

use crate::action::Action;
use crate::components::Component;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use nimbus_pilot_core::{
    CUSTOM_CHOICE_ID, DiscoveryOutcome, FieldId, FieldKind, FormState, LaunchOutcome,
    PlacementPlan, PlacementTrigger, credentials_ready, hints,
    launch::{apply_launch_rejection, build_launch_request},
    placement,
    resolver,
};
use nimbus_rs::{
    CloudInfo, CredentialQuery, DiscoveredCluster, DynamicFields, FlavorInfo, KeyPairsResponse,
    LaunchRequest, PlacementQuery, PlacementsResponse,
};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Workflow states for the launch form
#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    /// Assembling the form; all resolvers live here
    Editing,
    /// A discovery session is polling in the background
    Discovering,
    /// The launch request is in flight
    Launching,
    /// Launch accepted; holds the monitor destination
    Launched(String),
}

/// Spinner frames for busy states
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Launch form component
pub struct LaunchComponent {
    form: FormState,
    clouds: Vec<CloudInfo>,
    phase: Phase,
    /// Field the cursor is on
    focus: FieldId,
    /// Session cache of discovered clusters
    cluster_cache: Vec<DiscoveredCluster>,
    /// Whether the "existing clusters" indicator is shown
    has_discovered: bool,
    /// Page-level error region
    page_error: Option<String>,
    /// Page-level informational notice
    notice: Option<String>,
    /// Progress text from pending discovery polls
    progress: Option<String>,
    /// One-time legacy-image caution for the default cloud
    warned_legacy: bool,
    spinner_frame: usize,
}

impl LaunchComponent {
    pub fn new(clouds: Vec<CloudInfo>, access_key: Option<String>, secret_key: Option<String>) -> Self {
        let mut form = FormState::new();
        if !clouds.is_empty() {
            let options = clouds
                .iter()
                .map(|c| nimbus_pilot_core::Choice::new(c.id, c.name.clone()))
                .collect();
            let default_index = clouds.iter().position(|c| c.default).unwrap_or(0);
            form.set_options(FieldId::Cloud, options, Some(default_index));
        }
        if let Some(key) = access_key {
            form.control_mut(FieldId::AccessKey).text = key;
        }
        if let Some(key) = secret_key {
            form.control_mut(FieldId::SecretKey).text = key;
        }
        Self {
            form,
            clouds,
            phase: Phase::Editing,
            focus: FieldId::Cloud,
            cluster_cache: Vec::new(),
            has_discovered: false,
            page_error: None,
            notice: None,
            progress: None,
            warned_legacy: false,
            spinner_frame: 0,
        }
    }

    // ============ QUERIES FOR THE APP ============

    pub fn selected_cloud_id(&self) -> Option<i64> {
        self.form
            .control(FieldId::Cloud)
            .selected_choice()
            .map(|c| c.id)
    }

    fn selected_cloud_is_default(&self) -> bool {
        self.selected_cloud_id()
            .and_then(|id| self.clouds.iter().find(|c| c.id == id))
            .is_some_and(|c| c.default)
    }

    pub fn credential_query(&self) -> Option<CredentialQuery> {
        Some(CredentialQuery {
            cloud_id: self.selected_cloud_id()?,
            access_key: self.form.control(FieldId::AccessKey).text.clone(),
            secret_key: self.form.control(FieldId::SecretKey).text.clone(),
        })
    }

    pub fn placement_query(&self) -> Option<PlacementQuery> {
        let creds = self.credential_query()?;
        Some(PlacementQuery {
            cloud_id: creds.cloud_id,
            access_key: creds.access_key,
            secret_key: creds.secret_key,
            instance_type: self.form.value(FieldId::InstanceType),
        })
    }

    pub fn launch_request(&self) -> Option<LaunchRequest> {
        Some(build_launch_request(&self.form, self.selected_cloud_id()?))
    }

    fn current_cluster_name(&self) -> String {
        match self.form.selected_label(FieldId::ClusterName) {
            Some(label) => label.to_string(),
            None => self.form.control(FieldId::ClusterName).text.clone(),
        }
    }

    // ============ STATE TRANSITIONS ============

    fn transition(&mut self, phase: Phase) {
        tracing::info!("launch form: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Cloud changed: every downstream cached value is stale
    pub fn invalidate_for_cloud_change(&mut self) {
        resolver::invalidate_downstream(&mut self.form);
        self.drop_cluster_cache();
        self.page_error = None;
    }

    /// Credentials changed: the cluster cache and key pairs are scoped to
    /// them
    fn invalidate_for_credential_change(&mut self) {
        self.drop_cluster_cache();
        self.form
            .disable_with_hint(FieldId::KeyPair, hints::ENTER_CREDENTIALS);
    }

    fn drop_cluster_cache(&mut self) {
        self.cluster_cache.clear();
        self.has_discovered = false;
        let control = self.form.control_mut(FieldId::ClusterName);
        if control.kind == FieldKind::Select {
            control.kind = FieldKind::Text;
            control.options.clear();
            control.selected = None;
            control.enabled = true;
        }
    }

    /// Resolve the placement field. Returns true when a live fetch is
    /// required; the pending state is already applied in that case.
    pub fn resolve_placement(&mut self, trigger: PlacementTrigger) -> bool {
        let name = self.current_cluster_name();
        match nimbus_pilot_core::plan_placement(&self.cluster_cache, &name, trigger) {
            PlacementPlan::UseCached(p) => {
                placement::apply_cached(&mut self.form, &p);
                false
            }
            PlacementPlan::PromptRefill => {
                placement::apply_prompt_refill(&mut self.form);
                false
            }
            PlacementPlan::FetchLive => {
                // The live query needs a cloud id; without one there is
                // nothing to fetch and the pending state would never clear.
                if self.selected_cloud_id().is_none() {
                    placement::apply_prompt_refill(&mut self.form);
                    return false;
                }
                placement::apply_fetch_pending(&mut self.form);
                true
            }
        }
    }

    /// Gate and enter a discovery session. Returns false when a
    /// precondition failed and no network call may be made; the form is
    /// left fully editable in that case.
    pub fn begin_discovery(&mut self) -> bool {
        if self.selected_cloud_id().is_none() {
            self.notice = Some("Select a cloud provider first.".to_string());
            return false;
        }
        if !credentials_ready(&self.form) {
            nimbus_pilot_core::discovery::apply_missing_credentials(&mut self.form);
            self.notice = Some(hints::ENTER_CREDENTIALS.to_string());
            return false;
        }
        self.page_error = None;
        self.notice = None;
        if self.selected_cloud_is_default() && !self.warned_legacy {
            self.warned_legacy = true;
            self.notice = Some(
                "Stock images on this cloud may be outdated; double-check the image selection."
                    .to_string(),
            );
        }
        self.form.disable_subset();
        self.progress = Some("Submitting discovery job...".to_string());
        self.transition(Phase::Discovering);
        true
    }

    pub fn discovery_cancel_requested(&mut self) {
        self.progress = Some("Cancelling... the remote job may still finish.".to_string());
    }

    /// Disable the whole form for submission
    pub fn begin_launch(&mut self) {
        self.form.clear_field_errors();
        self.page_error = None;
        self.form.disable_all();
        self.transition(Phase::Launching);
    }

    // ============ ASYNC RESULT HANDLERS ============

    /// Apply a `dynamic_fields` payload; returns the dependent flavor
    /// fetch when an image was auto-selected.
    pub fn on_dynamic_fields(&mut self, result: std::result::Result<DynamicFields, String>) -> Option<Action> {
        match result {
            Ok(fields) => resolver::apply_dynamic_fields(&mut self.form, &fields)
                .map(Action::FetchFlavors),
            Err(e) => {
                self.page_error = Some(e);
                None
            }
        }
    }

    pub fn on_flavors(&mut self, result: std::result::Result<Vec<FlavorInfo>, String>) {
        match result {
            Ok(flavors) => resolver::apply_flavors(&mut self.form, &flavors),
            Err(e) => {
                self.form.disable_with_hint(FieldId::Flavor, hints::NO_FLAVORS);
                self.page_error = Some(e);
            }
        }
    }

    pub fn on_key_pairs(&mut self, result: std::result::Result<KeyPairsResponse, String>) {
        match result {
            Ok(response) => {
                if let Some(error) = response.error.filter(|e| !e.is_empty()) {
                    self.page_error = Some(error);
                } else {
                    resolver::apply_key_pairs(&mut self.form, &response.key_pairs);
                }
            }
            Err(e) => self.page_error = Some(e),
        }
    }

    pub fn on_placements(&mut self, result: std::result::Result<PlacementsResponse, String>) {
        match result {
            Ok(response) => {
                if let Some(error) = response.error.filter(|e| !e.is_empty()) {
                    placement::apply_fetch_error(&mut self.form, &error);
                    self.page_error = Some(error);
                } else {
                    placement::apply_live_result(&mut self.form, &response.placements);
                }
            }
            Err(e) => {
                placement::apply_fetch_error(&mut self.form, &e);
                self.page_error = Some(e);
            }
        }
    }

    pub fn on_discovery_progress(&mut self, text: String) {
        self.progress = Some(text);
    }

    pub fn on_discovery_done(&mut self, outcome: DiscoveryOutcome) {
        self.progress = None;
        self.form.restore_all();
        match outcome {
            DiscoveryOutcome::Clusters(clusters) => {
                nimbus_pilot_core::discovery::apply_cluster_list(&mut self.form, &clusters);
                self.cluster_cache = clusters;
                self.has_discovered = true;
                self.notice = Some(
                    "Existing clusters found; pick one to restart it, or switch back to a new name."
                        .to_string(),
                );
            }
            DiscoveryOutcome::Empty => {
                self.notice = Some("No existing clusters; enter a name for a new one.".to_string());
            }
            DiscoveryOutcome::Failed(e) => {
                self.page_error = Some(e);
            }
            DiscoveryOutcome::Cancelled => {
                self.notice =
                    Some("Discovery cancelled; the remote job may still be running.".to_string());
            }
        }
        self.transition(Phase::Editing);
    }

    pub fn on_launch_done(&mut self, outcome: LaunchOutcome) {
        match outcome {
            LaunchOutcome::Redirected(destination) => {
                self.transition(Phase::Launched(destination));
            }
            LaunchOutcome::Rejected {
                error,
                field_errors,
            } => {
                self.page_error = Some(apply_launch_rejection(
                    &mut self.form,
                    &error,
                    &field_errors,
                ));
                self.transition(Phase::Editing);
            }
            LaunchOutcome::TransportFailed(e) => {
                tracing::warn!(error = %e, "launch submission unreachable");
                self.form.restore_all();
                self.page_error =
                    Some("Could not reach the launch service; please try again.".to_string());
                self.transition(Phase::Editing);
            }
        }
    }

    // ============ KEY HANDLING ============

    fn visible_fields(&self) -> Vec<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|id| self.form.control(*id).visible)
            .collect()
    }

    fn focus_next(&mut self) -> Option<Action> {
        let leaving = self.focus;
        let fields = self.visible_fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + 1) % fields.len()];
        self.after_focus_left(leaving)
    }

    fn focus_prev(&mut self) -> Option<Action> {
        let leaving = self.focus;
        let fields = self.visible_fields();
        let i = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(i + fields.len() - 1) % fields.len()];
        self.after_focus_left(leaving)
    }

    /// Completing the credential pair resolves key pairs
    fn after_focus_left(&mut self, left: FieldId) -> Option<Action> {
        let was_credential = matches!(left, FieldId::AccessKey | FieldId::SecretKey);
        if was_credential
            && credentials_ready(&self.form)
            && self.form.control(FieldId::KeyPair).options.is_empty()
        {
            return Some(Action::FetchKeyPairs);
        }
        None
    }

    fn cycle_selection(&mut self, forward: bool) -> Option<Action> {
        let control = self.form.control(self.focus);
        if control.kind != FieldKind::Select || !control.enabled || control.options.is_empty() {
            return None;
        }
        let len = control.options.len();
        let current = control.selected.unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.form.control_mut(self.focus).selected = Some(next);
        self.selection_side_effect()
    }

    /// Selection changes re-enter the cascade
    fn selection_side_effect(&mut self) -> Option<Action> {
        match self.focus {
            FieldId::Cloud => {
                self.invalidate_for_cloud_change();
                Some(Action::CloudChanged)
            }
            FieldId::InstanceType => {
                resolver::sync_custom_visibility(
                    &mut self.form,
                    FieldId::InstanceType,
                    FieldId::CustomInstanceType,
                );
                None
            }
            FieldId::ImageId => {
                resolver::sync_custom_visibility(
                    &mut self.form,
                    FieldId::ImageId,
                    FieldId::CustomImageId,
                );
                let selected = self.form.control(FieldId::ImageId).selected_choice()?;
                if selected.id == CUSTOM_CHOICE_ID {
                    self.form
                        .disable_with_hint(FieldId::Flavor, hints::NO_FLAVORS);
                    None
                } else {
                    Some(Action::FetchFlavors(selected.id))
                }
            }
            FieldId::ClusterName => Some(Action::ResolvePlacement(PlacementTrigger::Implicit)),
            _ => None,
        }
    }

    fn edit_text(&mut self, key: KeyEvent) -> Option<Action> {
        let control = self.form.control(self.focus);
        if !matches!(control.kind, FieldKind::Text | FieldKind::Secret) || !control.enabled {
            return None;
        }
        match key.code {
            KeyCode::Char(c) => self.form.control_mut(self.focus).text.push(c),
            KeyCode::Backspace => {
                self.form.control_mut(self.focus).text.pop();
            }
            _ => return None,
        }
        if matches!(self.focus, FieldId::AccessKey | FieldId::SecretKey) {
            self.invalidate_for_credential_change();
        }
        None
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('d') => Some(Action::StartDiscovery),
                KeyCode::Char('r') => Some(Action::ResolvePlacement(PlacementTrigger::Explicit)),
                KeyCode::Char('l') => Some(Action::Launch),
                KeyCode::Char('c') => Some(Action::Quit),
                _ => None,
            };
        }
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Left => self.cycle_selection(false),
            KeyCode::Right => self.cycle_selection(true),
            KeyCode::Enter => Some(Action::Launch),
            KeyCode::Char(_) | KeyCode::Backspace => self.edit_text(key),
            _ => None,
        }
    }

    fn handle_discovering_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::CancelDiscovery),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            _ => None,
        }
    }

    fn handle_launched_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        }
    }

    // ============ DRAWING ============

    fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let (status, color) = match &self.phase {
            Phase::Editing => ("", Color::DarkGray),
            Phase::Discovering => ("discovering clusters", Color::Yellow),
            Phase::Launching => ("starting cluster", Color::Yellow),
            Phase::Launched(_) => ("launched", Color::Green),
        };
        let mut spans = vec![Span::styled(
            " nimbus-pilot ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )];
        if !status.is_empty() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format!("{} {}", self.spinner(), status),
                Style::default().fg(color),
            ));
        }
        if self.has_discovered {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                " existing clusters ",
                Style::default().fg(Color::Black).bg(Color::Green),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_messages(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        if let Some(error) = &self.page_error {
            lines.push(Line::from(vec![
                Span::styled("  ✗ ", Style::default().fg(Color::Red)),
                Span::styled(error.clone(), Style::default().fg(Color::Red)),
            ]));
        }
        if let Some(notice) = &self.notice {
            lines.push(Line::from(vec![
                Span::styled("  ⚠ ", Style::default().fg(Color::Yellow)),
                Span::styled(notice.clone(), Style::default().fg(Color::Yellow)),
            ]));
        }
        if let Some(progress) = &self.progress {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", self.spinner()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(progress.clone(), Style::default().fg(Color::DarkGray)),
            ]));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }

    fn field_line(&self, id: FieldId) -> Vec<Line<'_>> {
        let control = self.form.control(id);
        let focused = self.focus == id && self.phase == Phase::Editing;
        let label_style = if control.error.is_some() {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let mut spans = vec![Span::styled(
            format!("  {:<22}", format!("{}:", id.label())),
            label_style,
        )];

        if !control.enabled {
            let hint = control.hint.as_deref().unwrap_or("-");
            spans.push(Span::styled(
                format!("({})", hint),
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            match control.kind {
                FieldKind::Select => {
                    let label = control
                        .selected_choice()
                        .map(|c| c.label.as_str())
                        .unwrap_or("-");
                    let value_style = if focused {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    spans.push(Span::styled(format!("‹ {} ›", label), value_style));
                    if let Some(detail) = control.selected_choice().and_then(|c| c.detail.as_deref())
                    {
                        if !detail.is_empty() {
                            spans.push(Span::styled(
                                format!("  {}", detail),
                                Style::default().fg(Color::DarkGray),
                            ));
                        }
                    }
                }
                FieldKind::Text | FieldKind::Secret => {
                    let shown = if control.kind == FieldKind::Secret {
                        "*".repeat(control.text.chars().count())
                    } else {
                        control.text.clone()
                    };
                    let value_style = if focused {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    spans.push(Span::styled(shown, value_style));
                    if focused {
                        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
                    }
                }
            }
        }

        let mut lines = vec![Line::from(spans)];
        // Inline error rendered immediately after the control
        if let Some(error) = &control.error {
            lines.push(Line::from(vec![
                Span::raw("      "),
                Span::styled(format!("✗ {}", error), Style::default().fg(Color::Red)),
            ]));
        }
        lines
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for id in self.visible_fields() {
            lines.extend(self.field_line(id));
        }
        let form = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Launch a Cluster ")
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(form, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let help = match self.phase {
            Phase::Discovering => Line::from(vec![
                Span::styled(" [Esc] ", Style::default().fg(Color::Cyan)),
                Span::raw("Cancel discovery"),
            ]),
            _ => Line::from(vec![
                Span::styled(" [Tab] ", Style::default().fg(Color::Cyan)),
                Span::raw("Next field"),
                Span::raw("  "),
                Span::styled(" [←→] ", Style::default().fg(Color::Cyan)),
                Span::raw("Change"),
                Span::raw("  "),
                Span::styled(" [^D] ", Style::default().fg(Color::Cyan)),
                Span::raw("Discover"),
                Span::raw("  "),
                Span::styled(" [^R] ", Style::default().fg(Color::Cyan)),
                Span::raw("Placement"),
                Span::raw("  "),
                Span::styled(" [Enter] ", Style::default().fg(Color::Green)),
                Span::raw("Launch"),
                Span::raw("  "),
                Span::styled(" [Esc] ", Style::default().fg(Color::Cyan)),
                Span::raw("Quit"),
            ]),
        };
        frame.render_widget(Paragraph::new(help), area);
    }

    fn draw_launched(&self, frame: &mut Frame, area: Rect, destination: &str) {
        let content = Paragraph::new(vec![
            Line::raw(""),
            Line::styled(
                "  Cluster launch accepted!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            Line::from(vec![
                Span::styled("     Cluster: ", Style::default().fg(Color::DarkGray)),
                Span::styled(self.current_cluster_name(), Style::default().fg(Color::Cyan)),
            ]),
            Line::from(vec![
                Span::styled("     Monitor: ", Style::default().fg(Color::DarkGray)),
                Span::styled(destination.to_string(), Style::default().fg(Color::Cyan)),
            ]),
            Line::raw(""),
            Line::styled(
                "  Follow the monitor URL to watch the cluster come up.",
                Style::default().fg(Color::DarkGray),
            ),
            Line::raw(""),
            Line::from(vec![
                Span::styled(" [Enter] ", Style::default().fg(Color::Green)),
                Span::raw("Exit"),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(content, area);
    }
}

impl Component for LaunchComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match &self.phase {
            Phase::Editing => self.handle_editing_key(key),
            Phase::Discovering => self.handle_discovering_key(key),
            Phase::Launching => None,
            Phase::Launched(_) => self.handle_launched_key(key),
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if let Action::Tick = action {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Length(3), // Page-level messages
            Constraint::Min(14),   // Form
            Constraint::Length(1), // Help
        ])
        .split(area);

        self.draw_header(frame, layout[0]);
        self.draw_messages(frame, layout[1]);
        if let Phase::Launched(destination) = self.phase.clone() {
            self.draw_launched(frame, layout[2], &destination);
        } else {
            self.draw_form(frame, layout[2]);
        }
        self.draw_footer(frame, layout[3]);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clouds() -> Vec<CloudInfo> {
        vec![
            CloudInfo {
                id: 1,
                name: "Amazon EC2".into(),
                default: true,
            },
            CloudInfo {
                id: 2,
                name: "OpenStack".into(),
                default: false,
            },
        ]
    }

    fn component() -> LaunchComponent {
        LaunchComponent::new(clouds(), Some("AKIA".into()), Some("secret".into()))
    }

    #[test]
    fn default_cloud_is_preselected() {
        let c = component();
        assert_eq!(c.selected_cloud_id(), Some(1));
        assert!(c.selected_cloud_is_default());
    }

    #[test]
    fn discovery_without_credentials_makes_no_call() {
        let mut c = LaunchComponent::new(clouds(), None, None);
        assert!(!c.begin_discovery());
        assert_eq!(c.notice.as_deref(), Some(hints::ENTER_CREDENTIALS));
        // Still editing, nothing disabled
        assert_eq!(c.phase, Phase::Editing);
        assert!(c.form.control(FieldId::ClusterName).enabled);
    }

    #[test]
    fn discovery_without_cloud_stays_editable() {
        let mut c = LaunchComponent::new(vec![], Some("AKIA".into()), Some("secret".into()));
        assert_eq!(c.selected_cloud_id(), None);
        assert!(!c.begin_discovery());
        // The gate refused before touching the form
        assert_eq!(c.phase, Phase::Editing);
        assert!(c.form.control(FieldId::ClusterName).enabled);
        assert!(c.form.control(FieldId::Password).enabled);
        assert!(c.notice.is_some());
    }

    #[test]
    fn explicit_placement_without_cloud_prompts_instead_of_fetching() {
        let mut c = LaunchComponent::new(vec![], Some("AKIA".into()), Some("secret".into()));
        c.form.control_mut(FieldId::ClusterName).text = "bar".into();
        assert!(!c.resolve_placement(PlacementTrigger::Explicit));
        let control = c.form.control(FieldId::Placement);
        assert_eq!(control.hint.as_deref(), Some(hints::FILL_AND_REFRESH));
        assert_ne!(control.hint.as_deref(), Some(hints::FETCHING));
    }

    #[test]
    fn discovery_on_default_cloud_warns_once() {
        let mut c = component();
        assert!(c.begin_discovery());
        assert!(c.notice.as_deref().unwrap_or("").contains("images"));
        assert_eq!(c.phase, Phase::Discovering);

        c.on_discovery_done(DiscoveryOutcome::Empty);
        assert!(c.begin_discovery());
        // Second run replaces the caution with nothing
        assert!(c.notice.is_none());
    }

    #[test]
    fn discovery_result_populates_cache_and_indicator() {
        let mut c = component();
        c.begin_discovery();
        c.on_discovery_done(DiscoveryOutcome::Clusters(vec![DiscoveredCluster {
            cluster_name: "foo".into(),
            placement: Some("us-east-1a".into()),
        }]));
        assert!(c.has_discovered);
        assert_eq!(c.phase, Phase::Editing);
        assert_eq!(c.form.selected_label(FieldId::ClusterName), Some("foo"));
        // The cached entry now resolves with no live fetch needed
        assert!(!c.resolve_placement(PlacementTrigger::Implicit));
        assert_eq!(
            c.form.selected_label(FieldId::Placement),
            Some("us-east-1a")
        );
    }

    #[test]
    fn editing_credentials_drops_the_cache() {
        let mut c = component();
        c.begin_discovery();
        c.on_discovery_done(DiscoveryOutcome::Clusters(vec![DiscoveredCluster {
            cluster_name: "foo".into(),
            placement: Some("us-east-1a".into()),
        }]));
        c.focus = FieldId::AccessKey;
        c.edit_text(KeyEvent::from(KeyCode::Char('x')));
        assert!(!c.has_discovered);
        assert!(c.cluster_cache.is_empty());
        assert_eq!(c.form.control(FieldId::ClusterName).kind, FieldKind::Text);
    }

    #[test]
    fn explicit_placement_miss_requests_live_fetch() {
        let mut c = component();
        c.form.control_mut(FieldId::ClusterName).text = "bar".into();
        assert!(c.resolve_placement(PlacementTrigger::Explicit));
        assert_eq!(
            c.form.control(FieldId::Placement).hint.as_deref(),
            Some(hints::FETCHING)
        );
        assert!(!c.resolve_placement(PlacementTrigger::Implicit));
        assert_eq!(
            c.form.control(FieldId::Placement).hint.as_deref(),
            Some(hints::FILL_AND_REFRESH)
        );
    }

    #[test]
    fn launch_rejection_restores_editable_form() {
        let mut c = component();
        c.begin_launch();
        assert_eq!(c.phase, Phase::Launching);
        c.on_launch_done(LaunchOutcome::Rejected {
            error: String::new(),
            field_errors: vec![("instance_type".into(), "required".into())],
        });
        assert_eq!(c.phase, Phase::Editing);
        assert!(c.form.control(FieldId::ClusterName).enabled);
        assert_eq!(
            c.form.control(FieldId::InstanceType).error.as_deref(),
            Some("required")
        );
        assert!(c.page_error.is_some());
    }

    #[test]
    fn successful_launch_reaches_terminal_state() {
        let mut c = component();
        c.begin_launch();
        c.on_launch_done(LaunchOutcome::Redirected("/monitor/42".into()));
        assert_eq!(c.phase, Phase::Launched("/monitor/42".into()));
    }
}
