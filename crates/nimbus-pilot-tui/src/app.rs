//! Application state and main loop

use crate::action::Action;
use crate::components::{Component, LaunchComponent};
use crate::tui::{self, Tui};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use nimbus_pilot_core::{DiscoveryOutcome, DiscoverySession, LaunchOutcome, POLL_INTERVAL};
use nimbus_rs::{CloudGateway, CloudInfo, DynamicFields, FlavorInfo, KeyPairsResponse, PlacementsResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Results from background gateway calls
#[derive(Debug)]
enum AsyncResult {
    DynamicFields(Result<DynamicFields, String>),
    Flavors(Result<Vec<FlavorInfo>, String>),
    KeyPairs(Result<KeyPairsResponse, String>),
    Placements(Result<PlacementsResponse, String>),
    DiscoveryProgress(String),
    DiscoveryDone(DiscoveryOutcome),
    LaunchDone(LaunchOutcome),
}

/// Main application state
pub struct App {
    /// Whether the application should quit
    should_quit: bool,
    /// Launch form component
    launch: LaunchComponent,
    /// Gateway shared with background tasks
    gateway: Arc<dyn CloudGateway>,
    /// At most one active discovery session
    session: DiscoverySession,
    /// Tick rate for animations (ms)
    tick_rate: Duration,
    /// Channel for async results
    result_rx: mpsc::UnboundedReceiver<AsyncResult>,
    result_tx: mpsc::UnboundedSender<AsyncResult>,
}

impl App {
    pub fn new(
        gateway: Arc<dyn CloudGateway>,
        clouds: Vec<CloudInfo>,
        access_key: Option<String>,
        secret_key: Option<String>,
    ) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            should_quit: false,
            launch: LaunchComponent::new(clouds, access_key, secret_key),
            gateway,
            session: DiscoverySession::default(),
            tick_rate: Duration::from_millis(100),
            result_rx,
            result_tx,
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        // Install panic hook
        tui::install_panic_hook();

        // Initialize terminal
        let mut terminal = tui::init()?;

        // Main loop
        let result = self.main_loop(&mut terminal).await;

        // Restore terminal
        tui::restore()?;

        result
    }

    /// Main event loop
    async fn main_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        // Resolve the preselected cloud's dependent fields on startup
        if self.launch.selected_cloud_id().is_some() {
            self.handle_action(Action::CloudChanged).await?;
        }

        loop {
            terminal.draw(|frame| {
                let _ = self.launch.draw(frame, frame.area());
            })?;

            // Handle events with timeout
            if event::poll(self.tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = self.launch.handle_key_event(key)? {
                            self.handle_action(action).await?;
                        }
                    }
                    Event::Resize(w, h) => {
                        self.handle_action(Action::Resize(w, h)).await?;
                    }
                    _ => {}
                }
            } else {
                // Tick for animations
                self.handle_action(Action::Tick).await?;
            }

            // Check async results (non-blocking)
            while let Ok(result) = self.result_rx.try_recv() {
                self.apply_result(result);
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn apply_result(&mut self, result: AsyncResult) {
        match result {
            AsyncResult::DynamicFields(fields) => {
                // An auto-selected image chains into the flavor fetch
                if let Some(Action::FetchFlavors(image_id)) = self.launch.on_dynamic_fields(fields)
                {
                    self.spawn_flavor_fetch(image_id);
                }
            }
            AsyncResult::Flavors(flavors) => self.launch.on_flavors(flavors),
            AsyncResult::KeyPairs(key_pairs) => self.launch.on_key_pairs(key_pairs),
            AsyncResult::Placements(placements) => self.launch.on_placements(placements),
            AsyncResult::DiscoveryProgress(text) => self.launch.on_discovery_progress(text),
            AsyncResult::DiscoveryDone(outcome) => self.launch.on_discovery_done(outcome),
            AsyncResult::LaunchDone(outcome) => self.launch.on_launch_done(outcome),
        }
    }

    /// Handle an action
    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                // A quit mid-discovery still revokes the remote job
                self.session.cancel();
                self.should_quit = true;
            }
            Action::Tick => {
                if let Some(next) = self.launch.update(Action::Tick)? {
                    Box::pin(self.handle_action(next)).await?;
                }
            }
            Action::Resize(_w, _h) => {
                // Terminal will automatically resize on next draw
            }
            Action::CloudChanged => {
                if let Some(cloud_id) = self.launch.selected_cloud_id() {
                    let gateway = Arc::clone(&self.gateway);
                    let tx = self.result_tx.clone();
                    tokio::spawn(async move {
                        let result = gateway
                            .dynamic_fields(cloud_id)
                            .await
                            .map_err(|e| e.to_string());
                        let _ = tx.send(AsyncResult::DynamicFields(result));
                    });
                }
            }
            Action::FetchFlavors(image_id) => {
                self.spawn_flavor_fetch(image_id);
            }
            Action::FetchKeyPairs => {
                if let Some(query) = self.launch.credential_query() {
                    let gateway = Arc::clone(&self.gateway);
                    let tx = self.result_tx.clone();
                    tokio::spawn(async move {
                        let result = gateway
                            .get_key_pairs(&query)
                            .await
                            .map_err(|e| e.to_string());
                        let _ = tx.send(AsyncResult::KeyPairs(result));
                    });
                }
            }
            Action::ResolvePlacement(trigger) => {
                if self.launch.resolve_placement(trigger)
                    && let Some(query) = self.launch.placement_query()
                {
                    let gateway = Arc::clone(&self.gateway);
                    let tx = self.result_tx.clone();
                    tokio::spawn(async move {
                        let result = gateway
                            .get_placements(&query)
                            .await
                            .map_err(|e| e.to_string());
                        let _ = tx.send(AsyncResult::Placements(result));
                    });
                }
            }
            Action::StartDiscovery => {
                if self.launch.begin_discovery()
                    && let Some(query) = self.launch.credential_query()
                {
                    let cancel = self.session.begin();
                    let gateway = Arc::clone(&self.gateway);
                    let tx = self.result_tx.clone();
                    tokio::spawn(async move {
                        // Forward poll progress into the event loop
                        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
                        let forward_tx = tx.clone();
                        let forwarder = tokio::spawn(async move {
                            while let Some(text) = progress_rx.recv().await {
                                let _ = forward_tx.send(AsyncResult::DiscoveryProgress(text));
                            }
                        });
                        let outcome = nimbus_pilot_core::run_discovery(
                            gateway.as_ref(),
                            &query,
                            &cancel,
                            POLL_INTERVAL,
                            &progress_tx,
                        )
                        .await;
                        drop(progress_tx);
                        let _ = forwarder.await;
                        let _ = tx.send(AsyncResult::DiscoveryDone(outcome));
                    });
                }
            }
            Action::CancelDiscovery => {
                self.session.cancel();
                self.launch.discovery_cancel_requested();
            }
            Action::Launch => {
                if let Some(request) = self.launch.launch_request() {
                    self.launch.begin_launch();
                    let gateway = Arc::clone(&self.gateway);
                    let tx = self.result_tx.clone();
                    tokio::spawn(async move {
                        let outcome =
                            nimbus_pilot_core::submit_launch(gateway.as_ref(), &request).await;
                        let _ = tx.send(AsyncResult::LaunchDone(outcome));
                    });
                }
            }
        }
        Ok(())
    }

    fn spawn_flavor_fetch(&self, image_id: i64) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = gateway.get_flavors(image_id).await.map_err(|e| e.to_string());
            let _ = tx.send(AsyncResult::Flavors(result));
        });
    }
}
