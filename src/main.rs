//! nimbus-pilot: A terminal UI for launching cloud clusters

use clap::Parser;
use color_eyre::Result;
use nimbus_pilot_tui::App;
use nimbus_rs::{LaunchClient, PilotConfig};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

/// nimbus-pilot: Terminal UI for launching cloud clusters
#[derive(Parser, Debug)]
#[command(name = "nimbus-pilot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: <config_dir>/nimbus-pilot/config.yaml)
    #[arg(long)]
    config: Option<String>,

    /// Launch service endpoint, overriding the config file
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Session token sent with every request
    #[arg(short, long)]
    token: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log file path (default: <temp_dir>/nimbus-pilot.log)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging to file (not stdout, which would corrupt TUI)
    let log_path = resolve_log_path(cli.log_file);
    let log_file = File::create(&log_path)?;

    // Build filter: set base level, but quiet down noisy HTTP libraries
    let filter = if cli.debug {
        EnvFilter::from_default_env()
            .add_directive(Level::DEBUG.into())
            .add_directive("hyper=info".parse().unwrap())
            .add_directive("reqwest=info".parse().unwrap())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(true)
                .with_target(false),
        )
        .with(filter)
        .init();

    tracing::info!("Starting nimbus-pilot");

    // An explicit endpoint works without any config file
    let config = match (&cli.endpoint, &cli.config) {
        (Some(endpoint), None) => PilotConfig {
            endpoint: endpoint.clone(),
            token: cli.token.clone(),
            clouds: Vec::new(),
            access_key: None,
            secret_key: None,
        },
        _ => {
            let path = cli.config.as_ref().map(PathBuf::from);
            let mut config = PilotConfig::load(path.as_deref())?;
            if let Some(endpoint) = &cli.endpoint {
                config.endpoint = endpoint.clone();
            }
            if let Some(token) = &cli.token {
                config.token = Some(token.clone());
            }
            config
        }
    };

    tracing::info!(endpoint = %config.endpoint, clouds = config.clouds.len(), "Configuration loaded");

    let client = LaunchClient::from_config(&config)?;

    // Run the TUI
    let mut app = App::new(
        Arc::new(client),
        config.clouds,
        config.access_key,
        config.secret_key,
    );
    app.run().await?;

    tracing::info!("Goodbye!");
    Ok(())
}

/// Resolve the log file path, falling back to the platform temp directory.
fn resolve_log_path(log_file: Option<String>) -> PathBuf {
    match log_file {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join("nimbus-pilot.log"),
    }
}
