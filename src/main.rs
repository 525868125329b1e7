//! Floorpulse - NFC tap dance tracker backend

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floorpulse::{config::Args, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("floorpulse={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  Floorpulse - dance tracker backend");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Handshake window: {} min", args.window_minutes);
    info!("Admin log scan limit: {}", args.admin_log_limit);
    info!("======================================");

    // Create application state
    let state = server::AppState::new(args.clone());

    // Load the feedback survey template, if configured
    if let Some(ref path) = args.feedback_template {
        match state.feedback.load_template(path) {
            Ok(count) => info!("Feedback survey: {} questions", count),
            Err(e) => {
                // A broken template should not keep taps from being logged
                warn!("Feedback template failed to load (continuing without): {}", e);
            }
        }
    } else {
        info!("Feedback survey: no template configured");
    }

    let state = Arc::new(state);

    // Run the server
    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
