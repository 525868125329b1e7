//! Configuration for Floorpulse
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use uuid::Uuid;

/// Floorpulse - NFC tap dance tracker backend
///
/// Attendees carry NFC chips; tapping a chip against a phone registers a
/// user or logs a mutual dance handshake. This service owns the user
/// directory, the append-only interaction log, and the feedback store.
#[derive(Parser, Debug, Clone)]
#[command(name = "floorpulse")]
#[command(about = "NFC tap dance tracker backend")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Handshake window in minutes
    ///
    /// Two taps of the same pair further apart than this are treated as
    /// independent handshake attempts.
    #[arg(long, env = "WINDOW_MINUTES", default_value = "10")]
    pub window_minutes: i64,

    /// Number of most-recent log rows the admin aggregation scans
    #[arg(long, env = "ADMIN_LOG_LIMIT", default_value = "2000")]
    pub admin_log_limit: usize,

    /// Path to the feedback template JSON file (ordered question list)
    ///
    /// When unset, the feedback survey is served empty and submissions
    /// are still accepted.
    #[arg(long, env = "FEEDBACK_TEMPLATE")]
    pub feedback_template: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Handshake window as a chrono duration
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.window_minutes)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window_minutes < 1 {
            return Err("WINDOW_MINUTES must be at least 1".to_string());
        }

        if self.admin_log_limit < 1 {
            return Err("ADMIN_LOG_LIMIT must be at least 1".to_string());
        }

        Ok(())
    }
}
