//! Tap reconciliation
//!
//! Entry point for a single tap event. Validates the parties, then defers
//! to the log's pair-serialized reconcile step. Every outcome here is a
//! normal return value - an unregistered target is an expected result, not
//! a fault.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::{DanceStatus, InteractionLog};
use crate::directory::UserDirectory;
use crate::types::{FloorError, Result};

/// Outcome of a single tap event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TapOutcome {
    /// Target chip is not bound to any user; no row was written
    Unregistered,
    /// A Pending row is waiting for the partner's tap (new or refreshed)
    Pending,
    /// The handshake completed; the earlier row is now Confirmed
    Confirmed,
}

/// Tap outcome plus the row it touched, if any
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TapResult {
    pub status: TapOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<u64>,
}

/// Resolves tap events against the interaction log
pub struct Reconciler {
    directory: Arc<UserDirectory>,
    log: Arc<InteractionLog>,
    window: chrono::Duration,
}

impl Reconciler {
    pub fn new(
        directory: Arc<UserDirectory>,
        log: Arc<InteractionLog>,
        window: chrono::Duration,
    ) -> Self {
        Self {
            directory,
            log,
            window,
        }
    }

    /// Resolve one tap: `scanner` tapped `target`'s chip at `now`.
    ///
    /// Self-taps are rejected outright. An unregistered target yields
    /// `Unregistered` without writing a row. Otherwise the log decides
    /// between handshake completion, duplicate suppression, and a fresh
    /// Pending row (see [`InteractionLog::reconcile`]).
    pub fn log_tap(&self, scanner: &str, target: &str, now: DateTime<Utc>) -> Result<TapResult> {
        if scanner.trim().is_empty() || target.trim().is_empty() {
            return Err(FloorError::InvalidRequest(
                "scannerId and targetId are required".into(),
            ));
        }
        if scanner == target {
            return Err(FloorError::SelfTap);
        }

        if !self.directory.is_registered(target) {
            info!(scanner, target, "Tap against unregistered chip");
            return Ok(TapResult {
                status: TapOutcome::Unregistered,
                row_id: None,
            });
        }

        let (status, row_id) = self.log.reconcile(scanner, target, now, self.window);
        Ok(TapResult {
            status,
            row_id: Some(row_id),
        })
    }

    /// Force a Pending row to Confirmed, bypassing the handshake.
    ///
    /// Used by the target of a row when the automatic reverse-match could
    /// not happen (e.g. one party's scanner is broken). No window check.
    pub fn confirm_manual(&self, row_id: u64) -> Result<()> {
        self.log.resolve(row_id, DanceStatus::Confirmed)?;
        info!(row = row_id, "Dance manually confirmed");
        Ok(())
    }

    /// Retract a Pending row. Used by the initiator for erroneous taps.
    pub fn cancel(&self, row_id: u64) -> Result<()> {
        self.log.resolve(row_id, DanceStatus::Cancelled)?;
        info!(row = row_id, "Pending dance cancelled");
        Ok(())
    }
}
