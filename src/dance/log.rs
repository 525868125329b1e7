//! Append-only interaction log
//!
//! Rows are identified by their position (1-based, stable once assigned)
//! and are never re-keyed or deleted. Besides appends, the only permitted
//! mutations are the forward status transition and the timestamp refresh of
//! the duplicate-suppression path.
//!
//! A recency index keyed by unordered chip pair keeps each pair's rows in
//! append order, so the backward scan only walks that pair's rows. The
//! whole reconcile step runs under the single write lock, so two racing
//! taps for the same pair can never both append.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use super::{DanceStatus, PairKey, TapOutcome};
use crate::types::{FloorError, Result};

/// One row of the interaction log
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    /// Positional identity, 1-based, stable for the life of the log
    pub row_id: u64,
    pub timestamp: DateTime<Utc>,
    pub scanner_chip: String,
    pub target_chip: String,
    pub status: DanceStatus,
    /// Date bucket (UTC) the row was created in
    pub session_id: String,
}

struct LogInner {
    rows: Vec<InteractionRecord>,
    /// Unordered pair -> indexes into `rows`, in append order
    pairs: HashMap<PairKey, Vec<usize>>,
}

/// Append-only interaction log with pair-serialized reconciliation
pub struct InteractionLog {
    inner: RwLock<LogInner>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LogInner {
                rows: Vec::new(),
                pairs: HashMap::new(),
            }),
        }
    }

    /// Resolve a tap against the existing rows for this pair.
    ///
    /// Scans the pair's rows newest-first and acts on the first Pending row
    /// inside the window:
    /// - reverse direction: the other party tapped first and is waiting;
    ///   that row becomes Confirmed in place, no new row is appended.
    /// - same direction: this party already tapped; the row's timestamp is
    ///   refreshed to extend its window, no duplicate row is appended.
    ///
    /// With no qualifying row, a fresh Pending row is appended. Scan and
    /// mutation happen under one write lock.
    pub fn reconcile(
        &self,
        scanner: &str,
        target: &str,
        now: DateTime<Utc>,
        window: chrono::Duration,
    ) -> (TapOutcome, u64) {
        let mut inner = self.inner.write().expect("interaction log poisoned");
        // Split the guard so the pair index and the rows borrow separately
        let inner = &mut *inner;

        let key = PairKey::new(scanner, target);
        if let Some(indexes) = inner.pairs.get(&key) {
            for &idx in indexes.iter().rev() {
                let row = &inner.rows[idx];
                if row.status != DanceStatus::Pending || now - row.timestamp > window {
                    continue;
                }

                if row.scanner_chip == target && row.target_chip == scanner {
                    // Handshake complete: the earlier row is confirmed in place
                    let row_id = row.row_id;
                    inner.rows[idx].status = DanceStatus::Confirmed;
                    debug!(row = row_id, scanner, target, "Handshake confirmed");
                    return (TapOutcome::Confirmed, row_id);
                }

                if row.scanner_chip == scanner && row.target_chip == target {
                    // Duplicate tap: refresh the existing row's window
                    let row_id = row.row_id;
                    inner.rows[idx].timestamp = now;
                    debug!(row = row_id, scanner, target, "Duplicate tap suppressed");
                    return (TapOutcome::Pending, row_id);
                }
            }
        }

        let row_id = (inner.rows.len() + 1) as u64;
        let record = InteractionRecord {
            row_id,
            timestamp: now,
            scanner_chip: scanner.to_string(),
            target_chip: target.to_string(),
            status: DanceStatus::Pending,
            session_id: now.date_naive().to_string(),
        };
        let idx = inner.rows.len();
        inner.rows.push(record);
        inner.pairs.entry(key).or_default().push(idx);

        debug!(row = row_id, scanner, target, "New pending dance logged");
        (TapOutcome::Pending, row_id)
    }

    /// Force a Pending row to a terminal status (manual confirm or cancel).
    ///
    /// Rows already Confirmed or Cancelled are rejected rather than
    /// silently rewritten; Confirmed is permanent.
    pub fn resolve(&self, row_id: u64, status: DanceStatus) -> Result<InteractionRecord> {
        debug_assert!(status.is_terminal());

        let mut inner = self.inner.write().expect("interaction log poisoned");
        let idx = row_id
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|&i| i < inner.rows.len())
            .ok_or(FloorError::UnknownRow(row_id))?;

        let row = &mut inner.rows[idx];
        if row.status.is_terminal() {
            return Err(FloorError::RowState(row_id, row.status.as_str()));
        }

        row.status = status;
        Ok(row.clone())
    }

    /// Fetch a single row by id
    pub fn get(&self, row_id: u64) -> Option<InteractionRecord> {
        let inner = self.inner.read().expect("interaction log poisoned");
        row_id
            .checked_sub(1)
            .and_then(|i| inner.rows.get(i as usize).cloned())
    }

    /// Snapshot of the full log in append order
    pub fn rows(&self) -> Vec<InteractionRecord> {
        let inner = self.inner.read().expect("interaction log poisoned");
        inner.rows.clone()
    }

    /// Snapshot of the most recent `limit` rows in append order
    pub fn recent(&self, limit: usize) -> Vec<InteractionRecord> {
        let inner = self.inner.read().expect("interaction log poisoned");
        let start = inner.rows.len().saturating_sub(limit);
        inner.rows[start..].to_vec()
    }

    /// Total rows ever appended
    pub fn len(&self) -> usize {
        self.inner.read().expect("interaction log poisoned").rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InteractionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, 21, 0, 0).unwrap()
    }

    fn window() -> chrono::Duration {
        chrono::Duration::minutes(10)
    }

    #[test]
    fn test_first_tap_appends_pending() {
        let log = InteractionLog::new();
        let (outcome, row_id) = log.reconcile("chipA", "chipB", t0(), window());

        assert_eq!(outcome, TapOutcome::Pending);
        assert_eq!(row_id, 1);
        assert_eq!(log.len(), 1);

        let row = log.get(1).unwrap();
        assert_eq!(row.scanner_chip, "chipA");
        assert_eq!(row.target_chip, "chipB");
        assert_eq!(row.status, DanceStatus::Pending);
        assert_eq!(row.session_id, "2026-08-28");
    }

    #[test]
    fn test_reverse_tap_confirms_in_place() {
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        let (outcome, row_id) =
            log.reconcile("chipB", "chipA", t0() + chrono::Duration::minutes(2), window());

        assert_eq!(outcome, TapOutcome::Confirmed);
        assert_eq!(row_id, 1);
        // No second row; the original row was mutated
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(1).unwrap().status, DanceStatus::Confirmed);
    }

    #[test]
    fn test_duplicate_tap_refreshes_timestamp() {
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        let later = t0() + chrono::Duration::minutes(5);
        let (outcome, row_id) = log.reconcile("chipA", "chipB", later, window());

        assert_eq!(outcome, TapOutcome::Pending);
        assert_eq!(row_id, 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(1).unwrap().timestamp, later);
    }

    #[test]
    fn test_refreshed_window_keeps_handshake_alive() {
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        // 8 minutes in, A taps again; 15 minutes after t0 B answers.
        // Only valid because the duplicate refreshed the row's timestamp.
        log.reconcile("chipA", "chipB", t0() + chrono::Duration::minutes(8), window());
        let (outcome, _) =
            log.reconcile("chipB", "chipA", t0() + chrono::Duration::minutes(15), window());

        assert_eq!(outcome, TapOutcome::Confirmed);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_expired_window_starts_fresh_attempt() {
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        let (outcome, row_id) =
            log.reconcile("chipB", "chipA", t0() + chrono::Duration::minutes(11), window());

        assert_eq!(outcome, TapOutcome::Pending);
        assert_eq!(row_id, 2);
        assert_eq!(log.len(), 2);
        // The orphaned row stays Pending, untouched
        assert_eq!(log.get(1).unwrap().status, DanceStatus::Pending);
    }

    #[test]
    fn test_confirmed_row_does_not_match_again() {
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        log.reconcile("chipB", "chipA", t0() + chrono::Duration::minutes(1), window());

        // A third tap inside the window starts a new attempt
        let (outcome, row_id) =
            log.reconcile("chipA", "chipB", t0() + chrono::Duration::minutes(2), window());
        assert_eq!(outcome, TapOutcome::Pending);
        assert_eq!(row_id, 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_most_recent_qualifying_row_wins() {
        let log = InteractionLog::new();
        // Two orphanable attempts, the second within the window
        log.reconcile("chipA", "chipB", t0(), window());
        log.reconcile("chipB", "chipA", t0() + chrono::Duration::minutes(20), window());
        let (outcome, row_id) =
            log.reconcile("chipA", "chipB", t0() + chrono::Duration::minutes(22), window());

        // Matches row 2 (the recent B->A pending), not the stale row 1
        assert_eq!(outcome, TapOutcome::Confirmed);
        assert_eq!(row_id, 2);
    }

    #[test]
    fn test_independent_pairs_do_not_interfere() {
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        let (outcome, row_id) = log.reconcile("chipA", "chipC", t0(), window());

        assert_eq!(outcome, TapOutcome::Pending);
        assert_eq!(row_id, 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_resolve_pending_row() {
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());

        let row = log.resolve(1, DanceStatus::Confirmed).unwrap();
        assert_eq!(row.status, DanceStatus::Confirmed);

        // Terminal rows reject further transitions
        let err = log.resolve(1, DanceStatus::Cancelled).unwrap_err();
        assert!(matches!(err, FloorError::RowState(1, "Confirmed")));
    }

    #[test]
    fn test_resolve_unknown_row() {
        let log = InteractionLog::new();
        assert!(matches!(
            log.resolve(7, DanceStatus::Cancelled).unwrap_err(),
            FloorError::UnknownRow(7)
        ));
        assert!(matches!(
            log.resolve(0, DanceStatus::Cancelled).unwrap_err(),
            FloorError::UnknownRow(0)
        ));
    }

    #[test]
    fn test_recent_returns_tail() {
        let log = InteractionLog::new();
        for i in 0..5 {
            log.reconcile(&format!("chip{}", i), "chipZ", t0(), window());
        }
        let tail = log.recent(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].row_id, 4);
        assert_eq!(tail[1].row_id, 5);

        assert_eq!(log.recent(100).len(), 5);
    }
}
