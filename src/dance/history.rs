//! History derivation
//!
//! Per-user view of the interaction log: newest first, Cancelled rows
//! excluded, partner chips resolved to display aliases. `is_target` tells
//! the client which affordance to offer on a Pending row - the target may
//! confirm, the initiator may cancel.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DanceStatus, InteractionLog};
use crate::directory::UserDirectory;

/// One row of a user's history view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub row_id: u64,
    pub timestamp: DateTime<Utc>,
    /// Partner's display alias, or "Unknown" if the partner chip was never
    /// registered (an unregistered scanner can initiate rows)
    pub partner_alias: String,
    pub status: DanceStatus,
    /// True when this user did not initiate; the target side holds the
    /// confirm action for Pending rows
    pub is_target: bool,
}

/// Derive a user's history, newest first
pub fn user_history(
    log: &InteractionLog,
    directory: &UserDirectory,
    chip_id: &str,
) -> Vec<HistoryEntry> {
    let mut history = Vec::new();

    for row in log.rows().iter().rev() {
        if row.status == DanceStatus::Cancelled {
            continue;
        }

        let is_target = row.target_chip == chip_id;
        if !is_target && row.scanner_chip != chip_id {
            continue;
        }

        let partner_chip = if is_target {
            &row.scanner_chip
        } else {
            &row.target_chip
        };

        history.push(HistoryEntry {
            row_id: row.row_id,
            timestamp: row.timestamp,
            partner_alias: directory
                .alias_of(partner_chip)
                .unwrap_or_else(|| "Unknown".to_string()),
            status: row.status,
            is_target,
        });
    }

    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{NewUser, Role};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, 21, 0, 0).unwrap()
    }

    fn window() -> chrono::Duration {
        chrono::Duration::minutes(10)
    }

    fn directory() -> UserDirectory {
        let dir = UserDirectory::new();
        for (chip, alias) in [("chipA", "Ana"), ("chipB", "Ben"), ("chipC", "Cleo")] {
            dir.register(NewUser {
                chip_id: chip.to_string(),
                user_key: "KEY".to_string(),
                alias: alias.to_string(),
                full_name: format!("{} Surname", alias),
                email: format!("{}@example.com", alias),
                role: Role::Leader,
                ig_handle: String::new(),
                consent: true,
            })
            .unwrap();
        }
        dir
    }

    #[test]
    fn test_is_target_tracks_initiation() {
        let dir = directory();
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());

        let for_target = user_history(&log, &dir, "chipB");
        assert_eq!(for_target.len(), 1);
        assert!(for_target[0].is_target);
        assert_eq!(for_target[0].partner_alias, "Ana");

        let for_scanner = user_history(&log, &dir, "chipA");
        assert_eq!(for_scanner.len(), 1);
        assert!(!for_scanner[0].is_target);
        assert_eq!(for_scanner[0].partner_alias, "Ben");
    }

    #[test]
    fn test_cancelled_rows_hidden_from_both_parties() {
        let dir = directory();
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        log.resolve(1, DanceStatus::Cancelled).unwrap();

        assert!(user_history(&log, &dir, "chipA").is_empty());
        assert!(user_history(&log, &dir, "chipB").is_empty());
    }

    #[test]
    fn test_newest_first_and_filtered_to_user() {
        let dir = directory();
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        log.reconcile("chipB", "chipC", t0() + chrono::Duration::minutes(1), window());
        log.reconcile("chipA", "chipC", t0() + chrono::Duration::minutes(2), window());

        let history = user_history(&log, &dir, "chipA");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].row_id, 3);
        assert_eq!(history[0].partner_alias, "Cleo");
        assert_eq!(history[1].row_id, 1);

        // chipB sees its own two rows, not chipA/chipC's
        let history_b = user_history(&log, &dir, "chipB");
        assert_eq!(history_b.len(), 2);
        assert_eq!(history_b[0].row_id, 2);
    }

    #[test]
    fn test_unregistered_partner_is_unknown() {
        let dir = directory();
        let log = InteractionLog::new();
        // chipX never registered but initiated a row against chipB
        log.reconcile("chipX", "chipB", t0(), window());

        let history = user_history(&log, &dir, "chipB");
        assert_eq!(history[0].partner_alias, "Unknown");
    }

    #[test]
    fn test_confirmed_handshake_single_entry_each() {
        let dir = directory();
        let log = InteractionLog::new();
        log.reconcile("chipA", "chipB", t0(), window());
        log.reconcile("chipB", "chipA", t0() + chrono::Duration::minutes(2), window());

        for chip in ["chipA", "chipB"] {
            let history = user_history(&log, &dir, chip);
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].status, DanceStatus::Confirmed);
        }
    }
}
