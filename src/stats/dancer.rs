//! Per-dancer highlight stats
//!
//! Computed over the Confirmed entries of a user's history. Tie-breaks are
//! deterministic: the peak slot prefers the chronologically earliest bucket
//! (weekday, then hour), the favorite partner prefers whoever appears first
//! in the supplied history order.

use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::collections::HashMap;

use crate::dance::{DanceStatus, HistoryEntry};

/// Highlight stats shown once a dancer unlocks them
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DancerStats {
    /// Confirmed dance count
    pub total: usize,
    /// Distinct partner aliases among confirmed dances
    pub unique_partners: usize,
    /// Busiest (weekday, hour) bucket, e.g. "Fri 23:00"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_slot: Option<String>,
    /// Most frequent partner alias
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_partner: Option<String>,
}

/// Compute highlight stats from a history view
pub fn dancer_stats(history: &[HistoryEntry]) -> DancerStats {
    let confirmed: Vec<&HistoryEntry> = history
        .iter()
        .filter(|e| e.status == DanceStatus::Confirmed)
        .collect();

    if confirmed.is_empty() {
        return DancerStats {
            total: 0,
            unique_partners: 0,
            peak_slot: None,
            favorite_partner: None,
        };
    }

    // Slot key: (days from Monday, hour) keeps the tie-break chronological
    let mut slot_counts: HashMap<(u32, u32), (usize, String)> = HashMap::new();
    for entry in &confirmed {
        let key = (
            entry.timestamp.weekday().num_days_from_monday(),
            entry.timestamp.hour(),
        );
        let label = entry.timestamp.format("%a").to_string();
        slot_counts.entry(key).or_insert((0, label)).0 += 1;
    }
    let peak = slot_counts
        .iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then_with(|| b.0.cmp(a.0)))
        .map(|(&(_, hour), (_, label))| format!("{} {}:00", label, hour));

    let mut partner_counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, entry) in confirmed.iter().enumerate() {
        let slot = partner_counts
            .entry(entry.partner_alias.as_str())
            .or_insert((0, idx));
        slot.0 += 1;
    }
    let favorite = partner_counts
        .iter()
        .max_by(|a, b| {
            // Highest count; ties go to the partner encountered first
            a.1 .0.cmp(&b.1 .0).then_with(|| b.1 .1.cmp(&a.1 .1))
        })
        .map(|(alias, _)| alias.to_string());

    DancerStats {
        total: confirmed.len(),
        unique_partners: partner_counts.len(),
        peak_slot: peak,
        favorite_partner: favorite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn entry(row_id: u64, ts: DateTime<Utc>, partner: &str, status: DanceStatus) -> HistoryEntry {
        HistoryEntry {
            row_id,
            timestamp: ts,
            partner_alias: partner.to_string(),
            status,
            is_target: false,
        }
    }

    // 2026-08-28 is a Friday
    fn fri(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, hour, 15, 0).unwrap()
    }

    fn sat(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, hour, 15, 0).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let stats = dancer_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.unique_partners, 0);
        assert!(stats.peak_slot.is_none());
        assert!(stats.favorite_partner.is_none());
    }

    #[test]
    fn test_pending_and_cancelled_excluded() {
        let history = vec![
            entry(1, fri(22), "Ben", DanceStatus::Confirmed),
            entry(2, fri(23), "Cleo", DanceStatus::Pending),
        ];
        let stats = dancer_stats(&history);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.unique_partners, 1);
    }

    #[test]
    fn test_peak_slot_counts_weekday_hour_buckets() {
        let history = vec![
            entry(1, fri(22), "Ben", DanceStatus::Confirmed),
            entry(2, fri(22), "Cleo", DanceStatus::Confirmed),
            entry(3, fri(23), "Ben", DanceStatus::Confirmed),
        ];
        let stats = dancer_stats(&history);
        assert_eq!(stats.peak_slot.as_deref(), Some("Fri 22:00"));
    }

    #[test]
    fn test_peak_slot_tie_goes_to_earliest_bucket() {
        // One dance Fri 23:00, one Sat 01:00 - tie broken chronologically
        let history = vec![
            entry(1, sat(1), "Ben", DanceStatus::Confirmed),
            entry(2, fri(23), "Cleo", DanceStatus::Confirmed),
        ];
        let stats = dancer_stats(&history);
        assert_eq!(stats.peak_slot.as_deref(), Some("Fri 23:00"));
    }

    #[test]
    fn test_favorite_partner_by_count() {
        let history = vec![
            entry(1, fri(21), "Ben", DanceStatus::Confirmed),
            entry(2, fri(22), "Cleo", DanceStatus::Confirmed),
            entry(3, fri(23), "Cleo", DanceStatus::Confirmed),
        ];
        let stats = dancer_stats(&history);
        assert_eq!(stats.favorite_partner.as_deref(), Some("Cleo"));
        assert_eq!(stats.unique_partners, 2);
    }

    #[test]
    fn test_favorite_partner_tie_goes_to_first_encountered() {
        let history = vec![
            entry(3, fri(23), "Cleo", DanceStatus::Confirmed),
            entry(2, fri(22), "Ben", DanceStatus::Confirmed),
        ];
        let stats = dancer_stats(&history);
        assert_eq!(stats.favorite_partner.as_deref(), Some("Cleo"));
    }
}
