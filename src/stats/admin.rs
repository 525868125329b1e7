//! Organizer dashboard aggregation
//!
//! Computed across all users over a bounded tail of the interaction log
//! (the scan limit caps cost; the reconciler itself never scans more than
//! one pair's rows). Cancelled rows are invisible to every metric.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::dance::{DanceStatus, InteractionLog};
use crate::directory::{Role, UserDirectory};
use crate::feedback::FeedbackStore;

/// How many confirmed pairings the live feed shows
const FEED_LIMIT: usize = 5;

/// How many top dancers the leaderboard shows
const LEADERBOARD_LIMIT: usize = 5;

/// Aggregated dashboard payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Total registered users
    pub total_dancers: usize,
    /// Unique chips seen in the scanned tail of the log
    pub active_dancers: usize,
    /// Percentage of registered users with the Leader role, rounded
    pub percent_leaders: u32,
    /// Mean of the first 1-5 rating found per feedback record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_vibe: Option<f64>,
    /// Records that yielded a 1-5 rating (unrated submissions not counted)
    pub feedback_count: usize,
    /// Non-cancelled taps in the last hour (Pending counts as activity)
    pub dances_last_hour: usize,
    /// Latest confirmed pairings, newest first
    pub recent_dances: Vec<RecentDance>,
    /// Top dancers by confirmed count, both parties credited
    pub top_dancers: Vec<TopDancer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentDance {
    /// Wall-clock time of the row, "HH:MM"
    pub time: String,
    /// "Ana & Ben"
    pub pair: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopDancer {
    pub alias: String,
    pub role: String,
    pub count: usize,
}

/// Compute the dashboard over the most recent `scan_limit` log rows
pub fn admin_stats(
    directory: &UserDirectory,
    log: &InteractionLog,
    feedback: &FeedbackStore,
    scan_limit: usize,
    now: DateTime<Utc>,
) -> AdminStats {
    let rows = log.recent(scan_limit);
    let one_hour_ago = now - chrono::Duration::hours(1);

    let mut active: HashMap<&str, ()> = HashMap::new();
    let mut confirmed_counts: HashMap<&str, usize> = HashMap::new();
    let mut recent_dances = Vec::new();
    let mut dances_last_hour = 0;

    for row in rows.iter().rev() {
        if row.status == DanceStatus::Cancelled {
            continue;
        }

        active.insert(row.scanner_chip.as_str(), ());
        active.insert(row.target_chip.as_str(), ());

        if row.timestamp > one_hour_ago {
            dances_last_hour += 1;
        }

        if row.status == DanceStatus::Confirmed {
            *confirmed_counts.entry(row.scanner_chip.as_str()).or_default() += 1;
            *confirmed_counts.entry(row.target_chip.as_str()).or_default() += 1;

            if recent_dances.len() < FEED_LIMIT {
                let a = alias_or_unknown(directory, &row.scanner_chip);
                let b = alias_or_unknown(directory, &row.target_chip);
                recent_dances.push(RecentDance {
                    time: row.timestamp.format("%H:%M").to_string(),
                    pair: format!("{} & {}", a, b),
                });
            }
        }
    }

    let mut top_dancers: Vec<TopDancer> = confirmed_counts
        .iter()
        .map(|(&chip, &count)| TopDancer {
            alias: alias_or_unknown(directory, chip),
            role: directory
                .role_of(chip)
                .map(|r| match r {
                    Role::Leader => "Leader".to_string(),
                    Role::Follower => "Follower".to_string(),
                })
                .unwrap_or_else(|| "-".to_string()),
            count,
        })
        .collect();
    // Count descending; alias ascending keeps ties deterministic
    top_dancers.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.alias.cmp(&b.alias)));
    top_dancers.truncate(LEADERBOARD_LIMIT);

    let total_dancers = directory.len();
    let percent_leaders = if total_dancers > 0 {
        ((directory.leader_count() as f64 / total_dancers as f64) * 100.0).round() as u32
    } else {
        0
    };

    let (avg_vibe, feedback_count) = vibe_summary(feedback);

    AdminStats {
        total_dancers,
        active_dancers: active.len(),
        percent_leaders,
        avg_vibe,
        feedback_count,
        dances_last_hour,
        recent_dances,
        top_dancers,
    }
}

fn alias_or_unknown(directory: &UserDirectory, chip: &str) -> String {
    directory
        .alias_of(chip)
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Mean of the first answer per record that parses as a 1-5 rating,
/// rounded to one decimal, plus the count of rated records.
fn vibe_summary(feedback: &FeedbackStore) -> (Option<f64>, usize) {
    let records = feedback.records();

    let mut sum = 0i64;
    let mut rated = 0i64;
    for record in &records {
        let rating = record
            .answers
            .values()
            .find_map(|v| v.trim().parse::<i64>().ok().filter(|n| (1..=5).contains(n)));
        if let Some(n) = rating {
            sum += n;
            rated += 1;
        }
    }

    let avg = if rated > 0 {
        Some(((sum as f64 / rated as f64) * 10.0).round() / 10.0)
    } else {
        None
    };
    (avg, rated as usize)
}
