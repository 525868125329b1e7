//! Dance interaction tracking
//!
//! The core of the system: an append-only interaction log plus the
//! reconciler that resolves each incoming tap into one of three outcomes
//! (Unregistered / Pending / Confirmed) despite duplicate and out-of-order
//! taps from two independent devices.
//!
//! Row lifecycle: `Pending` either completes the handshake (reverse tap
//! within the window, or a manual confirm) and becomes `Confirmed`, or the
//! initiator cancels it. Both `Confirmed` and `Cancelled` are terminal.
//! A Pending row that outlives the window is simply abandoned - no
//! automatic transition.

pub mod history;
pub mod log;
pub mod reconciler;

pub use history::{user_history, HistoryEntry};
pub use log::{InteractionLog, InteractionRecord};
pub use reconciler::{Reconciler, TapOutcome, TapResult};

use serde::{Deserialize, Serialize};

/// Status of an interaction row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DanceStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl DanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DanceStatus::Pending => "Pending",
            DanceStatus::Confirmed => "Confirmed",
            DanceStatus::Cancelled => "Cancelled",
        }
    }

    /// Terminal rows never transition again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DanceStatus::Pending)
    }
}

/// Unordered chip pair, the key of the log's recency index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: String,
    hi: String,
}

impl PairKey {
    /// Build the key for a pair; tap direction does not matter
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                lo: a.to_string(),
                hi: b.to_string(),
            }
        } else {
            Self {
                lo: b.to_string(),
                hi: a.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_direction_agnostic() {
        assert_eq!(PairKey::new("chipA", "chipB"), PairKey::new("chipB", "chipA"));
        assert_ne!(PairKey::new("chipA", "chipB"), PairKey::new("chipA", "chipC"));
    }

    #[test]
    fn test_status_terminality() {
        assert!(!DanceStatus::Pending.is_terminal());
        assert!(DanceStatus::Confirmed.is_terminal());
        assert!(DanceStatus::Cancelled.is_terminal());
    }
}
