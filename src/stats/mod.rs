//! Derived statistics
//!
//! Read-only aggregations over the interaction log: per-dancer highlight
//! stats and the organizer dashboard. Nothing here mutates state.

pub mod admin;
pub mod dancer;

pub use admin::{admin_stats, AdminStats};
pub use dancer::{dancer_stats, DancerStats};
