//! Feedback survey
//!
//! An externally authored, ordered question template plus one answer record
//! per user. Re-submitting updates the existing record in place; the upsert
//! key is the chip ID. The template is an explicit store field loaded at
//! startup, never ambient global state.

pub mod store;

pub use store::FeedbackStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input widget a question renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Textarea,
    Select,
    Scale,
}

/// One question of the feedback template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Choices for select/scale questions
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    /// Grouping header shown above the first question of each category
    #[serde(default)]
    pub category: Option<String>,
}

/// A user's submitted answers, keyed by question id
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub chip_id: String,
    pub answers: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}
