//! Feedback store
//!
//! Holds the question template and the per-user answer records. One record
//! per chip; later submissions replace the earlier answers rather than
//! appending.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::info;

use super::{FeedbackRecord, Question};
use crate::types::{FloorError, Result};

/// Feedback store with concurrent access
pub struct FeedbackStore {
    /// Ordered survey template; swapped wholesale on reload
    template: RwLock<Arc<Vec<Question>>>,
    /// chip ID -> latest submitted record
    records: DashMap<String, FeedbackRecord>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self {
            template: RwLock::new(Arc::new(Vec::new())),
            records: DashMap::new(),
        }
    }

    /// Load the question template from a JSON file, replacing any previous
    /// template. Returns the number of questions loaded.
    pub fn load_template(&self, path: &Path) -> Result<usize> {
        let raw = std::fs::read_to_string(path)?;
        let questions: Vec<Question> = serde_json::from_str(&raw)
            .map_err(|e| FloorError::Template(format!("{}: {}", path.display(), e)))?;

        let count = questions.len();
        *self.template.write().expect("template lock poisoned") = Arc::new(questions);
        info!(count, path = %path.display(), "Feedback template loaded");
        Ok(count)
    }

    /// Replace the template directly (tests and future admin reload)
    pub fn set_template(&self, questions: Vec<Question>) {
        *self.template.write().expect("template lock poisoned") = Arc::new(questions);
    }

    /// Current template in authored order
    pub fn template(&self) -> Arc<Vec<Question>> {
        Arc::clone(&self.template.read().expect("template lock poisoned"))
    }

    /// Upsert a user's answers. Returns true when this was the user's first
    /// submission.
    pub fn submit(&self, chip_id: &str, answers: BTreeMap<String, String>) -> Result<bool> {
        if chip_id.trim().is_empty() {
            return Err(FloorError::InvalidRequest("chipId is required".into()));
        }

        let record = FeedbackRecord {
            chip_id: chip_id.to_string(),
            answers,
            timestamp: chrono::Utc::now(),
        };

        let created = self.records.insert(chip_id.to_string(), record).is_none();
        info!(chip = chip_id, created, "Feedback stored");
        Ok(created)
    }

    /// Whether the user has submitted feedback
    pub fn has_feedback(&self, chip_id: &str) -> bool {
        self.records.contains_key(chip_id)
    }

    /// Number of users who submitted feedback
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Snapshot of all records, for admin aggregation
    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.records.iter().map(|r| r.clone()).collect()
    }
}

impl Default for FeedbackStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::QuestionKind;

    fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_submit_is_upsert() {
        let store = FeedbackStore::new();
        let created = store
            .submit("chipA", answers(&[("vibe", "5"), ("comments", "great")]))
            .unwrap();
        assert!(created);
        assert!(store.has_feedback("chipA"));
        assert_eq!(store.count(), 1);

        let created = store.submit("chipA", answers(&[("vibe", "3")])).unwrap();
        assert!(!created);
        assert_eq!(store.count(), 1);

        let records = store.records();
        assert_eq!(records[0].answers.get("vibe").unwrap(), "3");
        assert!(records[0].answers.get("comments").is_none());
    }

    #[test]
    fn test_empty_chip_rejected() {
        let store = FeedbackStore::new();
        assert!(store.submit("  ", answers(&[])).is_err());
    }

    #[test]
    fn test_template_parse_from_json() {
        let store = FeedbackStore::new();
        let json = r#"[
            {"id": "vibe", "label": "Overall vibe?", "type": "scale",
             "options": ["1", "2", "3", "4", "5"], "required": true,
             "category": "The Party"},
            {"id": "comments", "label": "Anything else?", "type": "textarea"}
        ]"#;
        let questions: Vec<Question> = serde_json::from_str(json).unwrap();
        store.set_template(questions);

        let template = store.template();
        assert_eq!(template.len(), 2);
        assert_eq!(template[0].id, "vibe");
        assert_eq!(template[0].kind, QuestionKind::Scale);
        assert!(template[0].required);
        assert_eq!(template[1].kind, QuestionKind::Textarea);
        assert!(!template[1].required);
        assert!(template[1].category.is_none());
    }

    #[test]
    fn test_template_default_empty() {
        let store = FeedbackStore::new();
        assert!(store.template().is_empty());
    }
}
