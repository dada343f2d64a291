//! Story and batch records.
//!
//! A [`Story`] is one extraction attempt for one URL. A [`Batch`] groups the
//! stories of one bulk submission and carries its running counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::Content;
use crate::error::{Error, ErrorKind};

/// Lifecycle of a story: `Processing` then exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    Processing,
    Completed,
    Failed,
}

impl StoryStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// New story id: `story_` followed by a random UUID.
#[must_use]
pub fn new_story_id() -> String {
    format!("story_{}", Uuid::new_v4().simple())
}

/// New batch id: `batch_` followed by a random UUID.
#[must_use]
pub fn new_batch_id() -> String {
    format!("batch_{}", Uuid::new_v4().simple())
}

/// Whether `id` has the shape produced by [`new_story_id`] or
/// [`new_batch_id`]. Storage uses this before touching the filesystem.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    let suffix = id.strip_prefix("story_").or_else(|| id.strip_prefix("batch_"));
    suffix.is_some_and(|s| !s.is_empty() && s.len() <= 64 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

/// One extraction attempt for a single URL and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub original_url: String,
    pub status: StoryStatus,
    pub extracted_at: DateTime<Utc>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub error: Option<ErrorKind>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Story {
    /// A fresh story in `Processing` state.
    #[must_use]
    pub fn processing(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            original_url: url.into(),
            status: StoryStatus::Processing,
            extracted_at: Utc::now(),
            content: None,
            error: None,
            error_message: None,
        }
    }

    /// Move to `Completed` with the extracted content.
    pub fn complete(&mut self, content: Content) {
        self.status = StoryStatus::Completed;
        self.extracted_at = Utc::now();
        self.content = Some(content);
        self.error = None;
        self.error_message = None;
    }

    /// Move to `Failed`, recording the error kind and message.
    pub fn fail(&mut self, err: &Error) {
        self.status = StoryStatus::Failed;
        self.extracted_at = Utc::now();
        self.content = None;
        self.error = Some(err.kind());
        self.error_message = Some(err.to_string());
    }
}

/// A set of URLs submitted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub total_urls: usize,
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    pub story_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    #[must_use]
    pub fn new(id: impl Into<String>, total_urls: usize) -> Self {
        Self {
            id: id.into(),
            total_urls,
            processed: 0,
            completed: 0,
            failed: 0,
            story_ids: Vec::with_capacity(total_urls),
            created_at: Utc::now(),
        }
    }

    /// Whether every submitted URL has a terminal story.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.processed >= self.total_urls
    }

    /// Counter update for one finished window.
    pub fn apply_progress(&mut self, progress: &BatchProgress) {
        self.processed += progress.processed;
        self.completed += progress.completed;
        self.failed += progress.failed;
        self.story_ids.extend(progress.story_ids.iter().cloned());
    }
}

/// Partial update to a stored batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdate {
    pub processed: Option<usize>,
    pub completed: Option<usize>,
    pub failed: Option<usize>,
    pub story_ids: Option<Vec<String>>,
}

impl BatchUpdate {
    /// Full counter snapshot of `batch`.
    #[must_use]
    pub fn snapshot(batch: &Batch) -> Self {
        Self {
            processed: Some(batch.processed),
            completed: Some(batch.completed),
            failed: Some(batch.failed),
            story_ids: Some(batch.story_ids.clone()),
        }
    }

    /// Apply the set fields to `batch`.
    pub fn apply(&self, batch: &mut Batch) {
        if let Some(processed) = self.processed {
            batch.processed = processed;
        }
        if let Some(completed) = self.completed {
            batch.completed = completed;
        }
        if let Some(failed) = self.failed {
            batch.failed = failed;
        }
        if let Some(ids) = &self.story_ids {
            batch.story_ids.clone_from(ids);
        }
    }
}

/// Outcome counts of one concurrency window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
    pub story_ids: Vec<String>,
}

impl BatchProgress {
    pub fn record(&mut self, story: &Story) {
        self.processed += 1;
        match story.status {
            StoryStatus::Completed => self.completed += 1,
            StoryStatus::Failed => self.failed += 1,
            StoryStatus::Processing => {}
        }
        self.story_ids.push(story.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let a = new_story_id();
        let b = new_story_id();
        assert!(a.starts_with("story_"));
        assert_ne!(a, b);
        assert!(new_batch_id().starts_with("batch_"));
        assert!(is_valid_id(&a));
    }

    #[test]
    fn rejects_path_like_ids() {
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id("story_"));
        assert!(!is_valid_id("story_a/b"));
        assert!(!is_valid_id("other_abc"));
    }

    #[test]
    fn story_transitions() {
        let mut story = Story::processing("story_1", "https://example.com");
        assert!(!story.status.is_terminal());

        story.fail(&Error::RateLimited("example.com".into()));
        assert_eq!(story.status, StoryStatus::Failed);
        assert_eq!(story.error, Some(ErrorKind::RateLimited));
        assert!(story.error_message.is_some());

        story.complete(Content::default());
        assert_eq!(story.status, StoryStatus::Completed);
        assert_eq!(story.error, None);
        assert!(story.content.is_some());
    }

    #[test]
    fn story_serializes_with_camel_case_and_wire_kinds() {
        let mut story = Story::processing("story_1", "https://example.com");
        story.fail(&Error::InvalidUrl("ftp://x".into()));
        let json = serde_json::to_value(&story).unwrap();

        assert_eq!(json["originalUrl"], "https://example.com");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "INVALID_URL");
        assert!(json.get("extractedAt").is_some());
    }

    #[test]
    fn batch_progress_accumulates() {
        let mut batch = Batch::new("batch_1", 3);
        let mut progress = BatchProgress::default();

        let mut ok = Story::processing("story_a", "https://a.example");
        ok.complete(Content::default());
        let mut bad = Story::processing("story_b", "https://b.example");
        bad.fail(&Error::NoContent);
        progress.record(&ok);
        progress.record(&bad);
        batch.apply_progress(&progress);

        assert_eq!((batch.processed, batch.completed, batch.failed), (2, 1, 1));
        assert_eq!(batch.story_ids, vec!["story_a", "story_b"]);
        assert!(!batch.is_finished());
    }

    #[test]
    fn batch_update_applies_only_set_fields() {
        let mut batch = Batch::new("batch_1", 2);
        BatchUpdate { completed: Some(2), ..BatchUpdate::default() }.apply(&mut batch);
        assert_eq!(batch.completed, 2);
        assert_eq!(batch.processed, 0);
    }
}
