//! Extraction output records.
//!
//! [`Content`] is the one shape every content producer returns, whether the
//! heuristic engine or an extraction agent built it.

use serde::{Deserialize, Serialize};

use crate::normalize;

/// Page-level metadata. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
}

impl Metadata {
    /// Whether no field was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A heading under the content node, `level` in `1..=6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// A block quote with its optional citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub cite: Option<String>,
}

/// Extracted story content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub title: String,
    pub text_only: String,
    pub html_structured: String,
    pub word_count: usize,
    pub estimated_read_time: String,
    pub metadata: Metadata,
    pub headings: Vec<Heading>,
    pub quotes: Vec<Quote>,
}

impl Content {
    /// Recompute `word_count` and `estimated_read_time` from `text_only`.
    ///
    /// Producers that receive text from elsewhere (an extraction agent, a
    /// reviewer's cleaned copy) call this so the derived fields never drift.
    pub fn refresh_counts(&mut self, words_per_minute: usize) {
        self.word_count = normalize::word_count(&self.text_only);
        self.estimated_read_time = normalize::estimated_read_time(self.word_count, words_per_minute);
    }
}
