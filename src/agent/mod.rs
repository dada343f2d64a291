//! AI extraction collaborator.
//!
//! An [`ExtractionAgent`] reads a page in three calls: `extract` pulls a
//! draft out of the (pre-filtered) HTML, `review` checks and optionally
//! cleans the draft, and `format` renders the final HTML document.
//! [`AgentProducer`] drives those calls and hands the orchestrator the
//! same [`Content`] shape the heuristic engine produces.

mod openai;

pub use openai::OpenAiAgent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::content::{Content, Heading, Metadata, Quote};
use crate::engine;
use crate::error::{Error, Result};
use crate::fetch::FetchResponse;
use crate::options::ExtractOptions;
use crate::producer::ContentProducer;

/// Default character cap on HTML sent to the agent.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 60_000;

/// Content as exchanged with an agent: everything except derived counts and
/// the rendered HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentContent {
    pub title: String,
    pub text_only: String,
    pub metadata: Metadata,
    pub headings: Vec<Heading>,
    pub quotes: Vec<Quote>,
}

/// Verdict of the review call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub is_valid: bool,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default, rename = "cleanedData")]
    pub cleaned: Option<AgentContent>,
}

/// What to do when the review call itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewPolicy {
    /// Keep the unreviewed draft and log a warning.
    #[default]
    PassThrough,
    /// Fail the story.
    Reject,
}

/// The three-call extraction contract.
#[async_trait]
pub trait ExtractionAgent: Send + Sync {
    async fn extract(&self, html: &str, url: &str) -> Result<AgentContent>;

    async fn review(&self, draft: &AgentContent, url: &str) -> Result<Review>;

    /// Render the reviewed content as a complete HTML document.
    async fn format(&self, reviewed: &AgentContent, url: &str) -> Result<String>;
}

/// Result of one agent run.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    pub content: Content,
    /// `None` when the review was skipped after a failure.
    pub quality_score: Option<f64>,
}

/// [`ContentProducer`] backed by an [`ExtractionAgent`].
pub struct AgentProducer<A> {
    agent: A,
    policy: ReviewPolicy,
    max_input_chars: usize,
    options: ExtractOptions,
}

impl<A: ExtractionAgent> AgentProducer<A> {
    #[must_use]
    pub fn new(agent: A) -> Self {
        Self {
            agent,
            policy: ReviewPolicy::default(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            options: ExtractOptions::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ReviewPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Run extract, review and format for one page.
    pub async fn run(&self, html: &str, url: &str) -> Result<AgentOutcome> {
        let prepared = engine::prepare_for_agent(html, self.max_input_chars, &self.options);
        if prepared.is_empty() {
            return Err(Error::NoContent);
        }

        let draft = self.agent.extract(&prepared, url).await?;
        let (reviewed, quality_score) = match self.agent.review(&draft, url).await {
            Ok(review) if review.is_valid => {
                debug!(url = %url, score = ?review.quality_score, "agent review passed");
                (review.cleaned.unwrap_or(draft), review.quality_score)
            }
            Ok(review) => {
                return Err(Error::ExtractionError(format!(
                    "agent review rejected the extraction (score {:?})",
                    review.quality_score
                )));
            }
            Err(err) => match self.policy {
                ReviewPolicy::PassThrough => {
                    warn!(url = %url, error = %err, "agent review failed; keeping unreviewed extraction");
                    (draft, None)
                }
                ReviewPolicy::Reject => {
                    return Err(Error::ExtractionError(format!("agent review failed: {err}")));
                }
            },
        };

        if reviewed.text_only.trim().is_empty() {
            return Err(Error::NoContent);
        }
        let html_structured = self.agent.format(&reviewed, url).await?;

        let title = Some(reviewed.title)
            .filter(|t| !t.trim().is_empty())
            .or_else(|| reviewed.metadata.title.clone())
            .unwrap_or_else(|| "Untitled".to_string());
        let mut content = Content {
            title,
            text_only: reviewed.text_only,
            html_structured,
            metadata: reviewed.metadata,
            headings: reviewed.headings,
            quotes: reviewed.quotes,
            ..Content::default()
        };
        content.refresh_counts(self.options.words_per_minute);

        Ok(AgentOutcome { content, quality_score })
    }
}

#[async_trait]
impl<A: ExtractionAgent> ContentProducer for AgentProducer<A> {
    async fn produce(&self, page: &FetchResponse) -> Result<Content> {
        self.run(&page.html, &page.final_url).await.map(|outcome| outcome.content)
    }
}
