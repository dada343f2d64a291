//! Document generation from extracted content.
//!
//! A [`DesignApi`] starts a render job and reports its status;
//! [`DocumentGenerator`] starts the job and polls until it reaches a
//! terminal state or the poll budget runs out.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::content::Content;
use crate::error::{Error, Result};

/// Wait between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls before giving up (about five minutes at the default interval).
pub const MAX_POLLS: u32 = 60;

/// Options for one generation job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub theme_id: Option<String>,
    /// e.g. `pdf` or `presentation`.
    pub output_format: Option<String>,
    pub logo_url: Option<String>,
}

/// A finished document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub doc_id: String,
    pub doc_url: String,
    pub pdf_url: Option<String>,
}

/// Status of a generation job as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationStatus {
    Pending,
    Completed(GeneratedDocument),
    Failed(String),
}

/// Remote design/document API.
#[async_trait]
pub trait DesignApi: Send + Sync {
    /// Submit a job and return its id.
    async fn start(&self, content: &Content, request: &GenerationRequest) -> Result<String>;

    async fn status(&self, job_id: &str) -> Result<GenerationStatus>;
}

/// Starts generation jobs and polls them to completion.
pub struct DocumentGenerator<D> {
    api: D,
    interval: Duration,
    max_polls: u32,
}

impl<D: DesignApi> DocumentGenerator<D> {
    #[must_use]
    pub fn new(api: D) -> Self {
        Self {
            api,
            interval: POLL_INTERVAL,
            max_polls: MAX_POLLS,
        }
    }

    #[must_use]
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.interval = interval;
        self.max_polls = max_polls;
        self
    }

    /// Generate a document for `content`.
    ///
    /// # Errors
    /// [`Error::GenerationFailed`] when the job reports failure,
    /// [`Error::GenerationTimedOut`] when no terminal status is seen within
    /// the poll budget.
    pub async fn generate(&self, content: &Content, request: &GenerationRequest) -> Result<GeneratedDocument> {
        let job_id = self.api.start(content, request).await?;
        info!(job_id = %job_id, title = %content.title, "document generation started");

        for poll in 1..=self.max_polls {
            tokio::time::sleep(self.interval).await;
            match self.api.status(&job_id).await {
                Ok(GenerationStatus::Pending) => debug!(job_id = %job_id, poll, "generation pending"),
                Ok(GenerationStatus::Completed(document)) => {
                    info!(job_id = %job_id, poll, doc_id = %document.doc_id, "document generated");
                    return Ok(document);
                }
                Ok(GenerationStatus::Failed(reason)) => return Err(Error::GenerationFailed(reason)),
                Err(err) if err.is_transient() => {
                    warn!(job_id = %job_id, poll, error = %err, "status poll failed");
                }
                Err(err) => return Err(err),
            }
        }

        Err(Error::GenerationTimedOut(self.max_polls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedApi {
        /// Poll number on which the job finishes; `None` never finishes.
        done_on: Option<u32>,
        fail: bool,
        polls: AtomicU32,
    }

    impl ScriptedApi {
        fn new(done_on: Option<u32>, fail: bool) -> Self {
            Self { done_on, fail, polls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl DesignApi for ScriptedApi {
        async fn start(&self, _content: &Content, _request: &GenerationRequest) -> Result<String> {
            Ok("job-1".into())
        }

        async fn status(&self, job_id: &str) -> Result<GenerationStatus> {
            let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if poll == 1 {
                return Err(Error::Network("connection reset".into()));
            }
            match self.done_on {
                Some(n) if poll >= n && self.fail => Ok(GenerationStatus::Failed("theme not found".into())),
                Some(n) if poll >= n => Ok(GenerationStatus::Completed(GeneratedDocument {
                    doc_id: job_id.to_string(),
                    doc_url: "https://docs.example/job-1".into(),
                    pdf_url: Some("https://docs.example/job-1.pdf".into()),
                })),
                _ => Ok(GenerationStatus::Pending),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_until_completed() {
        let generator = DocumentGenerator::new(ScriptedApi::new(Some(4), false));
        let started = tokio::time::Instant::now();

        let document = generator.generate(&Content::default(), &GenerationRequest::default()).await.unwrap();

        assert_eq!(document.doc_id, "job-1");
        assert_eq!(generator.api.polls.load(Ordering::SeqCst), 4);
        assert!(started.elapsed() >= POLL_INTERVAL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_is_generation_failed() {
        let generator = DocumentGenerator::new(ScriptedApi::new(Some(2), true));
        let err = generator.generate(&Content::default(), &GenerationRequest::default()).await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailed(ref reason) if reason == "theme not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_poll_budget() {
        let generator = DocumentGenerator::new(ScriptedApi::new(None, false));
        let started = tokio::time::Instant::now();

        let err = generator.generate(&Content::default(), &GenerationRequest::default()).await.unwrap_err();

        assert!(matches!(err, Error::GenerationTimedOut(60)));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(generator.api.polls.load(Ordering::SeqCst), MAX_POLLS);
        assert!(started.elapsed() >= Duration::from_secs(300));
    }
}
