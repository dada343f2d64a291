//! Single-item and batch pipelines.
//!
//! Every item ends as a persisted [`Story`], completed or failed; item
//! errors never escape [`Orchestrator::process_url`]. Batches run in windows
//! of `concurrency` items, and the batch counters are written after each
//! window has fully resolved.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::error::{Error, FailureInfo, Result};
use crate::fetch::HtmlSource;
use crate::producer::ContentProducer;
use crate::storage::Storage;
use crate::story::{new_batch_id, new_story_id, Batch, BatchProgress, BatchUpdate, Story, StoryStatus};
use crate::url_utils;

/// Final state of one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub story: Story,
    /// Set when the story failed.
    pub failure: Option<FailureInfo>,
}

impl ItemOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.story.status == StoryStatus::Completed
    }
}

/// Result of re-running the failed items of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome {
    pub batch: Batch,
    /// Failed stories that were re-run.
    pub retried: usize,
    /// Of those, how many completed this time.
    pub recovered: usize,
}

/// Runs URLs through fetch, content production and storage.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn HtmlSource>,
    producer: Arc<dyn ContentProducer>,
    storage: Arc<dyn Storage>,
    concurrency: usize,
}

impl Orchestrator {
    /// `concurrency` below 1 is treated as 1.
    #[must_use]
    pub fn new(
        source: Arc<dyn HtmlSource>,
        producer: Arc<dyn ContentProducer>,
        storage: Arc<dyn Storage>,
        concurrency: usize,
    ) -> Self {
        Self {
            source,
            producer,
            storage,
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Process one URL under a fresh story id.
    pub async fn process_url(&self, url: &str) -> ItemOutcome {
        self.process_with_id(&new_story_id(), url).await
    }

    /// Process one URL, storing the outcome under `story_id`.
    ///
    /// An existing story with the same id is overwritten in place.
    pub async fn process_with_id(&self, story_id: &str, url: &str) -> ItemOutcome {
        let mut story = Story::processing(story_id, url);
        self.persist_story(&story).await;

        let failure = match self.run(url).await {
            Ok(content) => {
                if !content.html_structured.is_empty() {
                    if let Err(e) = self.storage.write_html(story_id, &content.html_structured).await {
                        error!(story_id, error = %e, "failed to store html artifact");
                    }
                }
                info!(story_id, url, words = content.word_count, "story completed");
                story.complete(content);
                None
            }
            Err(err) => {
                warn!(story_id, url, kind = %err.kind(), error = %err, "story failed");
                story.fail(&err);
                Some(err.to_failure())
            }
        };

        self.persist_story(&story).await;
        ItemOutcome { story, failure }
    }

    async fn run(&self, url: &str) -> Result<crate::content::Content> {
        let page = self.source.fetch(url).await?;
        self.producer.produce(&page).await
    }

    async fn persist_story(&self, story: &Story) {
        if let Err(e) = self.storage.save_story(story).await {
            error!(story_id = %story.id, error = %e, "failed to save story");
        }
    }

    /// Process `urls` as a new batch.
    ///
    /// # Errors
    /// [`Error::Validation`] for an empty list, or the storage error when the
    /// batch record cannot be created. Item failures are recorded on their
    /// stories instead.
    pub async fn process_batch(&self, urls: &[String]) -> Result<Batch> {
        if urls.is_empty() {
            return Err(Error::Validation("batch has no URLs".into()));
        }
        let mut batch = Batch::new(new_batch_id(), urls.len());
        self.storage.save_batch(&batch).await?;
        info!(
            batch_id = %batch.id,
            urls = urls.len(),
            windows = batch_windows(urls.len(), self.concurrency).len(),
            "batch started"
        );

        for window in urls.chunks(self.concurrency) {
            let outcomes = join_all(window.iter().map(|url| self.process_url(url))).await;

            let mut progress = BatchProgress::default();
            for outcome in &outcomes {
                progress.record(&outcome.story);
            }
            batch.apply_progress(&progress);
            self.persist_progress(&batch).await;
        }

        info!(
            batch_id = %batch.id,
            completed = batch.completed,
            failed = batch.failed,
            "batch finished"
        );
        Ok(batch)
    }

    async fn persist_progress(&self, batch: &Batch) {
        if let Err(e) = self.storage.update_batch(&batch.id, &BatchUpdate::snapshot(batch)).await {
            error!(batch_id = %batch.id, processed = batch.processed, error = %e, "failed to update batch");
        }
    }

    /// Re-run the failed stories of a batch, keeping their ids.
    ///
    /// # Errors
    /// [`Error::NotFound`] when the batch does not exist.
    pub async fn retry_batch(&self, batch_id: &str) -> Result<RetryOutcome> {
        let mut batch = self
            .storage
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("batch {batch_id}")))?;

        let mut failed = Vec::new();
        for id in &batch.story_ids {
            match self.storage.get_story(id).await {
                Ok(Some(story)) if story.status == StoryStatus::Failed => failed.push(story),
                Ok(_) => {}
                Err(e) => error!(batch_id, story_id = %id, error = %e, "failed to load story"),
            }
        }
        info!(batch_id, failed = failed.len(), "retrying failed stories");

        let mut recovered = 0;
        for window in failed.chunks(self.concurrency) {
            let outcomes = join_all(
                window
                    .iter()
                    .map(|story| self.process_with_id(&story.id, &story.original_url)),
            )
            .await;
            recovered += outcomes.iter().filter(|o| o.is_success()).count();
        }

        if recovered > 0 {
            batch.completed += recovered;
            batch.failed = batch.failed.saturating_sub(recovered);
            let update = BatchUpdate {
                completed: Some(batch.completed),
                failed: Some(batch.failed),
                ..BatchUpdate::default()
            };
            if let Err(e) = self.storage.update_batch(batch_id, &update).await {
                error!(batch_id, error = %e, "failed to update batch after retry");
            }
        }

        Ok(RetryOutcome {
            batch,
            retried: failed.len(),
            recovered,
        })
    }
}

/// Window sizes for `total` items at `concurrency` items per window.
#[must_use]
pub fn batch_windows(total: usize, concurrency: usize) -> Vec<usize> {
    let concurrency = concurrency.max(1);
    (0..total)
        .step_by(concurrency)
        .map(|start| concurrency.min(total - start))
        .collect()
}

/// URLs from CSV text: the first column of each row.
///
/// A first row whose first cell is not an http(s) URL is taken as a header
/// and skipped. Blank rows and repeats are dropped; order is kept.
///
/// # Errors
/// [`Error::Validation`] when no URL remains.
pub fn parse_url_list(input: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut first_row = true;

    for record in reader.records() {
        let record = record.map_err(|e| Error::Validation(format!("malformed URL list: {e}")))?;
        let cell = record.get(0).unwrap_or_default().trim_start_matches('\u{feff}').trim();
        if cell.is_empty() {
            continue;
        }
        if std::mem::take(&mut first_row) && !url_utils::is_http_url(cell) {
            continue;
        }
        if seen.insert(cell.to_string()) {
            urls.push(cell.to_string());
        }
    }

    if urls.is_empty() {
        return Err(Error::Validation("no URLs found in input".into()));
    }
    Ok(urls)
}
