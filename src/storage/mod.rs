//! Persistence of stories, batches and rendered HTML artifacts.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;

use crate::error::Result;
use crate::story::{Batch, BatchUpdate, Story};

/// Storage collaborator used by the orchestrator.
///
/// Saving overwrites any record with the same id.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_story(&self, story: &Story) -> Result<()>;

    async fn get_story(&self, id: &str) -> Result<Option<Story>>;

    async fn save_batch(&self, batch: &Batch) -> Result<()>;

    async fn get_batch(&self, id: &str) -> Result<Option<Batch>>;

    /// Apply a partial update to a stored batch.
    ///
    /// Fails with `NotFound` when no batch has this id.
    async fn update_batch(&self, id: &str, update: &BatchUpdate) -> Result<Batch>;

    /// Store the rendered HTML document for a story.
    async fn write_html(&self, story_id: &str, html: &str) -> Result<()>;

    async fn read_html(&self, story_id: &str) -> Result<Option<String>>;
}
