use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Storage;
use crate::error::{Error, Result};
use crate::story::{Batch, BatchUpdate, Story};

/// In-process storage, mostly for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    stories: RwLock<HashMap<String, Story>>,
    batches: RwLock<HashMap<String, Batch>>,
    html: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn story_count(&self) -> usize {
        self.stories.read().await.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_story(&self, story: &Story) -> Result<()> {
        self.stories.write().await.insert(story.id.clone(), story.clone());
        Ok(())
    }

    async fn get_story(&self, id: &str) -> Result<Option<Story>> {
        Ok(self.stories.read().await.get(id).cloned())
    }

    async fn save_batch(&self, batch: &Batch) -> Result<()> {
        self.batches.write().await.insert(batch.id.clone(), batch.clone());
        Ok(())
    }

    async fn get_batch(&self, id: &str) -> Result<Option<Batch>> {
        Ok(self.batches.read().await.get(id).cloned())
    }

    async fn update_batch(&self, id: &str, update: &BatchUpdate) -> Result<Batch> {
        let mut batches = self.batches.write().await;
        let batch = batches
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("batch {id}")))?;
        update.apply(batch);
        Ok(batch.clone())
    }

    async fn write_html(&self, story_id: &str, html: &str) -> Result<()> {
        self.html.write().await.insert(story_id.to_string(), html.to_string());
        Ok(())
    }

    async fn read_html(&self, story_id: &str) -> Result<Option<String>> {
        Ok(self.html.read().await.get(story_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_batch_applies_partial_fields() {
        let storage = MemoryStorage::new();
        storage.save_batch(&Batch::new("batch_1", 4)).await.unwrap();

        let updated = storage
            .update_batch("batch_1", &BatchUpdate { processed: Some(2), ..BatchUpdate::default() })
            .await
            .unwrap();

        assert_eq!(updated.processed, 2);
        assert_eq!(storage.get_batch("batch_1").await.unwrap().unwrap().processed, 2);
    }

    #[tokio::test]
    async fn update_of_missing_batch_is_not_found() {
        let err = MemoryStorage::new()
            .update_batch("batch_missing", &BatchUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn saving_a_story_twice_overwrites() {
        let storage = MemoryStorage::new();
        let mut story = Story::processing("story_1", "https://example.com");
        storage.save_story(&story).await.unwrap();
        story.fail(&Error::NoContent);
        storage.save_story(&story).await.unwrap();

        assert_eq!(storage.story_count().await, 1);
        assert!(storage.get_story("story_1").await.unwrap().unwrap().status.is_terminal());
    }
}
