//! JSON-on-disk storage.
//!
//! Layout under the root directory:
//!
//! ```text
//! stories/<story id>.json
//! batches/<batch id>.json
//! html/<story id>.html
//! ```
//!
//! Records are written to a temporary file and renamed into place, so a
//! reader never sees a half-written record.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::Storage;
use crate::error::{Error, Result};
use crate::story::{is_valid_id, Batch, BatchUpdate, Story};

/// Filesystem-backed [`Storage`].
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    // Serializes read-modify-write of batch records.
    batch_lock: Mutex<()>,
}

impl FileStorage {
    /// Open (and create if needed) a storage root.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for dir in ["stories", "batches", "html"] {
            fs::create_dir_all(root.join(dir)).await?;
        }
        debug!(root = %root.display(), "file storage opened");
        Ok(Self {
            root,
            batch_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, dir: &str, id: &str, ext: &str) -> Result<PathBuf> {
        if !is_valid_id(id) {
            return Err(Error::Validation(format!("invalid record id: {id:?}")));
        }
        Ok(self.root.join(dir).join(format!("{id}.{ext}")))
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize + Sync>(&self, dir: &str, id: &str, value: &T) -> Result<()> {
        let path = self.path(dir, id, "json")?;
        let json = serde_json::to_vec_pretty(value)?;
        Self::write_atomic(&path, &json).await
    }

    async fn read_json<T: DeserializeOwned>(&self, dir: &str, id: &str) -> Result<Option<T>> {
        let path = self.path(dir, id, "json")?;
        match Self::read_optional(&path).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| Error::Storage(format!("corrupt record {}: {e}", path.display()))),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn save_story(&self, story: &Story) -> Result<()> {
        self.write_json("stories", &story.id, story).await
    }

    async fn get_story(&self, id: &str) -> Result<Option<Story>> {
        self.read_json("stories", id).await
    }

    async fn save_batch(&self, batch: &Batch) -> Result<()> {
        let _guard = self.batch_lock.lock().await;
        self.write_json("batches", &batch.id, batch).await
    }

    async fn get_batch(&self, id: &str) -> Result<Option<Batch>> {
        self.read_json("batches", id).await
    }

    async fn update_batch(&self, id: &str, update: &BatchUpdate) -> Result<Batch> {
        let _guard = self.batch_lock.lock().await;
        let mut batch: Batch = self
            .read_json("batches", id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("batch {id}")))?;
        update.apply(&mut batch);
        self.write_json("batches", id, &batch).await?;
        Ok(batch)
    }

    async fn write_html(&self, story_id: &str, html: &str) -> Result<()> {
        let path = self.path("html", story_id, "html")?;
        Self::write_atomic(&path, html.as_bytes()).await
    }

    async fn read_html(&self, story_id: &str) -> Result<Option<String>> {
        let path = self.path("html", story_id, "html")?;
        Ok(Self::read_optional(&path)
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::story::StoryStatus;

    #[tokio::test]
    async fn story_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();

        let mut story = Story::processing("story_abc", "https://example.com/a");
        story.complete(Content { title: "Harbour".into(), ..Content::default() });
        storage.save_story(&story).await.unwrap();

        let loaded = storage.get_story("story_abc").await.unwrap().unwrap();
        assert_eq!(loaded, story);
        assert_eq!(loaded.status, StoryStatus::Completed);
        assert!(dir.path().join("stories/story_abc.json").exists());
    }

    #[tokio::test]
    async fn missing_records_are_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();

        assert!(storage.get_story("story_nope").await.unwrap().is_none());
        assert!(storage.read_html("story_nope").await.unwrap().is_none());
        let err = storage.update_batch("batch_nope", &BatchUpdate::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_path_traversal_ids() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();

        let err = storage.get_story("../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(storage.write_html("story_../x", "<p>").await.is_err());
    }

    #[tokio::test]
    async fn batch_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();
        storage.save_batch(&Batch::new("batch_1", 3)).await.unwrap();

        storage
            .update_batch(
                "batch_1",
                &BatchUpdate {
                    processed: Some(2),
                    completed: Some(1),
                    failed: Some(1),
                    story_ids: Some(vec!["story_a".into(), "story_b".into()]),
                },
            )
            .await
            .unwrap();

        let reopened = FileStorage::open(dir.path()).await.unwrap();
        let batch = reopened.get_batch("batch_1").await.unwrap().unwrap();
        assert_eq!((batch.processed, batch.completed, batch.failed), (2, 1, 1));
        assert_eq!(batch.story_ids.len(), 2);
    }

    #[tokio::test]
    async fn html_artifacts_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).await.unwrap();
        storage.write_html("story_abc", "<!DOCTYPE html><p>hi</p>").await.unwrap();
        assert_eq!(storage.read_html("story_abc").await.unwrap().as_deref(), Some("<!DOCTYPE html><p>hi</p>"));
    }
}
