//! Filesystem draft storage: one `<id>.json` file per draft.
//!
//! Writes go to a temporary file that is renamed into place, and a
//! process-wide lock makes the etag check and the write one step.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::record::{check_etag, validate_draft_id, DraftRecord, DraftSummary};
use crate::traits::DraftStorage;

#[derive(Debug)]
pub struct FsDraftStorage {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FsDraftStorage {
    /// Storage rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FsDraftStorage {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, draft_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", draft_id))
    }

    async fn read(&self, draft_id: &str) -> Result<Option<DraftRecord>, StorageError> {
        match tokio::fs::read(self.path_for(draft_id)).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StorageError::Serialization(format!("{}: {}", draft_id, e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&self.path_for(draft_id), e)),
        }
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Backend(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl DraftStorage for FsDraftStorage {
    async fn save_draft(
        &self,
        draft_id: &str,
        answers: Value,
        expected_etag: Option<&str>,
    ) -> Result<DraftRecord, StorageError> {
        validate_draft_id(draft_id)?;
        let _guard = self.write_lock.lock().await;
        let current = self.read(draft_id).await?;
        check_etag(draft_id, expected_etag, current.as_ref())?;

        let record = DraftRecord::new(draft_id, answers)?;
        let bytes = serde_json::to_vec_pretty(&record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;
        let tmp = self.dir.join(format!(".{}.json.tmp", draft_id));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        let path = self.path_for(draft_id);
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        tracing::debug!(draft_id, etag = %record.etag, "draft saved");
        Ok(record)
    }

    async fn load_draft(&self, draft_id: &str) -> Result<DraftRecord, StorageError> {
        validate_draft_id(draft_id)?;
        self.read(draft_id)
            .await?
            .ok_or_else(|| StorageError::DraftNotFound {
                draft_id: draft_id.to_string(),
            })
    }

    async fn list_drafts(&self) -> Result<Vec<DraftSummary>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };
        let mut out = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error(&self.dir, e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(draft_id) = name.strip_suffix(".json") else {
                continue;
            };
            if validate_draft_id(draft_id).is_err() {
                continue;
            }
            match self.read(draft_id).await {
                Ok(Some(record)) => out.push(record.summary()),
                Ok(None) => {}
                Err(e) => tracing::warn!(draft_id, error = %e, "skipping unreadable draft"),
            }
        }
        out.sort_by(|a, b| a.draft_id.cmp(&b.draft_id));
        Ok(out)
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<(), StorageError> {
        validate_draft_id(draft_id)?;
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(draft_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::DraftNotFound {
                draft_id: draft_id.to_string(),
            }),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
