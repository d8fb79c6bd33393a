use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::record::{check_etag, validate_draft_id, DraftRecord, DraftSummary};
use crate::traits::DraftStorage;

/// Process-local draft storage, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryDraftStorage {
    drafts: Mutex<BTreeMap<String, DraftRecord>>,
}

impl MemoryDraftStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, DraftRecord>>, StorageError> {
        self.drafts
            .lock()
            .map_err(|_| StorageError::Backend("draft store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DraftStorage for MemoryDraftStorage {
    async fn save_draft(
        &self,
        draft_id: &str,
        answers: Value,
        expected_etag: Option<&str>,
    ) -> Result<DraftRecord, StorageError> {
        validate_draft_id(draft_id)?;
        let mut drafts = self.lock()?;
        check_etag(draft_id, expected_etag, drafts.get(draft_id))?;
        let record = DraftRecord::new(draft_id, answers)?;
        drafts.insert(draft_id.to_string(), record.clone());
        Ok(record)
    }

    async fn load_draft(&self, draft_id: &str) -> Result<DraftRecord, StorageError> {
        validate_draft_id(draft_id)?;
        self.lock()?
            .get(draft_id)
            .cloned()
            .ok_or_else(|| StorageError::DraftNotFound {
                draft_id: draft_id.to_string(),
            })
    }

    async fn list_drafts(&self) -> Result<Vec<DraftSummary>, StorageError> {
        Ok(self.lock()?.values().map(DraftRecord::summary).collect())
    }

    async fn delete_draft(&self, draft_id: &str) -> Result<(), StorageError> {
        validate_draft_id(draft_id)?;
        self.lock()?
            .remove(draft_id)
            .map(|_| ())
            .ok_or_else(|| StorageError::DraftNotFound {
                draft_id: draft_id.to_string(),
            })
    }
}
