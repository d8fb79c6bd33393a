use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;
use crate::record::{DraftRecord, DraftSummary};

/// Persistence for in-progress questionnaire answers.
///
/// ## Optimistic concurrency
///
/// Every save returns the stored record with its etag. A caller that wants
/// to overwrite only the version it loaded passes that etag as
/// `expected_etag`; if the stored draft has changed (or no longer exists)
/// the save fails with `StorageError::StaleDraft` and nothing is written.
/// `None` saves unconditionally.
///
/// ## Thread safety
///
/// Implementations must be `Send + Sync + 'static` so one instance can be
/// shared across tasks.
#[async_trait]
pub trait DraftStorage: Send + Sync + 'static {
    /// Store `answers` under `draft_id`, returning the new record.
    async fn save_draft(
        &self,
        draft_id: &str,
        answers: Value,
        expected_etag: Option<&str>,
    ) -> Result<DraftRecord, StorageError>;

    /// Returns `Err(StorageError::DraftNotFound)` if nothing is stored.
    async fn load_draft(&self, draft_id: &str) -> Result<DraftRecord, StorageError>;

    /// All drafts, ordered by id.
    async fn list_drafts(&self) -> Result<Vec<DraftSummary>, StorageError>;

    /// Returns `Err(StorageError::DraftNotFound)` if nothing is stored.
    async fn delete_draft(&self, draft_id: &str) -> Result<(), StorageError>;
}
