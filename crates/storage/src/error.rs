/// All errors that can be returned by a DraftStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No draft is stored under the given id.
    #[error("draft not found: {draft_id}")]
    DraftNotFound { draft_id: String },

    /// The caller's etag does not match the stored draft; someone saved in
    /// between. `actual` is `None` when no draft exists yet.
    #[error("stale draft {draft_id}: expected etag {expected}, found {actual:?}")]
    StaleDraft {
        draft_id: String,
        expected: String,
        actual: Option<String>,
    },

    /// Draft ids are non-empty and limited to `[A-Za-z0-9_-]`.
    #[error("invalid draft id: {draft_id:?}")]
    InvalidDraftId { draft_id: String },

    /// A stored draft could not be encoded or decoded.
    #[error("draft serialization error: {0}")]
    Serialization(String),

    /// A backend-specific storage error (I/O, poisoned lock, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
