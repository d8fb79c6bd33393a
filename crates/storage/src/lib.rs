//! Draft persistence for questionnaire answers.
//!
//! [`DraftStorage`] is the backend trait; [`MemoryDraftStorage`] and
//! [`FsDraftStorage`] implement it, and [`conformance`] checks any
//! implementation against the expected behaviour.

pub mod conformance;
mod error;
mod fs;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use fs::FsDraftStorage;
pub use memory::MemoryDraftStorage;
pub use record::{compute_etag, validate_draft_id, DraftRecord, DraftSummary};
pub use traits::DraftStorage;
