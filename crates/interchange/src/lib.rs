//! willsuite-interchange: typed form-document JSON.
//!
//! Provides typed structs for the questionnaire document (sections,
//! fields, options), the lenient condition tree used for field
//! visibility, and the merge routine that folds several partial form
//! documents into one.
//!
//! Consumers parse a form once with [`from_form_json`] (or
//! [`load_form`]) and then hand the typed [`FormDocument`] to the
//! evaluator.

pub mod condition;
pub mod deserialize;
pub mod merge;
pub mod types;

pub use condition::{ConditionNode, ConditionSpec, LeafOp, Logic};
pub use deserialize::{from_form_json, load_form, SchemaError};
pub use merge::{dedup_fields, deep_merge, merge_documents};
pub use types::*;
