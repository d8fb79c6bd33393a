use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::StorageError;

/// A saved answer store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub draft_id: String,
    /// SHA-256 of the canonical answers JSON, lowercase hex.
    pub etag: String,
    /// RFC 3339 timestamp string.
    pub saved_at: String,
    pub answers: Value,
}

impl DraftRecord {
    /// Stamp `answers` with its etag and the current time.
    pub fn new(draft_id: &str, answers: Value) -> Result<DraftRecord, StorageError> {
        Ok(DraftRecord {
            draft_id: draft_id.to_string(),
            etag: compute_etag(&answers),
            saved_at: now_rfc3339()?,
            answers,
        })
    }

    pub fn summary(&self) -> DraftSummary {
        DraftSummary {
            draft_id: self.draft_id.clone(),
            etag: self.etag.clone(),
            saved_at: self.saved_at.clone(),
        }
    }
}

/// Listing entry: a draft without its answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub draft_id: String,
    pub etag: String,
    pub saved_at: String,
}

/// Compute the etag of an answers document.
///
/// Object keys are sorted before hashing so the etag does not depend on
/// the order answers were entered in.
pub fn compute_etag(answers: &Value) -> String {
    let canonical = canonicalize(answers).to_string();
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

fn canonicalize(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let sorted: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), canonicalize(&map[k])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn now_rfc3339() -> Result<String, StorageError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| StorageError::Backend(format!("cannot format timestamp: {}", e)))
}

/// Reject ids that are empty or contain anything but `[A-Za-z0-9_-]`.
pub fn validate_draft_id(draft_id: &str) -> Result<(), StorageError> {
    let valid = !draft_id.is_empty()
        && draft_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidDraftId {
            draft_id: draft_id.to_string(),
        })
    }
}

/// The optimistic-concurrency check shared by the backends.
pub(crate) fn check_etag(
    draft_id: &str,
    expected: Option<&str>,
    current: Option<&DraftRecord>,
) -> Result<(), StorageError> {
    match expected {
        None => Ok(()),
        Some(expected) if current.map(|c| c.etag.as_str()) == Some(expected) => Ok(()),
        Some(expected) => Err(StorageError::StaleDraft {
            draft_id: draft_id.to_string(),
            expected: expected.to_string(),
            actual: current.map(|c| c.etag.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn etag_ignores_key_order() {
        let a = json!({"b": 1, "a": {"y": 2, "x": [1, {"q": 1, "p": 2}]}});
        let b = json!({"a": {"x": [1, {"p": 2, "q": 1}], "y": 2}, "b": 1});
        assert_eq!(compute_etag(&a), compute_etag(&b));
        assert_eq!(compute_etag(&a).len(), 64);
        assert_ne!(compute_etag(&a), compute_etag(&json!({"b": 2})));
    }

    #[test]
    fn new_record_has_parseable_timestamp() {
        let rec = DraftRecord::new("d1", json!({"x": 1})).unwrap();
        assert!(OffsetDateTime::parse(&rec.saved_at, &Rfc3339).is_ok());
        assert_eq!(rec.summary().etag, rec.etag);
    }

    #[test]
    fn draft_ids() {
        assert!(validate_draft_id("jane-doe_2024").is_ok());
        assert!(validate_draft_id("").is_err());
        assert!(validate_draft_id("../etc").is_err());
        assert!(validate_draft_id("a b").is_err());
    }
}
