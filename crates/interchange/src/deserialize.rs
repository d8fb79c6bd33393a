//! Deserialization of form documents.
//!
//! The main entry point is [`from_form_json`], which takes a
//! `&serde_json::Value` and produces a [`FormDocument`].

use std::path::Path;

use crate::types::{json_kind, FormDocument};

/// Errors while reading a form document.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The document is not a JSON object.
    #[error("form document must be a JSON object, got {kind}")]
    NotAnObject { kind: String },

    /// The document has no `formSections` array.
    #[error("form document missing required field: 'formSections'")]
    MissingSections,

    /// A section or field does not match the expected shape.
    #[error("invalid form document: {0}")]
    Invalid(String),

    /// The file could not be read.
    #[error("cannot read form document '{path}': {message}")]
    Io { path: String, message: String },
}

/// Deserialize a form document from JSON.
///
/// Unknown keys are ignored. Conditions are parsed leniently and never
/// cause an error; structural problems such as a non-array `fields` do.
pub fn from_form_json(doc: &serde_json::Value) -> Result<FormDocument, SchemaError> {
    let obj = doc.as_object().ok_or_else(|| SchemaError::NotAnObject {
        kind: json_kind(doc).to_string(),
    })?;
    if !obj
        .get("formSections")
        .map(|s| s.is_array())
        .unwrap_or(false)
    {
        return Err(SchemaError::MissingSections);
    }
    serde_json::from_value(doc.clone()).map_err(|e| SchemaError::Invalid(e.to_string()))
}

/// Read and deserialize a form document from a file.
pub fn load_form(path: &Path) -> Result<FormDocument, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let doc: serde_json::Value = serde_json::from_str(&text).map_err(|e| SchemaError::Io {
        path: path.display().to_string(),
        message: format!("invalid JSON: {}", e),
    })?;
    from_form_json(&doc)
}
