//! Typed structs representing the questionnaire form document.
//!
//! Keys follow the camelCase names used by the form JSON
//! (`formSections`, `subFields`, `willClauseText`, ...). Attributes the
//! engine never reads (styling hints, placeholders) are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::ConditionSpec;

/// Name of a JSON value's kind, as used in error messages.
pub fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Top-level form document: an ordered list of wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_title: Option<String>,
    #[serde(default)]
    pub form_sections: Vec<FormSection>,
}

impl FormDocument {
    /// Every field in document order, depth-first through `subFields`
    /// and modal `fields`.
    pub fn all_fields(&self) -> Vec<&FieldSchema> {
        let mut out = Vec::new();
        for section in &self.form_sections {
            for field in &section.fields {
                field.walk(&mut out);
            }
        }
        out
    }

    /// Look up a field by id anywhere in the document.
    pub fn field(&self, id: &str) -> Option<&FieldSchema> {
        self.all_fields().into_iter().find(|f| f.id == id)
    }
}

/// One wizard step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display title, e.g. "Personal Information".
    #[serde(rename = "formSection", default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// The fixed set of field kinds understood by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Email,
    Tel,
    Textarea,
    Radio,
    CheckboxGroup,
    Date,
    Currency,
    Signature,
    Section,
    #[serde(alias = "array")]
    Repeater,
    /// Field definitions for an "add person" dialog.
    ModalFields,
    Button,
    Display,
    Hidden,
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Textarea => "textarea",
            FieldType::Radio => "radio",
            FieldType::CheckboxGroup => "checkboxGroup",
            FieldType::Date => "date",
            FieldType::Currency => "currency",
            FieldType::Signature => "signature",
            FieldType::Section => "section",
            FieldType::Repeater => "repeater",
            FieldType::ModalFields => "modalFields",
            FieldType::Button => "button",
            FieldType::Display => "display",
            FieldType::Hidden => "hidden",
            FieldType::Unknown => "unknown",
        }
    }

    /// Whether the type carries an `options` list.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Radio | FieldType::CheckboxGroup)
    }

    /// Whether the type stores an answer of its own.
    pub fn holds_answer(&self) -> bool {
        !matches!(
            self,
            FieldType::Section | FieldType::ModalFields | FieldType::Button | FieldType::Display
        )
    }
}

/// Schema of a single form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub id: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(rename = "subFields", default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<FieldSchema>,
    /// Entry fields of a `modalFields` block.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<ConditionSpec>,
    /// Clause text. Kept as raw JSON: a non-string template renders empty
    /// instead of rejecting the document.
    #[serde(rename = "willClauseText", default, skip_serializing_if = "Option::is_none")]
    pub clause_template: Option<Value>,
    /// Declared initial value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Button action, e.g. `openAddForm`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl FieldSchema {
    fn walk<'a>(&'a self, out: &mut Vec<&'a FieldSchema>) {
        out.push(self);
        for sub in &self.sub_fields {
            sub.walk(out);
        }
        for sub in &self.fields {
            sub.walk(out);
        }
    }

    /// The option whose value equals `value`, if any.
    pub fn option(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// The clause template when it is a string.
    pub fn clause_text(&self) -> Option<&str> {
        self.clause_template.as_ref().and_then(Value::as_str)
    }
}

/// A radio / checkbox option. Plain scalars in the JSON are accepted and
/// used as both value and label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    /// Clause text used instead of the field's when this option is selected.
    #[serde(rename = "willClauseText", skip_serializing_if = "Option::is_none")]
    pub clause_template: Option<Value>,
}

impl FieldOption {
    /// The clause template when it is a string.
    pub fn clause_text(&self) -> Option<&str> {
        self.clause_template.as_ref().and_then(Value::as_str)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Full {
        value: Value,
        #[serde(default)]
        label: Option<Value>,
        #[serde(rename = "willClauseText", default)]
        clause_template: Option<Value>,
    },
    Plain(Value),
}

impl From<RawOption> for FieldOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Full {
                value,
                label,
                clause_template,
            } => {
                let value = scalar_text(&value);
                let label = label.map(|l| scalar_text(&l)).unwrap_or_else(|| value.clone());
                FieldOption {
                    value,
                    label,
                    clause_template,
                }
            }
            RawOption::Plain(v) => {
                let text = scalar_text(&v);
                FieldOption {
                    value: text.clone(),
                    label: text,
                    clause_template: None,
                }
            }
        }
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
