//! Visibility and completion checks for the wizard.
//!
//! A hidden field never blocks progress. A visible section is complete
//! when all of its subfields are; any other visible field is complete
//! unless it is required and its answer is missing.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use willsuite_interchange::{FieldSchema, FieldType, FormDocument, FormSection, Logic};

use crate::answers::AnswerStore;
use crate::condition::evaluate;

/// Whether the field is shown for the current answers.
pub fn is_visible(field: &FieldSchema, answers: &AnswerStore) -> bool {
    let visible = evaluate(field.conditions.as_ref(), answers, Logic::And);
    tracing::trace!(field = %field.id, visible, "visibility");
    visible
}

pub fn is_field_complete(field: &FieldSchema, answers: &AnswerStore) -> bool {
    if !is_visible(field, answers) {
        return true;
    }
    if field.field_type == FieldType::Section {
        return field
            .sub_fields
            .iter()
            .all(|sub| is_field_complete(sub, answers));
    }
    !field.required || answer_satisfies(field.field_type, answers.get(&field.id))
}

fn answer_satisfies(field_type: FieldType, answer: Option<&Value>) -> bool {
    match field_type {
        FieldType::CheckboxGroup => matches!(answer, Some(Value::Array(items)) if !items.is_empty()),
        FieldType::Radio => matches!(answer, Some(Value::String(s)) if !s.trim().is_empty()),
        _ => match answer {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        },
    }
}

pub fn is_section_complete(section: &FormSection, answers: &AnswerStore) -> bool {
    section.fields.iter().all(|f| is_field_complete(f, answers))
}

pub fn is_form_complete(form: &FormDocument, answers: &AnswerStore) -> bool {
    form.form_sections
        .iter()
        .all(|s| is_section_complete(s, answers))
}

/// Ids of visible required fields that still lack an answer, descending
/// into visible sections.
pub fn incomplete_fields(fields: &[FieldSchema], answers: &AnswerStore) -> Vec<String> {
    let mut out = Vec::new();
    collect_incomplete(fields, answers, &mut out);
    out
}

fn collect_incomplete(fields: &[FieldSchema], answers: &AnswerStore, out: &mut Vec<String>) {
    for field in fields {
        if !is_visible(field, answers) {
            continue;
        }
        if field.field_type == FieldType::Section {
            collect_incomplete(&field.sub_fields, answers, out);
        } else if field.required && !answer_satisfies(field.field_type, answers.get(&field.id)) {
            out.push(field.id.clone());
        }
    }
}

/// Visibility of every field in the document, keyed by id.
pub fn field_visibility(form: &FormDocument, answers: &AnswerStore) -> BTreeMap<String, bool> {
    form.all_fields()
        .into_iter()
        .map(|f| (f.id.clone(), is_visible(f, answers)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub index: usize,
    pub title: String,
    pub complete: bool,
    pub incomplete_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormProgress {
    pub sections: Vec<SectionProgress>,
    pub complete: bool,
    /// Index of the first section the user still has to finish.
    pub first_incomplete: Option<usize>,
}

/// Per-section completion summary.
pub fn progress(form: &FormDocument, answers: &AnswerStore) -> FormProgress {
    let sections: Vec<SectionProgress> = form
        .form_sections
        .iter()
        .enumerate()
        .map(|(index, section)| SectionProgress {
            index,
            title: section.title.clone(),
            complete: is_section_complete(section, answers),
            incomplete_fields: incomplete_fields(&section.fields, answers),
        })
        .collect();
    let first_incomplete = sections.iter().find(|s| !s.complete).map(|s| s.index);
    FormProgress {
        complete: first_incomplete.is_none(),
        first_incomplete,
        sections,
    }
}
