//! Will clause collection.
//!
//! Walks the form in order, keeps the visible fields that carry a clause
//! template, and renders each template against the answers plus the
//! aggregated person-list keys (`executorsSection.fullDetails`, ...).

use serde::Serialize;
use serde_json::{Map, Value};
use willsuite_interchange::{FieldSchema, FieldType, FormDocument, Logic};

use crate::answers::AnswerStore;
use crate::condition::evaluate_traced;
use crate::diagnostics::Diagnostics;
use crate::template::{has_unresolved_placeholder, render_value_traced};
use crate::value::{is_truthy, scalar_text};

/// What to do with a rendered clause that still contains a `{{...}}` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    #[default]
    Keep,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedClause {
    /// Title of the wizard step the field belongs to.
    pub section: String,
    pub field_id: String,
    pub text: String,
}

/// Derived keys for every answer holding a list of records:
/// `<key>.fullDetails`, `<key>.relationshipList`, `<key>.nameList` and
/// `<key>.addressList`.
pub fn aggregate_answers(answers: &AnswerStore) -> AnswerStore {
    let mut out = AnswerStore::new();
    for (key, value) in answers.iter() {
        let Some(items) = value.as_array() else {
            continue;
        };
        let entries: Vec<&Map<String, Value>> = items.iter().filter_map(|i| i.as_object()).collect();
        if entries.is_empty() {
            continue;
        }
        let full_details = entries
            .iter()
            .map(|e| entry_details(e))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        out.set(format!("{}.fullDetails", key), Value::String(full_details));
        for (suffix, attr) in [
            ("relationshipList", "relationship"),
            ("nameList", "fullName"),
            ("addressList", "address"),
        ] {
            let joined = entries
                .iter()
                .filter_map(|e| e.get(attr))
                .filter(|v| is_truthy(v))
                .map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ");
            out.set(format!("{}.{}", key, suffix), Value::String(joined));
        }
    }
    out
}

fn entry_details(entry: &Map<String, Value>) -> String {
    if let Some(fd) = entry.get("fullDetails").filter(|v| is_truthy(v)) {
        return scalar_text(fd);
    }
    ["relationship", "fullName", "address"]
        .iter()
        .filter_map(|k| entry.get(*k))
        .filter(|v| is_truthy(v))
        .map(scalar_text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Preview keys that name a textarea inside a section answer:
/// `(key, section, field)`.
pub const TEXTAREA_ALIASES: &[(&str, &str, &str)] = &[
    ("monetaryGiftsSection.fullList", "monetaryGiftsSection", "monetaryGiftsDetails"),
    ("specificGiftsSection.fullList", "specificGiftsSection", "specificGiftsDetails"),
    ("propertyGiftsSection.fullList", "propertyGiftsSection", "propertyGiftsDetails"),
    ("residualGiftsSection.details", "residualGiftsSection", "residualGiftsDetails"),
    ("furtherResidualGiftsSection.details", "furtherResidualGiftsSection", "furtherResidualGiftsDetails"),
    ("charityBenefitSection.details", "charityBenefitSection", "charityBenefitDetails"),
    ("bprTrustSection.details", "bprTrustSection", "bprTrustDetails"),
    ("bprTrustSection.scheduleNumber", "bprTrustSection", "bprTrustScheduleNumber"),
    ("bprTrustSection.terms", "bprTrustSection", "bprTrustTerms"),
    ("propertyTrustSection.propertyDetails", "propertyTrustSection", "propertyTrustDetails"),
    ("propertyTrustSection.scheduleNumber", "propertyTrustSection", "propertyTrustScheduleNumber"),
    ("propertyTrustSection.terms", "propertyTrustSection", "propertyTrustTerms"),
    ("lifeTenantSectionFLIT.details", "lifeTenantSectionFLIT", "lifeTenantDetails"),
    ("beneficiariesSectionFLIT.details", "beneficiariesSectionFLIT", "beneficiariesDetails"),
    (
        "trustEndDistributionSectionFLIT.details",
        "trustEndDistributionSectionFLIT",
        "trustEndDistributionDetails",
    ),
];

/// Alias keys from [`TEXTAREA_ALIASES`] whose section answer holds a
/// non-empty value for the textarea.
pub fn textarea_aliases(answers: &AnswerStore) -> AnswerStore {
    let mut out = AnswerStore::new();
    for (key, section, field) in TEXTAREA_ALIASES {
        let value = answers
            .get(section)
            .and_then(|s| s.as_object())
            .and_then(|s| s.get(*field))
            .filter(|v| is_truthy(v));
        if let Some(v) = value {
            out.set(*key, v.clone());
        }
    }
    out
}

/// The answers with the aggregated keys and textarea aliases laid over
/// them; the store clause templates are rendered against.
pub fn preview_answers(answers: &AnswerStore) -> AnswerStore {
    let mut preview = answers.clone();
    preview.overlay(aggregate_answers(answers));
    preview.overlay(textarea_aliases(answers));
    preview
}

/// Render the clauses of every visible field, in document order.
pub fn collect_clauses(
    form: &FormDocument,
    answers: &AnswerStore,
    policy: UnresolvedPolicy,
) -> Vec<RenderedClause> {
    collect_clauses_traced(form, answers, policy, &mut Diagnostics::new())
}

pub fn collect_clauses_traced(
    form: &FormDocument,
    answers: &AnswerStore,
    policy: UnresolvedPolicy,
    diag: &mut Diagnostics,
) -> Vec<RenderedClause> {
    let preview = preview_answers(answers);
    let mut out = Vec::new();
    for section in &form.form_sections {
        let mut ctx = Collect {
            section: &section.title,
            answers,
            preview: &preview,
            policy,
            diag: &mut *diag,
            out: &mut out,
        };
        ctx.fields(&section.fields);
    }
    tracing::debug!(count = out.len(), "clauses collected");
    out
}

struct Collect<'a> {
    section: &'a str,
    answers: &'a AnswerStore,
    preview: &'a AnswerStore,
    policy: UnresolvedPolicy,
    diag: &'a mut Diagnostics,
    out: &'a mut Vec<RenderedClause>,
}

impl Collect<'_> {
    fn fields(&mut self, fields: &[FieldSchema]) {
        for field in fields {
            if !evaluate_traced(field.conditions.as_ref(), self.answers, Logic::And, self.diag) {
                continue;
            }
            if field.field_type == FieldType::Section {
                self.fields(&field.sub_fields);
                continue;
            }
            let Some(template) = clause_template_for(field, self.answers) else {
                continue;
            };
            let text = render_value_traced(template, self.preview, self.diag);
            if text.trim().is_empty() {
                continue;
            }
            if self.policy == UnresolvedPolicy::Drop && has_unresolved_placeholder(&text) {
                tracing::debug!(field = %field.id, "dropping clause with unresolved placeholder");
                continue;
            }
            self.out.push(RenderedClause {
                section: self.section.to_string(),
                field_id: field.id.clone(),
                text,
            });
        }
    }
}

/// The selected option's template for radio fields, else the field's own.
fn clause_template_for<'a>(field: &'a FieldSchema, answers: &AnswerStore) -> Option<&'a Value> {
    if field.field_type == FieldType::Radio {
        // option values are held as text, so a numeric answer selects "1"
        let selected = answers
            .get(&field.id)
            .filter(|v| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_)))
            .and_then(|v| field.option(&scalar_text(v)))
            .and_then(|o| o.clause_template.as_ref());
        if selected.is_some() {
            return selected;
        }
    }
    field.clause_template.as_ref()
}
