//! willsuite-eval: evaluates a will questionnaire against the user's
//! answers.
//!
//! The evaluator consumes a typed [`FormDocument`] (see
//! `willsuite-interchange`) and an [`AnswerStore`], and produces field
//! visibility, completion progress and the rendered will clauses.
//! Evaluation is total: bad conditions hide their field, unresolved
//! placeholders render as their fallback, and both are reported through
//! [`Diagnostics`] instead of failing.

pub mod analyze;
pub mod answers;
pub mod clauses;
pub mod completion;
pub mod condition;
pub mod diagnostics;
pub mod error;
pub mod numeric;
pub mod path;
pub mod people;
pub mod template;
pub mod value;

use std::collections::BTreeMap;

use serde::Serialize;
use willsuite_interchange::{from_form_json, FormDocument};

pub use analyze::{analyze_form, Finding, Severity};
pub use answers::{initial_answers, AnswerStore, PersonRecord};
pub use clauses::{
    aggregate_answers, collect_clauses, collect_clauses_traced, preview_answers, textarea_aliases,
    RenderedClause, UnresolvedPolicy, TEXTAREA_ALIASES,
};
pub use completion::{
    field_visibility, incomplete_fields, is_field_complete, is_form_complete, is_section_complete,
    is_visible, progress, FormProgress, SectionProgress,
};
pub use condition::{evaluate, evaluate_traced};
pub use diagnostics::Diagnostics;
pub use error::EvalError;
pub use path::FieldPath;
pub use template::{
    has_unresolved_placeholder, render, render_traced, render_value, render_value_traced,
};

/// Everything the wizard needs for one set of answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormReport {
    pub visibility: BTreeMap<String, bool>,
    pub progress: FormProgress,
    pub clauses: Vec<RenderedClause>,
    pub diagnostics: Diagnostics,
}

/// Evaluate a form document against answers, both given as JSON.
///
/// This is the top-level entry point used by the CLI. Fails only when the
/// form or the answers do not have the expected top-level shape.
pub fn evaluate_form(
    form: &serde_json::Value,
    answers: &serde_json::Value,
    policy: UnresolvedPolicy,
) -> Result<FormReport, EvalError> {
    let form = from_form_json(form)?;
    let answers = AnswerStore::from_json(answers)?;
    Ok(report(&form, &answers, policy))
}

/// Evaluate an already parsed form.
pub fn report(form: &FormDocument, answers: &AnswerStore, policy: UnresolvedPolicy) -> FormReport {
    let mut diagnostics = Diagnostics::new();
    let clauses = collect_clauses_traced(form, answers, policy, &mut diagnostics);
    FormReport {
        visibility: field_visibility(form, answers),
        progress: progress(form, answers),
        clauses,
        diagnostics,
    }
}
