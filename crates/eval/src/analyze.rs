//! Static checks over a form document.
//!
//! Finds the authoring mistakes that evaluation would otherwise absorb
//! silently: duplicate ids, conditions that cannot be understood or that
//! reference undeclared fields, and placeholders pointing nowhere.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;
use willsuite_interchange::{json_kind, FieldSchema, FieldType, FormDocument, LeafOp};

use crate::answers::entry_key_for_button;
use crate::template::{placeholders, Format};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    pub message: String,
}

impl Finding {
    fn error(field_id: &str, message: String) -> Self {
        Finding {
            severity: Severity::Error,
            field_id: Some(field_id.to_string()),
            message,
        }
    }

    fn warning(field_id: &str, message: String) -> Self {
        Finding {
            severity: Severity::Warning,
            field_id: Some(field_id.to_string()),
            message,
        }
    }
}

/// Run every check, returning findings in document order.
pub fn analyze_form(form: &FormDocument) -> Vec<Finding> {
    let fields = form.all_fields();
    let mut findings = Vec::new();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for f in &fields {
        *counts.entry(f.id.as_str()).or_default() += 1;
    }
    let mut reported = BTreeSet::new();
    for f in &fields {
        if counts[f.id.as_str()] > 1 && reported.insert(f.id.as_str()) {
            findings.push(Finding::error(
                &f.id,
                format!("field id '{}' is declared {} times", f.id, counts[f.id.as_str()]),
            ));
        }
    }

    let known = known_keys(&fields);
    for f in &fields {
        check_conditions(f, &known, &mut findings);
        check_templates(f, &known, &mut findings);
        if f.field_type.has_options() && f.options.is_empty() {
            findings.push(Finding::warning(
                &f.id,
                format!("{} field has no options", f.field_type.as_str()),
            ));
        }
        if f.field_type == FieldType::Unknown {
            findings.push(Finding::warning(&f.id, "unknown field type".to_string()));
        }
    }
    findings
}

// Field ids plus the answer keys that person-entry buttons write to.
fn known_keys(fields: &[&FieldSchema]) -> BTreeSet<String> {
    let mut keys: BTreeSet<String> = fields.iter().map(|f| f.id.clone()).collect();
    for f in fields {
        if f.field_type == FieldType::Button {
            keys.insert(entry_key_for_button(&f.id));
        }
    }
    keys
}

fn check_conditions(field: &FieldSchema, known: &BTreeSet<String>, findings: &mut Vec<Finding>) {
    let Some(spec) = &field.conditions else {
        return;
    };
    for reason in spec.malformed_reasons() {
        findings.push(Finding::error(
            &field.id,
            format!("malformed condition: {}", reason),
        ));
    }
    for node in spec.nodes() {
        for op in unknown_operators(node) {
            findings.push(Finding::error(
                &field.id,
                format!("unknown condition operator '{}'", op),
            ));
        }
    }
    for referenced in spec.referenced_fields() {
        if !known.contains(referenced) {
            findings.push(Finding::warning(
                &field.id,
                format!("condition references undeclared field '{}'", referenced),
            ));
        }
    }
}

fn unknown_operators(node: &willsuite_interchange::ConditionNode) -> Vec<String> {
    use willsuite_interchange::ConditionNode;
    match node {
        ConditionNode::Leaf {
            op: LeafOp::Other(name),
            ..
        } => vec![name.clone()],
        ConditionNode::Compound { clauses, .. } => {
            clauses.iter().flat_map(unknown_operators).collect()
        }
        _ => Vec::new(),
    }
}

fn check_templates(field: &FieldSchema, known: &BTreeSet<String>, findings: &mut Vec<Finding>) {
    let templates = field
        .clause_template
        .iter()
        .chain(field.options.iter().filter_map(|o| o.clause_template.as_ref()));
    for template in templates {
        let Value::String(template) = template else {
            findings.push(Finding::warning(
                &field.id,
                format!("clause text is {}, not a string; it renders empty", json_kind(template)),
            ));
            continue;
        };
        for ph in placeholders(template) {
            let dotted = ph.path.dotted();
            if !known.contains(ph.path.root()) && !known.contains(&dotted) {
                findings.push(Finding::warning(
                    &field.id,
                    format!("placeholder '{}' refers to undeclared field '{}'", ph.raw, ph.path.root()),
                ));
            }
            if let Some(Format::Other(name)) = &ph.format {
                findings.push(Finding::warning(
                    &field.id,
                    format!("placeholder '{}' uses unknown formatter '{}'", ph.raw, name),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use willsuite_interchange::from_form_json;

    fn analyze(v: serde_json::Value) -> Vec<Finding> {
        analyze_form(&from_form_json(&v).unwrap())
    }

    #[test]
    fn clean_form_has_no_findings() {
        let findings = analyze(json!({
            "formSections": [{"formSection": "S", "fields": [
                {"id": "hasChildren", "type": "radio", "options": ["Yes", "No"]},
                {"id": "kids", "willClauseText": "Kids: {{field:kids}}",
                 "conditions": [{"field": "hasChildren", "operator": "eq", "value": "Yes"}]},
                {"id": "addGuardianButton", "type": "button", "action": "openAddForm"},
                {"id": "g", "willClauseText": "{{field:GuardianData}}"}
            ]}]
        }));
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn reports_duplicates_once() {
        let findings = analyze(json!({
            "formSections": [
                {"formSection": "A", "fields": [{"id": "x"}, {"id": "x"}]},
                {"formSection": "B", "fields": [{"id": "x"}]}
            ]
        }));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].message.contains("3 times"));
    }

    #[test]
    fn reports_condition_problems() {
        let findings = analyze(json!({
            "formSections": [{"formSection": "S", "fields": [
                {"id": "a", "conditions": {"operator": "AND", "clauses": []}},
                {"id": "b", "conditions": [{"field": "ghost", "operator": "eq", "value": 1}]},
                {"id": "c", "conditions": [{"field": "a", "operator": "gte", "value": 1}]}
            ]}]
        }));
        let messages: Vec<(&str, Severity)> = findings
            .iter()
            .map(|f| (f.field_id.as_deref().unwrap(), f.severity))
            .collect();
        assert_eq!(
            messages,
            vec![
                ("a", Severity::Error),
                ("b", Severity::Warning),
                ("c", Severity::Error)
            ]
        );
    }

    #[test]
    fn reports_template_problems() {
        let findings = analyze(json!({
            "formSections": [{"formSection": "S", "fields": [
                {"id": "gift", "type": "radio", "options": [
                    {"value": "Yes", "willClauseText": "I give {{field:gift:amount:inWords}} to {{field:nobody}}"}
                ]},
                {"id": "empty", "type": "checkboxGroup"}
            ]}]
        }));
        let messages: Vec<&str> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("unknown formatter 'inWords'"));
        assert!(messages[1].contains("undeclared field 'nobody'"));
        assert!(messages[2].contains("has no options"));
    }

    #[test]
    fn reports_non_string_clause_text() {
        let findings = analyze(json!({
            "formSections": [{"formSection": "S", "fields": [
                {"id": "bad", "willClauseText": {"en": "x"}},
                {"id": "r", "type": "radio", "options": [{"value": "1", "willClauseText": 5}]}
            ]}]
        }));
        let messages: Vec<(&str, &str)> = findings
            .iter()
            .map(|f| (f.field_id.as_deref().unwrap(), f.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![
                ("bad", "clause text is object, not a string; it renders empty"),
                ("r", "clause text is number, not a string; it renders empty"),
            ]
        );
    }
}
