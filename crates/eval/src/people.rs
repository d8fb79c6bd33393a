//! Helpers for person records: normalisation, naming, listing and the
//! autofill suggestions offered when entering a new person.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};
use willsuite_interchange::FieldSchema;

use crate::answers::AnswerStore;
use crate::value::{is_truthy, scalar_text};

/// Answer keys whose entries feed the name autofill.
pub const AUTOFILL_SOURCES: [&str; 8] = [
    "partnerData",
    "guardianData",
    "executorData",
    "substituteGuardianData",
    "childrenData",
    "trusteeData",
    "professionalExecutorData",
    "professionalTrusteeData",
];

const NAME_PARTS: [&str; 4] = ["title", "firstName", "middleName", "lastName"];
const ADDRESS_PARTS: [&str; 5] = ["address1", "address2", "address3", "postcode", "country"];

/// Strip the dialog prefix from attribute names: `addGuardian_firstName`
/// becomes `firstName`. Only an alphanumeric prefix before the first `_`
/// is removed.
pub fn normalize_person(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .map(|(k, v)| (strip_prefix(k).to_string(), v.clone()))
        .collect()
}

fn strip_prefix(key: &str) -> &str {
    match key.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            rest
        }
        _ => key,
    }
}

fn text_attr<'a>(record: &'a Map<String, Value>, attr: &str) -> Option<&'a str> {
    record
        .get(attr)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Title, first, middle and last name joined with spaces.
pub fn full_name(record: &Map<String, Value>) -> String {
    NAME_PARTS
        .iter()
        .filter_map(|k| text_attr(record, k))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"<name> of <address>"`, the address being its lines, postcode and
/// country joined with `", "` (a single `address` attribute is used when
/// there are no lines). A professional executor or trustee of type `Other`
/// is named by `customFirmName` alone.
pub fn full_name_and_address(record: &Map<String, Value>) -> String {
    let custom_firm = ["professionalExecutorType", "professionalTrusteeType"]
        .iter()
        .any(|k| text_attr(record, k) == Some("Other"));
    if custom_firm {
        if let Some(firm) = text_attr(record, "customFirmName") {
            return firm.to_string();
        }
    }
    let name = full_name(record);
    let mut lines: Vec<&str> = ADDRESS_PARTS
        .iter()
        .filter_map(|k| text_attr(record, k))
        .collect();
    if lines.is_empty() {
        lines.extend(text_attr(record, "address"));
    }
    match lines.join(", ") {
        addr if addr.is_empty() => name,
        addr => format!("{} of {}", name, addr),
    }
}

/// English list: `a`, `a and b`, `a, b, and c`.
pub fn format_list(items: &[String], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{} {} {}", a, conjunction, b),
        [init @ .., last] => format!("{}, {} {}", init.join(", "), conjunction, last),
    }
}

/// Whether a value is a non-empty list whose first entry looks like a
/// person (has a name or title attribute once normalised).
pub fn is_person_list(v: &Value) -> bool {
    match v.as_array().and_then(|items| items.first()) {
        Some(Value::Object(first)) => {
            let first = normalize_person(first);
            ["firstName", "lastName", "title"]
                .iter()
                .any(|k| first.contains_key(*k))
        }
        _ => false,
    }
}

/// A person found anywhere in the answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    /// Answer key the person is stored under.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
    pub record: Map<String, Value>,
}

/// Every person stored in any person list, in answer-key order.
pub fn all_people(answers: &AnswerStore) -> Vec<PersonSummary> {
    let mut out = Vec::new();
    for (key, value) in answers.iter() {
        if !is_person_list(value) {
            continue;
        }
        let Some(items) = value.as_array() else {
            continue;
        };
        for record in items.iter().filter_map(|i| i.as_object()) {
            let record = normalize_person(record);
            out.push(PersonSummary {
                source: key.clone(),
                id: record.get("id").map(scalar_text).filter(|s| !s.is_empty()),
                label: person_label(&record),
                record,
            });
        }
    }
    out
}

fn person_label(record: &Map<String, Value>) -> String {
    let name = ["title", "firstName", "lastName"]
        .iter()
        .filter_map(|k| text_attr(record, k))
        .collect::<Vec<_>>()
        .join(" ");
    if !name.is_empty() {
        return name;
    }
    text_attr(record, "email")
        .map(str::to_string)
        .unwrap_or_else(|| "Person".to_string())
}

/// Distinct name-like strings from the autofill sources, sorted
/// case-insensitively.
pub fn autofill_options(answers: &AnswerStore) -> Vec<String> {
    let mut names = BTreeSet::new();
    for key in AUTOFILL_SOURCES {
        let Some(items) = answers.get(key).and_then(|v| v.as_array()) else {
            continue;
        };
        for entry in items.iter().filter_map(|i| i.as_object()) {
            for value in entry.values().filter_map(|v| v.as_str()) {
                if is_name_like(value) {
                    names.insert(value.trim().to_string());
                }
            }
        }
    }
    let mut out: Vec<String> = names.into_iter().collect();
    out.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    out
}

fn is_name_like(s: &str) -> bool {
    s.chars().count() >= 2
        && s.chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '\'' | '.' | '-'))
        && !s.trim().is_empty()
}

/// Ids of required entry fields that the entry leaves empty.
pub fn missing_required(fields: &[FieldSchema], entry: &Map<String, Value>) -> Vec<String> {
    fields
        .iter()
        .filter(|f| f.required)
        .filter(|f| !entry.get(&f.id).map(is_truthy).unwrap_or(false))
        .map(|f| f.id.clone())
        .collect()
}
