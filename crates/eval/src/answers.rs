//! The answer store and person records.
//!
//! Answers are a flat mapping from field id to JSON value. Repeating
//! person entries (executors, guardians, children, ...) live under a
//! single key as an array of [`PersonRecord`] objects, each carrying a
//! stable `id` so entries can be edited or removed individually.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use willsuite_interchange::{json_kind, FieldSchema, FieldType, FormDocument};

use crate::error::EvalError;

/// Mapping from field id to the user's answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerStore {
    values: BTreeMap<String, Value>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object.
    pub fn from_json(v: &Value) -> Result<AnswerStore, EvalError> {
        let obj = v.as_object().ok_or_else(|| EvalError::AnswersNotAnObject {
            kind: json_kind(v).to_string(),
        })?;
        Ok(AnswerStore {
            values: obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Copy every entry of `other` over this store.
    pub fn overlay(&mut self, other: AnswerStore) {
        self.values.extend(other.values);
    }

    /// The person records stored under `key`. A missing key is an empty list.
    pub fn people(&self, key: &str) -> Result<Vec<PersonRecord>, EvalError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    PersonRecord::from_json(item).map_err(|_| EvalError::NotAPersonList {
                        key: key.to_string(),
                    })
                })
                .collect(),
            Some(_) => Err(EvalError::NotAPersonList {
                key: key.to_string(),
            }),
        }
    }

    /// Append a person record, assigning an id when it has none.
    /// Returns the record's id.
    pub fn add_person(&mut self, key: &str, mut person: PersonRecord) -> Result<String, EvalError> {
        if person.id.is_empty() {
            person.id = generate_id();
        }
        let id = person.id.clone();
        let list = self.person_list_mut(key)?;
        list.push(person.to_json());
        tracing::debug!(key, id = %id, "person added");
        Ok(id)
    }

    /// Replace the record whose id matches `person.id`.
    pub fn replace_person(&mut self, key: &str, person: PersonRecord) -> Result<(), EvalError> {
        let list = self.person_list_mut(key)?;
        let slot = list
            .iter_mut()
            .find(|item| record_id(item).as_deref() == Some(person.id.as_str()))
            .ok_or_else(|| EvalError::PersonNotFound {
                key: key.to_string(),
                id: person.id.clone(),
            })?;
        *slot = person.to_json();
        Ok(())
    }

    /// Remove and return the record with the given id.
    pub fn remove_person(&mut self, key: &str, id: &str) -> Result<PersonRecord, EvalError> {
        let list = self.person_list_mut(key)?;
        let pos = list
            .iter()
            .position(|item| record_id(item).as_deref() == Some(id))
            .ok_or_else(|| EvalError::PersonNotFound {
                key: key.to_string(),
                id: id.to_string(),
            })?;
        PersonRecord::from_json(&list.remove(pos))
    }

    fn person_list_mut(&mut self, key: &str) -> Result<&mut Vec<Value>, EvalError> {
        let slot = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }
        slot.as_array_mut().ok_or_else(|| EvalError::NotAPersonList {
            key: key.to_string(),
        })
    }
}

impl FromIterator<(String, Value)> for AnswerStore {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        AnswerStore {
            values: iter.into_iter().collect(),
        }
    }
}

/// One entry of a repeating person list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonRecord {
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl PersonRecord {
    /// A new record with a freshly generated id.
    pub fn new(attributes: Map<String, Value>) -> Self {
        PersonRecord {
            id: generate_id(),
            attributes,
        }
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.attributes.get(attr)
    }

    /// Read a record from a JSON object. Numeric ids are accepted and kept
    /// as their decimal text; a missing id is left empty.
    pub fn from_json(v: &Value) -> Result<PersonRecord, EvalError> {
        let obj = v.as_object().ok_or(EvalError::PersonNotAnObject)?;
        let mut attributes = obj.clone();
        let id = attributes
            .remove("id")
            .and_then(|id| match id {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_default();
        Ok(PersonRecord { id, attributes })
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".to_string(), Value::String(self.id.clone()));
        for (k, v) in &self.attributes {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }
}

fn record_id(v: &Value) -> Option<String> {
    match v.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn generate_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

/// Answer key that receives the entries added through a button, e.g.
/// `addGuardianButton` stores into `GuardianData`.
pub fn entry_key_for_button(button_id: &str) -> String {
    let stem = button_id.strip_prefix("add").unwrap_or(button_id);
    match stem.strip_suffix("Button") {
        Some(base) => format!("{}Data", base),
        None => format!("{}Data", stem),
    }
}

/// Initial answers for a fresh questionnaire.
///
/// Checkbox groups start as empty lists, fields declaring a `value` start
/// with it, repeaters start empty, and sections contribute their subfields.
/// Everything else is left absent.
pub fn initial_answers(form: &FormDocument) -> AnswerStore {
    let mut store = AnswerStore::new();
    for section in &form.form_sections {
        seed_fields(&section.fields, &mut store);
    }
    store
}

fn seed_fields(fields: &[FieldSchema], store: &mut AnswerStore) {
    for field in fields {
        match field.field_type {
            FieldType::Section => seed_fields(&field.sub_fields, store),
            FieldType::CheckboxGroup => {
                let initial = match &field.value {
                    Some(v @ Value::Array(_)) => v.clone(),
                    _ => Value::Array(Vec::new()),
                };
                store.set(field.id.clone(), initial);
            }
            FieldType::Repeater => store.set(field.id.clone(), Value::Array(Vec::new())),
            _ if field.field_type.holds_answer() => {
                if let Some(v) = &field.value {
                    store.set(field.id.clone(), v.clone());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use willsuite_interchange::from_form_json;

    fn attrs(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn store_from_json_requires_object() {
        let err = AnswerStore::from_json(&json!([1])).unwrap_err();
        assert!(err.to_string().contains("array"));
        let store = AnswerStore::from_json(&json!({"a": 1})).unwrap();
        assert_eq!(store.get("a"), Some(&json!(1)));
    }

    #[test]
    fn serde_is_transparent() {
        let store: AnswerStore = serde_json::from_value(json!({"x": "y"})).unwrap();
        assert_eq!(serde_json::to_value(&store).unwrap(), json!({"x": "y"}));
    }

    #[test]
    fn add_replace_remove_person() {
        let mut store = AnswerStore::new();
        let id = store
            .add_person(
                "executorsSection",
                PersonRecord::new(attrs(json!({"firstName": "Jane"}))),
            )
            .unwrap();
        assert_eq!(id.len(), 16);
        let second = store
            .add_person(
                "executorsSection",
                PersonRecord::new(attrs(json!({"firstName": "Sam"}))),
            )
            .unwrap();
        assert_ne!(id, second);

        let mut edited = store.people("executorsSection").unwrap()[0].clone();
        edited
            .attributes
            .insert("lastName".to_string(), json!("Doe"));
        store.replace_person("executorsSection", edited).unwrap();
        assert_eq!(
            store.people("executorsSection").unwrap()[0].get("lastName"),
            Some(&json!("Doe"))
        );

        let removed = store.remove_person("executorsSection", &second).unwrap();
        assert_eq!(removed.get("firstName"), Some(&json!("Sam")));
        assert_eq!(store.people("executorsSection").unwrap().len(), 1);
    }

    #[test]
    fn add_person_keeps_existing_id() {
        let mut store = AnswerStore::new();
        let person = PersonRecord {
            id: "p1".to_string(),
            attributes: Map::new(),
        };
        assert_eq!(store.add_person("k", person).unwrap(), "p1");
        assert_eq!(store.get("k"), Some(&json!([{"id": "p1"}])));
    }

    #[test]
    fn person_ops_reject_non_list_keys() {
        let mut store = AnswerStore::from_json(&json!({"name": "Jane"})).unwrap();
        assert!(matches!(
            store.add_person("name", PersonRecord::default()),
            Err(EvalError::NotAPersonList { .. })
        ));
        assert!(matches!(
            store.remove_person("missing", "x"),
            Err(EvalError::PersonNotFound { .. })
        ));
    }

    #[test]
    fn numeric_ids_are_read_as_text() {
        let person = PersonRecord::from_json(&json!({"id": 1700000000000u64, "firstName": "A"}))
            .unwrap();
        assert_eq!(person.id, "1700000000000");
        assert_eq!(person.attributes.len(), 1);
    }

    #[test]
    fn button_entry_keys() {
        assert_eq!(entry_key_for_button("addGuardianButton"), "GuardianData");
        assert_eq!(entry_key_for_button("addExecutorButton"), "ExecutorData");
        assert_eq!(entry_key_for_button("custom"), "customData");
    }

    #[test]
    fn initial_answers_seed_by_type() {
        let form = from_form_json(&json!({
            "formSections": [{
                "formSection": "S",
                "fields": [
                    {"id": "name", "type": "text"},
                    {"id": "purposes", "type": "checkboxGroup", "options": ["a"]},
                    {"id": "country", "type": "text", "value": "England"},
                    {"id": "kids", "type": "array"},
                    {"id": "sec", "type": "section", "subFields": [
                        {"id": "inner", "type": "checkboxGroup", "value": ["x"]}
                    ]},
                    {"id": "note", "type": "display", "value": "ignored"}
                ]
            }]
        }))
        .unwrap();
        let store = initial_answers(&form);
        assert_eq!(
            store.to_json(),
            json!({"purposes": [], "country": "England", "kids": [], "inner": ["x"]})
        );
    }
}
