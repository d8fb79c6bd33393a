//! Merging of partial form documents.
//!
//! Form documents are maintained as several overlapping JSON files.
//! [`merge_documents`] folds them left to right and then removes
//! duplicate field ids so the result parses into a clean
//! [`FormDocument`](crate::FormDocument).

use std::collections::BTreeSet;

use serde_json::Value;

/// Deep-merge `b` into `a`.
///
/// - Objects merge key-wise, recursively.
/// - Arrays concatenate, skipping elements of `b` whose `id` already
///   appears in `a` (elements without an `id` are always appended).
/// - Any other combination: `b` wins, including an explicit `null`.
///   A key absent from `b` keeps its value from `a`.
pub fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Array(mut left), Value::Array(right)) => {
            for item in right {
                let id = item.get("id").cloned();
                let duplicate = match &id {
                    Some(id) => left.iter().any(|x| x.get("id") == Some(id)),
                    None => false,
                };
                if !duplicate {
                    left.push(item);
                }
            }
            Value::Array(left)
        }
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                let merged = match left.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                left.insert(key, merged);
            }
            Value::Object(left)
        }
        (_, b) => b,
    }
}

/// Drop fields whose id was already seen, in every section and
/// recursively within `subFields`. Fields without an id are dropped too.
pub fn dedup_fields(doc: &mut Value) {
    let Some(sections) = doc.get_mut("formSections").and_then(|s| s.as_array_mut()) else {
        return;
    };
    for section in sections {
        if let Some(fields) = section.get_mut("fields").and_then(|f| f.as_array_mut()) {
            dedup_list(fields);
        }
    }
}

fn dedup_list(fields: &mut Vec<Value>) {
    let mut seen = BTreeSet::new();
    fields.retain(|f| match f.get("id").and_then(|id| id.as_str()) {
        Some(id) => seen.insert(id.to_string()),
        None => false,
    });
    for field in fields.iter_mut() {
        if let Some(subs) = field.get_mut("subFields").and_then(|s| s.as_array_mut()) {
            dedup_list(subs);
        }
    }
}

/// Merge several form documents in order and de-duplicate their fields.
pub fn merge_documents(docs: Vec<Value>) -> Value {
    let mut merged = docs
        .into_iter()
        .fold(Value::Object(serde_json::Map::new()), deep_merge);
    dedup_fields(&mut merged);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_merge_recursively() {
        let merged = deep_merge(
            json!({"formTitle": "A", "meta": {"x": 1, "y": 2}}),
            json!({"formTitle": "B", "meta": {"y": 3}}),
        );
        assert_eq!(merged, json!({"formTitle": "B", "meta": {"x": 1, "y": 3}}));
    }

    #[test]
    fn later_null_replaces_earlier_value() {
        assert_eq!(
            deep_merge(json!({"a": 1, "b": 2}), json!({"a": null})),
            json!({"a": null, "b": 2})
        );
        assert_eq!(deep_merge(json!({"m": {"x": 1}}), json!({"m": null})), json!({"m": null}));
    }

    #[test]
    fn arrays_keep_first_element_per_id() {
        let merged = deep_merge(
            json!([{"id": "a", "label": "first"}, {"id": "b"}]),
            json!([{"id": "a", "label": "second"}, {"id": "c"}, {"note": "no id"}]),
        );
        assert_eq!(
            merged,
            json!([{"id": "a", "label": "first"}, {"id": "b"}, {"id": "c"}, {"note": "no id"}])
        );
    }

    #[test]
    fn dedup_removes_repeated_ids_recursively() {
        let mut doc = json!({
            "formSections": [{
                "formSection": "S",
                "fields": [
                    {"id": "x"},
                    {"id": "x", "label": "dupe"},
                    {"label": "no id"},
                    {"id": "sec", "type": "section", "subFields": [{"id": "y"}, {"id": "y"}]}
                ]
            }]
        });
        dedup_fields(&mut doc);
        assert_eq!(
            doc,
            json!({
                "formSections": [{
                    "formSection": "S",
                    "fields": [
                        {"id": "x"},
                        {"id": "sec", "type": "section", "subFields": [{"id": "y"}]}
                    ]
                }]
            })
        );
    }

    #[test]
    fn merge_documents_folds_in_order() {
        let merged = merge_documents(vec![
            json!({"formTitle": "Draft", "formSections": [{"id": "s1", "fields": [{"id": "a"}]}]}),
            json!({"formTitle": "Final", "formSections": [{"id": "s2", "fields": [{"id": "b"}]}]}),
        ]);
        assert_eq!(merged["formTitle"], json!("Final"));
        assert_eq!(merged["formSections"].as_array().unwrap().len(), 2);
    }
}
