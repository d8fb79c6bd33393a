//! Field paths such as `executorsSection.fullDetails` or `gift:amount`.
//!
//! A path is split on `.` and `:`. The first segment names an answer key;
//! each following segment steps into an object attribute, an array index,
//! or projects an attribute over every element of an array.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::answers::AnswerStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a path; `None` when it is blank.
    pub fn parse(raw: &str) -> Option<FieldPath> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(FieldPath {
            segments: raw
                .split(['.', ':'])
                .map(|s| s.trim().to_string())
                .collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The answer key the path starts from.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Segments joined with `.`.
    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Resolve against the answers.
    ///
    /// A multi-segment path whose dotted spelling is itself an answer key
    /// resolves to that key first. Otherwise the segments are walked; a
    /// missing step or a step through `null` or a scalar yields `None`.
    pub fn resolve<'a>(&self, answers: &'a AnswerStore) -> Option<Cow<'a, Value>> {
        if self.segments.len() > 1 {
            if let Some(flat) = answers.get(&self.dotted()) {
                return Some(Cow::Borrowed(flat));
            }
        }
        let mut current = Cow::Borrowed(answers.get(self.root())?);
        for segment in &self.segments[1..] {
            current = step(current, segment)?;
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

fn step<'a>(current: Cow<'a, Value>, segment: &str) -> Option<Cow<'a, Value>> {
    match current {
        Cow::Borrowed(v) => child(v, segment),
        Cow::Owned(v) => child(&v, segment).map(|c| Cow::Owned(c.into_owned())),
    }
}

fn child<'a>(v: &'a Value, segment: &str) -> Option<Cow<'a, Value>> {
    match v {
        Value::Object(map) => map.get(segment).map(Cow::Borrowed),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => items.get(index).map(Cow::Borrowed),
            Err(_) => {
                // project the attribute over every element
                let projected = items
                    .iter()
                    .filter_map(|item| item.get(segment))
                    .filter(|x| !x.is_null())
                    .cloned()
                    .collect();
                Some(Cow::Owned(Value::Array(projected)))
            }
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(v: Value) -> AnswerStore {
        AnswerStore::from_json(&v).unwrap()
    }

    fn resolve(path: &str, answers: &AnswerStore) -> Option<Value> {
        FieldPath::parse(path)
            .unwrap()
            .resolve(answers)
            .map(|c| c.into_owned())
    }

    #[test]
    fn splits_on_dot_and_colon() {
        let p = FieldPath::parse("gift:amount.value").unwrap();
        assert_eq!(p.segments(), &["gift", "amount", "value"]);
        assert_eq!(p.root(), "gift");
        assert_eq!(p.to_string(), "gift.amount.value");
        assert!(FieldPath::parse("  ").is_none());
    }

    #[test]
    fn walks_objects_and_indices() {
        let a = store(json!({
            "gift": {"amount": 100},
            "kids": [{"name": "A"}, {"name": "B"}]
        }));
        assert_eq!(resolve("gift.amount", &a), Some(json!(100)));
        assert_eq!(resolve("kids.1.name", &a), Some(json!("B")));
        assert_eq!(resolve("kids.5", &a), None);
        assert_eq!(resolve("gift.amount.deeper", &a), None);
        assert_eq!(resolve("missing.x", &a), None);
    }

    #[test]
    fn projects_attributes_over_arrays() {
        let a = store(json!({
            "kids": [{"name": "A"}, {"age": 3}, {"name": null}, {"name": "C"}]
        }));
        assert_eq!(resolve("kids.name", &a), Some(json!(["A", "C"])));
        assert_eq!(resolve("kids.name.0", &a), Some(json!("A")));
    }

    #[test]
    fn null_stops_resolution() {
        let a = store(json!({"x": null}));
        assert_eq!(resolve("x", &a), Some(Value::Null));
        assert_eq!(resolve("x.y", &a), None);
    }

    #[test]
    fn flat_key_takes_precedence() {
        let a = store(json!({
            "executorsSection": [{"fullDetails": "Jane Doe"}],
            "executorsSection.fullDetails": "Jane Doe, Sam Roe"
        }));
        assert_eq!(
            resolve("executorsSection:fullDetails", &a),
            Some(json!("Jane Doe, Sam Roe"))
        );
    }
}
