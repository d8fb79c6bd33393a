//! Condition trees controlling field visibility.
//!
//! Conditions arrive as loosely shaped JSON authored by hand in the form
//! document. Parsing never fails: anything that does not fit the grammar
//! becomes [`ConditionNode::Malformed`], which the evaluator treats as
//! `false`. The raw JSON of a malformed node is kept so that documents
//! round-trip unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::json_kind;

/// Combiner for compound nodes and top-level condition lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }

    /// Parse `"AND"` / `"OR"` (case-sensitive, as written in form documents).
    pub fn parse(s: &str) -> Option<Logic> {
        match s {
            "AND" => Some(Logic::And),
            "OR" => Some(Logic::Or),
            _ => None,
        }
    }
}

/// Leaf comparison operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafOp {
    Eq,
    Neq,
    In,
    /// Unrecognised operator string. Always evaluates to `false`.
    Other(String),
}

impl LeafOp {
    pub fn parse(s: &str) -> LeafOp {
        match s {
            "eq" => LeafOp::Eq,
            "neq" => LeafOp::Neq,
            "in" => LeafOp::In,
            other => LeafOp::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LeafOp::Eq => "eq",
            LeafOp::Neq => "neq",
            LeafOp::In => "in",
            LeafOp::Other(s) => s,
        }
    }
}

/// One node of a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    /// A JSON `null` element. Always true.
    Always,
    /// `{ "field": .., "operator": "eq" | "neq" | "in", "value": .. }`
    ///
    /// `value` is `None` when the key is absent, which is distinct from
    /// an explicit JSON `null`.
    Leaf {
        field: String,
        op: LeafOp,
        value: Option<Value>,
    },
    /// `{ "operator": "AND" | "OR", "clauses": [..] }`, or a nested JSON
    /// array (implicit AND).
    Compound {
        logic: Logic,
        clauses: Vec<ConditionNode>,
        /// True when the node was written as a bare JSON array.
        bare: bool,
    },
    /// Anything that does not fit the grammar.
    Malformed { raw: Value, reason: String },
}

impl ConditionNode {
    /// Parse a condition node from JSON. Never fails.
    pub fn from_json(v: &Value) -> ConditionNode {
        match v {
            Value::Null => ConditionNode::Always,
            Value::Array(items) => ConditionNode::Compound {
                logic: Logic::And,
                clauses: items.iter().map(ConditionNode::from_json).collect(),
                bare: true,
            },
            Value::Object(obj) => parse_object(v, obj),
            other => ConditionNode::Malformed {
                raw: other.clone(),
                reason: format!("expected an object, got {}", json_kind(other)),
            },
        }
    }

    /// Serialize back to the JSON shape the node was parsed from.
    pub fn to_json(&self) -> Value {
        match self {
            ConditionNode::Always => Value::Null,
            ConditionNode::Leaf { field, op, value } => {
                let mut obj = Map::new();
                obj.insert("field".to_string(), Value::String(field.clone()));
                obj.insert("operator".to_string(), Value::String(op.as_str().to_string()));
                if let Some(v) = value {
                    obj.insert("value".to_string(), v.clone());
                }
                Value::Object(obj)
            }
            ConditionNode::Compound {
                logic,
                clauses,
                bare,
            } => {
                let items: Vec<Value> = clauses.iter().map(ConditionNode::to_json).collect();
                if *bare {
                    Value::Array(items)
                } else {
                    let mut obj = Map::new();
                    obj.insert(
                        "operator".to_string(),
                        Value::String(logic.as_str().to_string()),
                    );
                    obj.insert("clauses".to_string(), Value::Array(items));
                    Value::Object(obj)
                }
            }
            ConditionNode::Malformed { raw, .. } => raw.clone(),
        }
    }

    /// Field ids referenced by leaves anywhere in this tree.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ConditionNode::Leaf { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            ConditionNode::Compound { clauses, .. } => {
                for c in clauses {
                    c.collect_fields(out);
                }
            }
            ConditionNode::Always | ConditionNode::Malformed { .. } => {}
        }
    }

    /// Reasons for every malformed node in this tree.
    pub fn malformed_reasons(&self) -> Vec<&str> {
        match self {
            ConditionNode::Malformed { reason, .. } => vec![reason.as_str()],
            ConditionNode::Compound { clauses, .. } => {
                clauses.iter().flat_map(|c| c.malformed_reasons()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn parse_object(raw: &Value, obj: &Map<String, Value>) -> ConditionNode {
    let operator = match obj.get("operator").and_then(|o| o.as_str()) {
        Some(op) if !op.is_empty() => op,
        _ => {
            return ConditionNode::Malformed {
                raw: raw.clone(),
                reason: "missing operator".to_string(),
            }
        }
    };

    if let Some(logic) = Logic::parse(operator) {
        return match obj.get("clauses") {
            Some(Value::Array(items)) if !items.is_empty() => ConditionNode::Compound {
                logic,
                clauses: items.iter().map(ConditionNode::from_json).collect(),
                bare: false,
            },
            Some(Value::Array(_)) => ConditionNode::Malformed {
                raw: raw.clone(),
                reason: format!("{} node has no clauses", operator),
            },
            _ => ConditionNode::Malformed {
                raw: raw.clone(),
                reason: format!("{} node requires a 'clauses' array", operator),
            },
        };
    }

    match obj.get("field").and_then(|f| f.as_str()) {
        Some(field) => ConditionNode::Leaf {
            field: field.to_string(),
            op: LeafOp::parse(operator),
            value: obj.get("value").cloned(),
        },
        None => ConditionNode::Malformed {
            raw: raw.clone(),
            reason: format!("'{}' comparison is missing 'field'", operator),
        },
    }
}

/// The `conditions` attribute of a field: a single node or a list combined
/// with the caller's default logic.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionSpec {
    Node(ConditionNode),
    List(Vec<ConditionNode>),
}

impl ConditionSpec {
    /// `None` for JSON `null` (no condition at all).
    pub fn from_json(v: &Value) -> Option<ConditionSpec> {
        match v {
            Value::Null => None,
            Value::Array(items) => Some(ConditionSpec::List(
                items.iter().map(ConditionNode::from_json).collect(),
            )),
            other => Some(ConditionSpec::Node(ConditionNode::from_json(other))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConditionSpec::Node(n) => n.to_json(),
            ConditionSpec::List(items) => {
                Value::Array(items.iter().map(ConditionNode::to_json).collect())
            }
        }
    }

    /// Top-level nodes, whether written as a list or a single node.
    pub fn nodes(&self) -> &[ConditionNode] {
        match self {
            ConditionSpec::Node(n) => std::slice::from_ref(n),
            ConditionSpec::List(items) => items,
        }
    }

    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for node in self.nodes() {
            for f in node.referenced_fields() {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        out
    }

    pub fn malformed_reasons(&self) -> Vec<&str> {
        self.nodes()
            .iter()
            .flat_map(|n| n.malformed_reasons())
            .collect()
    }
}

impl<'de> Deserialize<'de> for ConditionSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(deserializer)?;
        // `Option<ConditionSpec>` handles null itself; a bare null is always-true.
        Ok(ConditionSpec::from_json(&v).unwrap_or(ConditionSpec::Node(ConditionNode::Always)))
    }
}

impl Serialize for ConditionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
