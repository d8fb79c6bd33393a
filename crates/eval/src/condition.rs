//! Condition evaluator.
//!
//! Walks a [`ConditionSpec`] tree against the answers and returns whether
//! the owning field is visible. Evaluation is total: malformed nodes and
//! unknown operators evaluate to `false` and are recorded in the
//! [`Diagnostics`] collector.

use serde_json::Value;
use willsuite_interchange::{ConditionNode, ConditionSpec, LeafOp, Logic};

use crate::answers::AnswerStore;
use crate::diagnostics::Diagnostics;
use crate::value::strict_equals;

/// Evaluate a field's conditions. `None` (no conditions) is always true.
///
/// `default_logic` combines the elements of a top-level list; nested
/// arrays always combine with AND.
pub fn evaluate(spec: Option<&ConditionSpec>, answers: &AnswerStore, default_logic: Logic) -> bool {
    evaluate_traced(spec, answers, default_logic, &mut Diagnostics::new())
}

/// Like [`evaluate`], recording malformed nodes and unknown operators.
pub fn evaluate_traced(
    spec: Option<&ConditionSpec>,
    answers: &AnswerStore,
    default_logic: Logic,
    diag: &mut Diagnostics,
) -> bool {
    match spec {
        None => true,
        Some(ConditionSpec::Node(node)) => eval_node(node, answers, diag),
        Some(ConditionSpec::List(nodes)) => combine(default_logic, nodes, answers, diag),
    }
}

/// Evaluate a single node.
pub fn eval_node(node: &ConditionNode, answers: &AnswerStore, diag: &mut Diagnostics) -> bool {
    match node {
        ConditionNode::Always => true,
        ConditionNode::Leaf { field, op, value } => {
            let actual = answers.get(field);
            match op {
                LeafOp::Eq => strict_equals(actual, value.as_ref()),
                LeafOp::Neq => !strict_equals(actual, value.as_ref()),
                LeafOp::In => match value {
                    Some(Value::Array(items)) => {
                        items.iter().any(|item| strict_equals(actual, Some(item)))
                    }
                    _ => false,
                },
                LeafOp::Other(name) => {
                    tracing::debug!(field = %field, operator = %name, "unknown condition operator");
                    diag.record_unknown_operator(name);
                    false
                }
            }
        }
        ConditionNode::Compound { logic, clauses, .. } => combine(*logic, clauses, answers, diag),
        ConditionNode::Malformed { reason, .. } => {
            tracing::debug!(reason = %reason, "malformed condition evaluates to false");
            diag.record_malformed(reason);
            false
        }
    }
}

// Every child is evaluated so that diagnostics cover the whole tree.
fn combine(
    logic: Logic,
    nodes: &[ConditionNode],
    answers: &AnswerStore,
    diag: &mut Diagnostics,
) -> bool {
    let results: Vec<bool> = nodes.iter().map(|n| eval_node(n, answers, diag)).collect();
    match logic {
        Logic::And => results.iter().all(|r| *r),
        Logic::Or => results.iter().any(|r| *r),
    }
}
