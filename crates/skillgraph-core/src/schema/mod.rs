//! Schema validation for skill-graph documents.
//!
//! Input is untyped JSON. Validation never fails fast: every shape issue that
//! can be detected is reported, each with a stable [`SchemaIssueCode`], a
//! locator path such as `nodes[2].id`, and a message.
//!
//! Three entry points share the same checks:
//!
//! - [`validate`] returns the issue list.
//! - [`parse`] returns the normalized [`SkillGraph`] or a [`SchemaError`]
//!   holding all issues.
//! - [`validate_basic`] additionally recovers the node each issue belongs to,
//!   for editors that deep-link into the graph.

mod issue;
mod patterns;
mod validator;

pub use issue::{LocatedIssue, SchemaError, SchemaIssue, SchemaIssueCode};
pub use patterns::{is_valid_node_id, NODE_ID_PATTERN};

use serde_json::Value;

use crate::model::SkillGraph;

/// Returns every schema issue in `input`; empty when the document is valid.
pub fn validate(input: &Value) -> Vec<SchemaIssue> {
    validator::check(input).issues
}

/// Parses `input` into a normalized document.
///
/// On success `schemaVersion` is the supported literal and `graphId`/`title`
/// are filled from `meta` when they were absent at the top level.
pub fn parse(input: &Value) -> Result<SkillGraph, SchemaError> {
    let checked = validator::check(input);
    match checked.graph {
        Some(graph) if checked.issues.is_empty() => Ok(graph),
        _ => Err(SchemaError::new(checked.issues)),
    }
}

/// Parses JSON text. Text that is not JSON yields a single `invalid_root`
/// issue.
pub fn parse_str(json: &str) -> Result<SkillGraph, SchemaError> {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => parse(&value),
        Err(e) => Err(SchemaError::new(vec![SchemaIssue::new(
            SchemaIssueCode::InvalidRoot,
            "",
            format!("Document is not valid JSON: {}", e),
        )])),
    }
}

/// Outcome of [`validate_basic`].
#[derive(Debug, Clone, PartialEq)]
pub enum BasicValidation {
    Ok(SkillGraph),
    Invalid(Vec<LocatedIssue>),
}

impl BasicValidation {
    pub fn is_ok(&self) -> bool {
        matches!(self, BasicValidation::Ok(_))
    }

    pub fn into_result(self) -> Result<SkillGraph, Vec<LocatedIssue>> {
        match self {
            BasicValidation::Ok(graph) => Ok(graph),
            BasicValidation::Invalid(issues) => Err(issues),
        }
    }
}

/// Validates `input` and attaches the originating node id to each issue.
///
/// The node id comes from the issue path when it points into `nodes[i]` or at
/// an edge endpoint, otherwise from the first quoted id in the message.
pub fn validate_basic(input: &Value) -> BasicValidation {
    let checked = validator::check(input);
    if let (Some(graph), true) = (checked.graph, checked.issues.is_empty()) {
        return BasicValidation::Ok(graph);
    }

    let located = checked
        .issues
        .into_iter()
        .map(|issue| {
            let node_id = recover_node_id(input, &issue);
            LocatedIssue { issue, node_id }
        })
        .collect();
    BasicValidation::Invalid(located)
}

fn recover_node_id(input: &Value, issue: &SchemaIssue) -> Option<String> {
    if let Some(index) = patterns::node_index_in_path(&issue.path) {
        let id = input
            .get("nodes")
            .and_then(|nodes| nodes.get(index))
            .and_then(|node| node.get("id"))
            .and_then(Value::as_str);
        if let Some(id) = id {
            return Some(id.to_string());
        }
    }

    if let Some((index, key)) = patterns::endpoint_in_path(&issue.path) {
        let id = input
            .get("edges")
            .and_then(|edges| edges.get(index))
            .and_then(|edge| edge.get(key.as_str()))
            .and_then(Value::as_str);
        if let Some(id) = id {
            return Some(id.to_string());
        }
    }

    patterns::quoted_id_in_message(&issue.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "schemaVersion": "skill-graph/v1",
            "graphId": "g",
            "title": "Graph",
            "nodes": [{"id": "a", "nodeCategory": "core", "label": "A", "start": true}],
            "edges": []
        })
    }

    #[test]
    fn test_minimal_document_parses() {
        let graph = parse(&minimal()).unwrap();
        assert_eq!(graph.graph_id, "g");
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.meta.is_empty());
    }

    #[test]
    fn test_non_json_text_is_invalid_root() {
        let err = parse_str("{not json").unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.has_code(SchemaIssueCode::InvalidRoot));
    }

    #[test]
    fn test_basic_recovers_node_from_label_path() {
        let mut doc = minimal();
        doc["nodes"][0]["label"] = json!("");
        let issues = validate_basic(&doc).into_result().unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue.path, "nodes[0].label");
        assert_eq!(issues[0].node_id.as_deref(), Some("a"));
    }
}
