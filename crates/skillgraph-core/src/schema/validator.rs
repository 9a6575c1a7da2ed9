//! Field-by-field shape checking of untyped skill-graph input.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::issue::{SchemaIssue, SchemaIssueCode};
use super::patterns::is_valid_node_id;
use crate::model::{Edge, EdgeKey, EdgeType, Node, NodeCategory, SkillGraph, SCHEMA_VERSION};

/// Result of a full pass: every issue, plus the normalized document when
/// there were none.
pub(crate) struct Checked {
    pub issues: Vec<SchemaIssue>,
    pub graph: Option<SkillGraph>,
}

/// Runs every shape check over `input`, accumulating issues.
pub(crate) fn check(input: &Value) -> Checked {
    let mut checker = Checker::default();
    let graph = checker.check_document(input);
    let graph = if checker.issues.is_empty() { graph } else { None };
    Checked {
        issues: checker.issues,
        graph,
    }
}

#[derive(Default)]
struct Checker {
    issues: Vec<SchemaIssue>,
}

impl Checker {
    fn push(&mut self, code: SchemaIssueCode, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(SchemaIssue::new(code, path, message));
    }

    fn check_document(&mut self, input: &Value) -> Option<SkillGraph> {
        let Some(root) = input.as_object() else {
            self.push(
                SchemaIssueCode::InvalidRoot,
                "",
                "Skill graph must be a JSON object",
            );
            return None;
        };

        match root.get("schemaVersion") {
            Some(Value::String(v)) if v == SCHEMA_VERSION => {}
            _ => self.push(
                SchemaIssueCode::InvalidSchemaVersion,
                "schemaVersion",
                format!("schemaVersion must be \"{}\"", SCHEMA_VERSION),
            ),
        }

        let empty = Map::new();
        let meta = match root.get("meta") {
            None => &empty,
            Some(Value::Object(m)) => m,
            Some(_) => {
                self.push(SchemaIssueCode::InvalidType, "meta", "meta must be an object");
                &empty
            }
        };

        let graph_id = self.text_with_meta_fallback(root, meta, "graphId");
        let title = self.text_with_meta_fallback(root, meta, "title");

        let nodes = self.array_field(root, "nodes");
        let edges = self.array_field(root, "edges");
        let (Some(raw_nodes), Some(raw_edges)) = (nodes, edges) else {
            return None;
        };

        let mut known_ids: HashSet<&str> = HashSet::new();
        let mut start_nodes: Vec<(usize, &str)> = Vec::new();
        let mut typed_nodes = Vec::with_capacity(raw_nodes.len());
        for (index, raw) in raw_nodes.iter().enumerate() {
            if let Some(node) = self.check_node(index, raw, &mut known_ids, &mut start_nodes) {
                typed_nodes.push(node);
            }
        }

        let mut requires_targets: HashSet<&str> = HashSet::new();
        let mut seen_keys: HashSet<EdgeKey> = HashSet::new();
        let mut typed_edges = Vec::with_capacity(raw_edges.len());
        for (index, raw) in raw_edges.iter().enumerate() {
            if let Some(edge) = self.check_edge(index, raw, &known_ids, &mut requires_targets, &mut seen_keys) {
                typed_edges.push(edge);
            }
        }

        for (index, id) in start_nodes {
            if requires_targets.contains(id) {
                self.push(
                    SchemaIssueCode::StartIncomingRequires,
                    format!("nodes[{}].start", index),
                    format!("Start node '{}' must not have incoming requires edges", id),
                );
            }
        }

        Some(SkillGraph {
            schema_version: SCHEMA_VERSION.to_string(),
            graph_id: graph_id?,
            title: title?,
            nodes: typed_nodes,
            edges: typed_edges,
            meta: meta.clone(),
        })
    }

    /// Reads a required non-empty string, falling back to `meta.<key>` when the
    /// key is absent at the top level.
    fn text_with_meta_fallback(
        &mut self,
        root: &Map<String, Value>,
        meta: &Map<String, Value>,
        key: &str,
    ) -> Option<String> {
        match root.get(key) {
            None => match meta.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                _ => {
                    self.push(SchemaIssueCode::MissingField, key, format!("{} is required", key));
                    None
                }
            },
            Some(value) => self.non_empty_text(value, key.to_string(), key),
        }
    }

    fn non_empty_text(&mut self, value: &Value, path: String, name: &str) -> Option<String> {
        match value {
            Value::String(s) if s.trim().is_empty() => {
                self.push(SchemaIssueCode::EmptyString, path, format!("{} must not be empty", name));
                None
            }
            Value::String(s) => Some(s.clone()),
            _ => {
                self.push(SchemaIssueCode::InvalidType, path, format!("{} must be a string", name));
                None
            }
        }
    }

    fn array_field<'v>(&mut self, root: &'v Map<String, Value>, key: &str) -> Option<&'v Vec<Value>> {
        match root.get(key) {
            Some(Value::Array(items)) => Some(items),
            None => {
                self.push(SchemaIssueCode::MissingField, key, format!("{} is required", key));
                None
            }
            Some(_) => {
                self.push(SchemaIssueCode::InvalidType, key, format!("{} must be an array", key));
                None
            }
        }
    }

    fn check_node<'v>(
        &mut self,
        index: usize,
        raw: &'v Value,
        known_ids: &mut HashSet<&'v str>,
        start_nodes: &mut Vec<(usize, &'v str)>,
    ) -> Option<Node> {
        let base = format!("nodes[{}]", index);
        let Some(obj) = raw.as_object() else {
            self.push(SchemaIssueCode::InvalidType, base, "Node must be an object");
            return None;
        };
        let before = self.issues.len();

        let id = match obj.get("id") {
            None => {
                self.push(SchemaIssueCode::MissingField, format!("{}.id", base), "Node id is required");
                None
            }
            Some(Value::String(id)) => {
                if !is_valid_node_id(id) {
                    self.push(
                        SchemaIssueCode::InvalidNodeId,
                        format!("{}.id", base),
                        format!("Node id '{}' must match ^[A-Za-z0-9._-]+$", id),
                    );
                } else if known_ids.contains(id.as_str()) {
                    self.push(
                        SchemaIssueCode::DuplicateNodeId,
                        format!("{}.id", base),
                        format!("Duplicate node id '{}'", id),
                    );
                }
                known_ids.insert(id.as_str());
                Some(id.as_str())
            }
            Some(_) => {
                self.push(SchemaIssueCode::InvalidType, format!("{}.id", base), "Node id must be a string");
                None
            }
        };

        let category = match obj.get("nodeCategory") {
            None => {
                self.push(
                    SchemaIssueCode::MissingField,
                    format!("{}.nodeCategory", base),
                    "nodeCategory is required",
                );
                None
            }
            Some(value) => {
                let parsed = value.as_str().and_then(NodeCategory::parse);
                if parsed.is_none() {
                    self.push(
                        SchemaIssueCode::InvalidNodeCategory,
                        format!("{}.nodeCategory", base),
                        "nodeCategory must be one of core, challenge, formal",
                    );
                }
                parsed
            }
        };

        let label = match obj.get("label") {
            None => {
                self.push(SchemaIssueCode::MissingField, format!("{}.label", base), "Node label is required");
                None
            }
            Some(value) => self.non_empty_text(value, format!("{}.label", base), "Node label"),
        };

        let start = match obj.get("start") {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(_) => {
                self.push(SchemaIssueCode::InvalidType, format!("{}.start", base), "start must be a boolean");
                None
            }
        };

        let order = match obj.get("order") {
            None => None,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => Some(v),
                _ => {
                    self.push(SchemaIssueCode::InvalidType, format!("{}.order", base), "order must be a finite number");
                    None
                }
            },
            Some(_) => {
                self.push(SchemaIssueCode::InvalidType, format!("{}.order", base), "order must be a finite number");
                None
            }
        };

        if let (Some(id), Some(true)) = (id, start) {
            start_nodes.push((index, id));
        }

        if self.issues.len() > before {
            return None;
        }
        Some(Node {
            id: id?.to_string(),
            node_category: category?,
            label: label?,
            start,
            order,
        })
    }

    fn check_edge<'v>(
        &mut self,
        index: usize,
        raw: &'v Value,
        known_ids: &HashSet<&str>,
        requires_targets: &mut HashSet<&'v str>,
        seen_keys: &mut HashSet<EdgeKey>,
    ) -> Option<Edge> {
        let base = format!("edges[{}]", index);
        let Some(obj) = raw.as_object() else {
            self.push(SchemaIssueCode::InvalidType, base, "Edge must be an object");
            return None;
        };
        let before = self.issues.len();

        let edge_type = match obj.get("edgeType") {
            None => {
                self.push(
                    SchemaIssueCode::MissingField,
                    format!("{}.edgeType", base),
                    "edgeType is required",
                );
                None
            }
            Some(value) => {
                let parsed = value.as_str().and_then(EdgeType::parse);
                if parsed.is_none() {
                    self.push(
                        SchemaIssueCode::InvalidEdgeType,
                        format!("{}.edgeType", base),
                        "edgeType must be one of requires, prepares_for, related, contains",
                    );
                }
                parsed
            }
        };

        let source = self.endpoint(obj, &base, "source", known_ids);
        let target = self.endpoint(obj, &base, "target", known_ids);

        if let (Some(s), Some(t)) = (source, target) {
            if s == t {
                self.push(
                    SchemaIssueCode::SelfEdge,
                    base.clone(),
                    format!("Edge from '{}' to itself is not allowed", s),
                );
            }
        }

        if let (Some(EdgeType::Requires), Some(t)) = (edge_type, target) {
            requires_targets.insert(t);
        }

        if let (Some(edge_type), Some(s), Some(t)) = (edge_type, source, target) {
            let edge = Edge::new(edge_type, s, t);
            if !seen_keys.insert(edge.key()) {
                self.push(
                    SchemaIssueCode::DuplicateEdge,
                    base,
                    format!("Duplicate {} edge from '{}' to '{}'", edge_type, s, t),
                );
            }
            if self.issues.len() == before {
                return Some(edge);
            }
        }
        None
    }

    /// Checks one endpoint. Returns the id whenever it is a string, even if it
    /// does not resolve, so later checks can still run.
    fn endpoint<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        base: &str,
        key: &str,
        known_ids: &HashSet<&str>,
    ) -> Option<&'v str> {
        let path = format!("{}.{}", base, key);
        match obj.get(key) {
            None => {
                self.push(SchemaIssueCode::MissingField, path, format!("Edge {} is required", key));
                None
            }
            Some(Value::String(id)) => {
                if !known_ids.contains(id.as_str()) {
                    self.push(
                        SchemaIssueCode::UnknownNodeRef,
                        path,
                        format!("Edge {} references unknown node '{}'", key, id),
                    );
                }
                Some(id.as_str())
            }
            Some(_) => {
                self.push(SchemaIssueCode::InvalidType, path, format!("Edge {} must be a string", key));
                None
            }
        }
    }
}
