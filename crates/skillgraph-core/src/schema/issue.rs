use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable schema issue codes.
///
/// The serialized names are consumed by editors for deep-linking and must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaIssueCode {
    /// The document root is not a JSON object.
    InvalidRoot,
    /// `schemaVersion` is missing or not the supported literal.
    InvalidSchemaVersion,
    /// A required key is absent.
    MissingField,
    /// A key is present with the wrong JSON type.
    InvalidType,
    /// A required string is empty or whitespace.
    EmptyString,
    /// A node id does not match the id format.
    InvalidNodeId,
    /// A node id repeats an earlier one.
    DuplicateNodeId,
    /// `nodeCategory` is not one of the known categories.
    InvalidNodeCategory,
    /// `edgeType` is not one of the known edge types.
    InvalidEdgeType,
    /// An edge endpoint names a node that does not exist.
    UnknownNodeRef,
    /// An edge connects a node to itself.
    SelfEdge,
    /// An edge repeats the `(edgeType, source, target)` of an earlier one.
    DuplicateEdge,
    /// A start node has an incoming `requires` edge.
    StartIncomingRequires,
}

impl SchemaIssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaIssueCode::InvalidRoot => "invalid_root",
            SchemaIssueCode::InvalidSchemaVersion => "invalid_schema_version",
            SchemaIssueCode::MissingField => "missing_field",
            SchemaIssueCode::InvalidType => "invalid_type",
            SchemaIssueCode::EmptyString => "empty_string",
            SchemaIssueCode::InvalidNodeId => "invalid_node_id",
            SchemaIssueCode::DuplicateNodeId => "duplicate_node_id",
            SchemaIssueCode::InvalidNodeCategory => "invalid_node_category",
            SchemaIssueCode::InvalidEdgeType => "invalid_edge_type",
            SchemaIssueCode::UnknownNodeRef => "unknown_node_ref",
            SchemaIssueCode::SelfEdge => "self_edge",
            SchemaIssueCode::DuplicateEdge => "duplicate_edge",
            SchemaIssueCode::StartIncomingRequires => "start_incoming_requires",
        }
    }
}

impl std::fmt::Display for SchemaIssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single shape violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub code: SchemaIssueCode,
    /// Locator such as `nodes[2].id`; empty for the document root.
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(code: SchemaIssueCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.code, self.path, self.message)
        }
    }
}

/// A schema issue enriched with the node it most likely belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedIssue {
    #[serde(flatten)]
    pub issue: SchemaIssue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Error returned by [`super::parse`], carrying every issue found.
#[derive(Debug, Clone, Error)]
#[error("Skill graph failed schema validation with {} issue(s): {}", .issues.len(), summarize(.issues))]
pub struct SchemaError {
    pub issues: Vec<SchemaIssue>,
}

impl SchemaError {
    pub fn new(issues: Vec<SchemaIssue>) -> Self {
        Self { issues }
    }

    /// Returns true if any issue carries the given code.
    pub fn has_code(&self, code: SchemaIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

fn summarize(issues: &[SchemaIssue]) -> String {
    match issues.first() {
        Some(first) if issues.len() > 1 => format!("{} (and {} more)", first, issues.len() - 1),
        Some(first) => first.to_string(),
        None => String::from("no details"),
    }
}
