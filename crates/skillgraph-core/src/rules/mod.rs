//! Semantic rule validation over typed skill graphs.
//!
//! Rule violations are advisory: they come back as a list of errors and
//! warnings and are never raised. Callers decide whether warnings block.
//!
//! [`validate`] runs every rule. [`validate_basic`] skips cycle detection for
//! callers that validate on every keystroke.

mod cycle;

pub use cycle::{find_requires_cycle, format_cycle, has_requires_cycle};
pub(crate) use cycle::cycle_with_extra_requires;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::ValidationConfig;
use crate::model::{Edge, EdgeType, SkillGraph};

/// How serious a rule violation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Stable rule violation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCode {
    DuplicateNodeId,
    SelfLoop,
    MissingNodeRef,
    NoStartNodes,
    MultipleStartNodes,
    StartIncomingRequires,
    RequiresCycle,
}

impl RuleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::DuplicateNodeId => "duplicate_node_id",
            RuleCode::SelfLoop => "self_loop",
            RuleCode::MissingNodeRef => "missing_node_ref",
            RuleCode::NoStartNodes => "no_start_nodes",
            RuleCode::MultipleStartNodes => "multiple_start_nodes",
            RuleCode::StartIncomingRequires => "start_incoming_requires",
            RuleCode::RequiresCycle => "requires_cycle",
        }
    }
}

impl std::fmt::Display for RuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: RuleCode,
    pub severity: Severity,
    pub message: String,
    /// Node the issue is about, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Offending edge for edge-level issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<Edge>,
    /// Cycle path for `requires_cycle`, first node repeated at the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
    /// Occurrence count for `duplicate_node_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ValidationIssue {
    fn new(code: RuleCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            node_id: None,
            edge: None,
            cycle: None,
            count: None,
        }
    }

    fn with_node(mut self, id: &str) -> Self {
        self.node_id = Some(id.to_string());
        self
    }

    fn with_edge(mut self, edge: &Edge) -> Self {
        self.edge = Some(edge.clone());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} [{}] {}", level, self.code, self.message)
    }
}

/// Runs every rule, including cycle detection, with the default policy.
pub fn validate(graph: &SkillGraph) -> Vec<ValidationIssue> {
    validate_with(graph, &ValidationConfig::default())
}

/// Runs every rule except cycle detection, with the default policy.
pub fn validate_basic(graph: &SkillGraph) -> Vec<ValidationIssue> {
    validate_basic_with(graph, &ValidationConfig::default())
}

/// Runs every rule with an explicit policy.
pub fn validate_with(graph: &SkillGraph, config: &ValidationConfig) -> Vec<ValidationIssue> {
    let mut issues = validate_basic_with(graph, config);
    if let Some(path) = find_requires_cycle(graph) {
        let mut issue = ValidationIssue::new(
            RuleCode::RequiresCycle,
            Severity::Error,
            format!("Requires cycle detected: {}", format_cycle(&path)),
        );
        issue.node_id = path.first().cloned();
        issue.cycle = Some(path);
        issues.push(issue);
    }
    issues
}

/// Runs the cheap rules (ids, references, self-loops, start policy).
pub fn validate_basic_with(graph: &SkillGraph, config: &ValidationConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    duplicate_ids(graph, &mut issues);
    edge_references(graph, &mut issues);
    start_policy(graph, config, &mut issues);
    issues
}

fn duplicate_ids(graph: &SkillGraph, issues: &mut Vec<ValidationIssue>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for node in &graph.nodes {
        let count = counts.entry(node.id.as_str()).or_insert(0);
        if *count == 0 {
            order.push(node.id.as_str());
        }
        *count += 1;
    }

    for id in order {
        let count = counts[id];
        if count > 1 {
            let mut issue = ValidationIssue::new(
                RuleCode::DuplicateNodeId,
                Severity::Error,
                format!("Node id '{}' appears {} times", id, count),
            )
            .with_node(id);
            issue.count = Some(count);
            issues.push(issue);
        }
    }
}

fn edge_references(graph: &SkillGraph, issues: &mut Vec<ValidationIssue>) {
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &graph.edges {
        let key = edge.key();
        if edge.source == edge.target {
            issues.push(
                ValidationIssue::new(
                    RuleCode::SelfLoop,
                    Severity::Error,
                    format!("Edge {} connects node '{}' to itself", key, edge.source),
                )
                .with_node(&edge.source)
                .with_edge(edge),
            );
        }
        if !ids.contains(edge.source.as_str()) {
            issues.push(
                ValidationIssue::new(
                    RuleCode::MissingNodeRef,
                    Severity::Error,
                    format!("Edge {} source references missing node '{}'", key, edge.source),
                )
                .with_node(&edge.source)
                .with_edge(edge),
            );
        }
        if !ids.contains(edge.target.as_str()) {
            issues.push(
                ValidationIssue::new(
                    RuleCode::MissingNodeRef,
                    Severity::Error,
                    format!("Edge {} target references missing node '{}'", key, edge.target),
                )
                .with_node(&edge.target)
                .with_edge(edge),
            );
        }
    }
}

fn start_policy(graph: &SkillGraph, config: &ValidationConfig, issues: &mut Vec<ValidationIssue>) {
    let starts: Vec<&str> = graph.start_nodes().map(|n| n.id.as_str()).collect();

    match starts.len() {
        0 => issues.push(ValidationIssue::new(
            RuleCode::NoStartNodes,
            Severity::Warning,
            "Graph has no start node",
        )),
        1 => {}
        n => issues.push(ValidationIssue::new(
            RuleCode::MultipleStartNodes,
            Severity::Warning,
            format!("Graph has {} start nodes: {}", n, starts.join(", ")),
        )),
    }

    let mut incoming: HashMap<&str, usize> = HashMap::new();
    for edge in graph.edges.iter().filter(|e| e.edge_type == EdgeType::Requires) {
        *incoming.entry(edge.target.as_str()).or_insert(0) += 1;
    }
    for id in starts {
        if let Some(&n) = incoming.get(id) {
            issues.push(
                ValidationIssue::new(
                    RuleCode::StartIncomingRequires,
                    config.start_incoming_requires,
                    format!("Start node '{}' has {} incoming requires edge(s)", id, n),
                )
                .with_node(id),
            );
        }
    }
}

/// Rule validation outcome split by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Full validation of `graph` under `config`.
    pub fn for_graph(graph: &SkillGraph, config: &ValidationConfig) -> Self {
        Self::new(validate_with(graph, config))
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// True when there are no errors; warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn has_code(&self, code: RuleCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}
