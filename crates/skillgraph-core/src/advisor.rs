//! Answers "may this edge be added?" without mutating the graph.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{EdgeKey, EdgeType, Node, SkillGraph};
use crate::rules::{cycle_with_extra_requires, has_requires_cycle};

/// Why a candidate edge is rejected. Display strings are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRejection {
    UnknownNode,
    SelfEdge,
    AlreadyExists,
    RequiresIntoStart,
    WouldCreateCycle,
}

impl EdgeRejection {
    pub fn message(&self) -> &'static str {
        match self {
            EdgeRejection::UnknownNode => "Both nodes must exist in the graph.",
            EdgeRejection::SelfEdge => "A node cannot be connected to itself.",
            EdgeRejection::AlreadyExists => "This connection already exists.",
            EdgeRejection::RequiresIntoStart => "Start nodes cannot have prerequisites.",
            EdgeRejection::WouldCreateCycle => "This connection would create a prerequisite cycle.",
        }
    }
}

impl std::fmt::Display for EdgeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// One candidate target for a new edge from a fixed source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectableTarget<'a> {
    pub node: &'a Node,
    pub is_connectable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<EdgeRejection>,
}

/// Returns why `edge_type(source, target)` may not be added, or `None`.
///
/// Checks run in order and the first failure wins: both nodes exist, not a
/// self edge, not a duplicate, (requires only) target is not a start node,
/// (requires only) no new cycle. The cycle check is skipped while the graph
/// already has a cycle.
pub fn edge_addition_error(
    graph: &SkillGraph,
    edge_type: EdgeType,
    source: &str,
    target: &str,
) -> Option<EdgeRejection> {
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let already_cyclic = edge_type == EdgeType::Requires && has_requires_cycle(graph);
    check_candidate(graph, &ids, already_cyclic, edge_type, source, target)
}

/// Evaluates every other node as a target for `edge_type` from `source`.
pub fn connectable_targets<'a>(
    graph: &'a SkillGraph,
    source: &str,
    edge_type: EdgeType,
) -> Vec<ConnectableTarget<'a>> {
    let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let already_cyclic = edge_type == EdgeType::Requires && has_requires_cycle(graph);

    graph
        .nodes
        .iter()
        .filter(|node| node.id != source)
        .map(|node| {
            let reason = check_candidate(graph, &ids, already_cyclic, edge_type, source, &node.id);
            ConnectableTarget {
                node,
                is_connectable: reason.is_none(),
                reason,
            }
        })
        .collect()
}

fn check_candidate(
    graph: &SkillGraph,
    ids: &HashSet<&str>,
    already_cyclic: bool,
    edge_type: EdgeType,
    source: &str,
    target: &str,
) -> Option<EdgeRejection> {
    if !ids.contains(source) || !ids.contains(target) {
        return Some(EdgeRejection::UnknownNode);
    }
    if source == target {
        return Some(EdgeRejection::SelfEdge);
    }
    let key = EdgeKey {
        edge_type,
        source: source.to_string(),
        target: target.to_string(),
    };
    if graph.has_edge(&key) {
        return Some(EdgeRejection::AlreadyExists);
    }
    if edge_type != EdgeType::Requires {
        return None;
    }
    if graph.nodes.iter().any(|n| n.id == target && n.is_start()) {
        return Some(EdgeRejection::RequiresIntoStart);
    }
    if !already_cyclic && cycle_with_extra_requires(graph, source, target) {
        return Some(EdgeRejection::WouldCreateCycle);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, NodeCategory};

    fn chain() -> SkillGraph {
        let mut g = SkillGraph::new("g", "G");
        g.nodes = vec![
            Node::new("a", NodeCategory::Core, "A").as_start(),
            Node::new("b", NodeCategory::Core, "B"),
            Node::new("c", NodeCategory::Core, "C"),
        ];
        g.edges = vec![Edge::requires("a", "b"), Edge::requires("b", "c")];
        g
    }

    #[test]
    fn test_decision_order() {
        let g = chain();
        assert_eq!(edge_addition_error(&g, EdgeType::Requires, "a", "zzz"), Some(EdgeRejection::UnknownNode));
        assert_eq!(edge_addition_error(&g, EdgeType::Requires, "b", "b"), Some(EdgeRejection::SelfEdge));
        assert_eq!(edge_addition_error(&g, EdgeType::Requires, "a", "b"), Some(EdgeRejection::AlreadyExists));
        assert_eq!(edge_addition_error(&g, EdgeType::Requires, "c", "b"), Some(EdgeRejection::WouldCreateCycle));
        assert_eq!(edge_addition_error(&g, EdgeType::Requires, "a", "c"), None);
    }

    #[test]
    fn test_non_requires_edges_may_cycle_and_target_start() {
        let g = chain();
        assert_eq!(edge_addition_error(&g, EdgeType::Related, "c", "a"), None);
        assert_eq!(edge_addition_error(&g, EdgeType::PreparesFor, "c", "a"), None);
    }

    #[test]
    fn test_connectable_targets_excludes_source() {
        let g = chain();
        let targets = connectable_targets(&g, "c", EdgeType::Requires);
        let ids: Vec<&str> = targets.iter().map(|t| t.node.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(targets[0].reason, Some(EdgeRejection::RequiresIntoStart));
        assert_eq!(targets[1].reason, Some(EdgeRejection::WouldCreateCycle));
        assert!(targets.iter().all(|t| !t.is_connectable));
    }
}
