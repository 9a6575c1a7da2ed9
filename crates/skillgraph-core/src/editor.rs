//! Pure edit operations on skill graphs.
//!
//! Every operation leaves its input untouched and returns a
//! [`Cow`]: `Cow::Borrowed` (the very same graph) when the edit is a no-op,
//! `Cow::Owned` with the edited copy otherwise. Edge uniqueness by composite
//! key is preserved structurally; no rule validation runs here.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::model::{Edge, EdgeType, NodeCategory, SkillGraph};

/// Appends `edge` unless an edge with the same composite key exists.
pub fn add_edge<'a>(graph: &'a SkillGraph, edge: &Edge) -> Cow<'a, SkillGraph> {
    if graph.has_edge(&edge.key()) {
        return Cow::Borrowed(graph);
    }
    let mut next = graph.clone();
    next.edges.push(edge.clone());
    Cow::Owned(next)
}

/// Removes every edge matching `edge` exactly.
pub fn remove_edge<'a>(graph: &'a SkillGraph, edge: &Edge) -> Cow<'a, SkillGraph> {
    if !graph.edges.contains(edge) {
        return Cow::Borrowed(graph);
    }
    let mut next = graph.clone();
    next.edges.retain(|e| e != edge);
    Cow::Owned(next)
}

/// Swaps `source` and `target` of an existing edge, keeping its type.
pub fn reverse_edge<'a>(graph: &'a SkillGraph, edge: &Edge) -> Cow<'a, SkillGraph> {
    match remove_edge(graph, edge) {
        Cow::Borrowed(_) => Cow::Borrowed(graph),
        Cow::Owned(removed) => Cow::Owned(add_edge(&removed, &edge.reversed()).into_owned()),
    }
}

/// Changes the type of an existing edge.
///
/// If the retyped edge collides with one already present the two merge, so
/// the edge count can drop by one.
pub fn update_edge_type<'a>(graph: &'a SkillGraph, edge: &Edge, next_type: EdgeType) -> Cow<'a, SkillGraph> {
    if edge.edge_type == next_type || !graph.edges.contains(edge) {
        return Cow::Borrowed(graph);
    }

    let mut seen = HashSet::with_capacity(graph.edges.len());
    let mut next = graph.clone();
    next.edges = graph
        .edges
        .iter()
        .map(|e| {
            if e == edge {
                Edge::new(next_type, e.source.clone(), e.target.clone())
            } else {
                e.clone()
            }
        })
        .filter(|e| seen.insert(e.key()))
        .collect();
    Cow::Owned(next)
}

/// Node fields editable from the graph editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMetaUpdate {
    pub node_category: NodeCategory,
    pub start: bool,
}

/// Sets a node's category and start flag.
///
/// `start: false` removes the key rather than storing `false`.
pub fn update_node_meta<'a>(graph: &'a SkillGraph, node_id: &str, update: NodeMetaUpdate) -> Cow<'a, SkillGraph> {
    let start = update.start.then_some(true);
    let unchanged = graph
        .nodes
        .iter()
        .filter(|n| n.id == node_id)
        .all(|n| n.node_category == update.node_category && n.start == start);
    if unchanged {
        // Also covers a node id that does not exist.
        return Cow::Borrowed(graph);
    }

    let mut next = graph.clone();
    for node in next.nodes.iter_mut().filter(|n| n.id == node_id) {
        node.node_category = update.node_category;
        node.start = start;
    }
    Cow::Owned(next)
}
