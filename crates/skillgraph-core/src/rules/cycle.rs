//! Cycle detection over the `requires` subgraph.

use std::collections::{HashMap, HashSet};

use crate::model::{EdgeType, SkillGraph};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Visiting,
    Done,
}

/// Finds the first `requires` cycle, walking roots in node order.
///
/// The returned path starts and ends at the same node, e.g.
/// `["A", "B", "C", "A"]`. Edges with a dangling endpoint are ignored.
pub fn find_requires_cycle(graph: &SkillGraph) -> Option<Vec<String>> {
    search(graph, None)
}

/// Returns true if the `requires` subgraph contains a cycle.
pub fn has_requires_cycle(graph: &SkillGraph) -> bool {
    search(graph, None).is_some()
}

/// Returns true if adding `requires(source, target)` would leave a cycle,
/// without copying the graph.
pub(crate) fn cycle_with_extra_requires(graph: &SkillGraph, source: &str, target: &str) -> bool {
    search(graph, Some((source, target))).is_some()
}

/// Formats a cycle path as `A -> B -> C -> A`.
pub fn format_cycle(path: &[String]) -> String {
    path.join(" -> ")
}

fn search(graph: &SkillGraph, extra: Option<(&str, &str)>) -> Option<Vec<String>> {
    let mut order: Vec<&str> = Vec::with_capacity(graph.nodes.len());
    let mut known: HashSet<&str> = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if known.insert(node.id.as_str()) {
            order.push(node.id.as_str());
        }
    }

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let requires = graph
        .edges
        .iter()
        .filter(|e| e.edge_type == EdgeType::Requires)
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .chain(extra);
    for (source, target) in requires {
        if known.contains(source) && known.contains(target) {
            adjacency.entry(source).or_default().push(target);
        }
    }

    let mut colors: HashMap<&str, Color> = HashMap::with_capacity(order.len());
    for &root in &order {
        if colors.contains_key(root) {
            continue;
        }

        // Frames are (node, index of the next neighbor to visit); `path`
        // mirrors the frame ids for cycle reconstruction.
        let mut stack: Vec<(&str, usize)> = vec![(root, 0)];
        let mut path: Vec<&str> = vec![root];
        colors.insert(root, Color::Visiting);

        while let Some(&(node, next)) = stack.last() {
            let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]);
            let Some(&neighbor) = neighbors.get(next) else {
                colors.insert(node, Color::Done);
                stack.pop();
                path.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match colors.get(neighbor) {
                Some(Color::Visiting) => {
                    let from = path.iter().position(|&id| id == neighbor)?;
                    let mut cycle: Vec<String> = path[from..].iter().map(|id| id.to_string()).collect();
                    cycle.push(neighbor.to_string());
                    return Some(cycle);
                }
                Some(Color::Done) => {}
                None => {
                    colors.insert(neighbor, Color::Visiting);
                    stack.push((neighbor, 0));
                    path.push(neighbor);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node, NodeCategory};

    fn graph(ids: &[&str], requires: &[(&str, &str)]) -> SkillGraph {
        let mut g = SkillGraph::new("g", "G");
        g.nodes = ids.iter().map(|id| Node::new(*id, NodeCategory::Core, *id)).collect();
        g.edges = requires.iter().map(|(s, t)| Edge::requires(*s, *t)).collect();
        g
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert!(find_requires_cycle(&g).is_none());
    }

    #[test]
    fn test_cycle_path_follows_node_order() {
        let g = graph(&["B", "C", "A"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let cycle = find_requires_cycle(&g).unwrap();
        assert_eq!(format_cycle(&cycle), "B -> C -> A -> B");
    }

    #[test]
    fn test_cycle_reachable_through_prefix_excludes_prefix() {
        let g = graph(&["x", "a", "b"], &[("x", "a"), ("a", "b"), ("b", "a")]);
        assert_eq!(find_requires_cycle(&g).unwrap(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_other_edge_types_and_dangling_edges_ignored() {
        let mut g = graph(&["a", "b"], &[("a", "b"), ("b", "ghost"), ("ghost", "a")]);
        g.edges.push(Edge::new(EdgeType::Related, "b", "a"));
        assert!(!has_requires_cycle(&g));
    }

    #[test]
    fn test_extra_edge_simulation() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert!(cycle_with_extra_requires(&g, "c", "a"));
        assert!(!cycle_with_extra_requires(&g, "a", "c"));
    }
}
