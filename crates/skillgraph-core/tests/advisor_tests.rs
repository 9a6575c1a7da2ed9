use skillgraph_core::advisor::{connectable_targets, edge_addition_error, EdgeRejection};
use skillgraph_core::{Edge, EdgeType, Node, NodeCategory, SkillGraph};

fn graph(requires: &[(&str, &str)]) -> SkillGraph {
    let mut g = SkillGraph::new("g", "G");
    g.nodes = vec![
        Node::new("S", NodeCategory::Core, "Start").as_start(),
        Node::new("A", NodeCategory::Core, "A"),
        Node::new("B", NodeCategory::Core, "B"),
    ];
    g.edges = requires.iter().map(|(s, t)| Edge::requires(*s, *t)).collect();
    g
}

#[test]
fn test_requires_into_start_wins_over_cycle() {
    let g = graph(&[("S", "A")]);
    let rejection = edge_addition_error(&g, EdgeType::Requires, "A", "S").unwrap();
    assert_eq!(rejection, EdgeRejection::RequiresIntoStart);
    assert_eq!(rejection.to_string(), "Start nodes cannot have prerequisites.");
}

#[test]
fn test_cycle_rejected() {
    let g = graph(&[("A", "B")]);
    assert_eq!(
        edge_addition_error(&g, EdgeType::Requires, "B", "A"),
        Some(EdgeRejection::WouldCreateCycle)
    );
}

#[test]
fn test_existing_cycle_does_not_block_new_edges() {
    let g = graph(&[("A", "B"), ("B", "A")]);
    assert_eq!(edge_addition_error(&g, EdgeType::Requires, "S", "A"), None);
    assert_eq!(edge_addition_error(&g, EdgeType::Requires, "S", "B"), None);
}

#[test]
fn test_same_pair_different_type_allowed() {
    let g = graph(&[("A", "B")]);
    assert_eq!(edge_addition_error(&g, EdgeType::Related, "A", "B"), None);
    assert_eq!(
        edge_addition_error(&g, EdgeType::Requires, "A", "B"),
        Some(EdgeRejection::AlreadyExists)
    );
}

#[test]
fn test_unknown_source() {
    let g = graph(&[]);
    assert_eq!(
        edge_addition_error(&g, EdgeType::Related, "ghost", "A"),
        Some(EdgeRejection::UnknownNode)
    );
}

#[test]
fn test_connectable_targets_for_related() {
    let g = graph(&[("A", "B")]);
    let targets = connectable_targets(&g, "B", EdgeType::Related);
    assert_eq!(targets.len(), 2);
    assert!(targets.iter().all(|t| t.is_connectable && t.reason.is_none()));
}

#[test]
fn test_connectable_targets_serialize_reason() {
    let g = graph(&[]);
    let targets = connectable_targets(&g, "A", EdgeType::Requires);
    let value = serde_json::to_value(&targets).unwrap();
    assert_eq!(value[0]["node"]["id"], "S");
    assert_eq!(value[0]["isConnectable"], false);
    assert_eq!(value[0]["reason"], "requires_into_start");
    assert!(value[1].get("reason").is_none());
}
