use proptest::prelude::*;
use skillgraph_core::advisor::edge_addition_error;
use skillgraph_core::editor::add_edge;
use skillgraph_core::rules::has_requires_cycle;
use skillgraph_core::{schema, Edge, EdgeRejection, EdgeType, Node, NodeCategory, SkillGraph};

const IDS: [&str; 5] = ["n0", "n1", "n2", "n3", "n4"];

fn edge_type() -> impl Strategy<Value = EdgeType> {
    prop::sample::select(EdgeType::ALL.to_vec())
}

fn arb_edges() -> impl Strategy<Value = Vec<(EdgeType, usize, usize)>> {
    prop::collection::vec((edge_type(), 0..IDS.len(), 0..IDS.len()), 0..12)
}

/// Graph without a start node, with distinct non-self edges.
fn build(edges: &[(EdgeType, usize, usize)]) -> SkillGraph {
    let mut g = SkillGraph::new("prop", "Prop");
    g.nodes = IDS.iter().map(|id| Node::new(*id, NodeCategory::Core, *id)).collect();
    for &(t, s, d) in edges {
        if s != d {
            g = add_edge(&g, &Edge::new(t, IDS[s], IDS[d])).into_owned();
        }
    }
    g
}

proptest! {
    #[test]
    fn add_edge_is_idempotent(edges in arb_edges(), t in edge_type(), s in 0..IDS.len(), d in 0..IDS.len()) {
        let g = build(&edges);
        let edge = Edge::new(t, IDS[s], IDS[d]);
        let once = add_edge(&g, &edge).into_owned();
        let twice = add_edge(&once, &edge).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn schema_round_trip(edges in arb_edges()) {
        let g = build(&edges);
        let parsed = schema::parse(&g.to_value()).unwrap();
        prop_assert_eq!(parsed, g);
    }

    #[test]
    fn accepted_requires_edge_keeps_graph_acyclic(edges in arb_edges(), s in 0..IDS.len(), d in 0..IDS.len()) {
        let g = build(&edges);
        prop_assume!(!has_requires_cycle(&g));
        if edge_addition_error(&g, EdgeType::Requires, IDS[s], IDS[d]).is_none() {
            let next = add_edge(&g, &Edge::requires(IDS[s], IDS[d]));
            prop_assert!(!has_requires_cycle(&next));
        }
    }

    #[test]
    fn existing_cycle_never_blocks_on_cycles(edges in arb_edges(), s in 0..IDS.len(), d in 0..IDS.len()) {
        let mut g = build(&edges);
        g = add_edge(&g, &Edge::requires("n0", "n1")).into_owned();
        g = add_edge(&g, &Edge::requires("n1", "n0")).into_owned();
        prop_assert!(has_requires_cycle(&g));
        let rejection = edge_addition_error(&g, EdgeType::Requires, IDS[s], IDS[d]);
        prop_assert_ne!(rejection, Some(EdgeRejection::WouldCreateCycle));
    }
}
