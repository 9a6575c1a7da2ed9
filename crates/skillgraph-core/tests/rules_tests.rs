use skillgraph_core::rules::{self, find_requires_cycle, format_cycle};
use skillgraph_core::{Edge, EdgeType, Node, NodeCategory, RuleCode, Severity, SkillGraph, ValidationConfig, ValidationReport};

fn abc_cycle() -> SkillGraph {
    let mut g = SkillGraph::new("g", "G");
    g.nodes = vec![
        Node::new("A", NodeCategory::Core, "A").as_start(),
        Node::new("B", NodeCategory::Core, "B"),
        Node::new("C", NodeCategory::Core, "C"),
    ];
    g.edges = vec![Edge::requires("A", "B"), Edge::requires("B", "C"), Edge::requires("C", "A")];
    g
}

#[test]
fn test_cycle_reported_with_path() {
    let issues = rules::validate(&abc_cycle());
    let cycle = issues.iter().find(|i| i.code == RuleCode::RequiresCycle).unwrap();
    assert_eq!(cycle.severity, Severity::Error);
    assert!(cycle.message.contains("A -> B -> C -> A"));
    assert_eq!(cycle.cycle.as_deref().unwrap().len(), 4);
}

#[test]
fn test_basic_skips_cycle_detection() {
    let issues = rules::validate_basic(&abc_cycle());
    assert!(issues.iter().all(|i| i.code != RuleCode::RequiresCycle));
}

#[test]
fn test_start_incoming_requires_severity_follows_config() {
    let g = abc_cycle();
    let default = rules::validate_basic(&g);
    let issue = default.iter().find(|i| i.code == RuleCode::StartIncomingRequires).unwrap();
    assert_eq!(issue.severity, Severity::Warning);
    assert_eq!(issue.node_id.as_deref(), Some("A"));

    let strict = rules::validate_basic_with(&g, &ValidationConfig::strict());
    let issue = strict.iter().find(|i| i.code == RuleCode::StartIncomingRequires).unwrap();
    assert_eq!(issue.severity, Severity::Error);
}

#[test]
fn test_start_node_counts() {
    let mut g = SkillGraph::new("g", "G");
    g.nodes = vec![Node::new("a", NodeCategory::Core, "A"), Node::new("b", NodeCategory::Core, "B")];
    let report = ValidationReport::new(rules::validate(&g));
    assert!(report.has_code(RuleCode::NoStartNodes));
    assert!(report.is_valid());

    g.nodes = g.nodes.into_iter().map(Node::as_start).collect();
    let issues = rules::validate(&g);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, RuleCode::MultipleStartNodes);
    assert_eq!(issues[0].severity, Severity::Warning);
}

#[test]
fn test_duplicate_ids_reported_once_with_count() {
    let mut g = SkillGraph::new("g", "G");
    g.nodes = vec![
        Node::new("a", NodeCategory::Core, "A").as_start(),
        Node::new("a", NodeCategory::Core, "A2"),
        Node::new("a", NodeCategory::Core, "A3"),
    ];
    let issues = rules::validate(&g);
    let dups: Vec<_> = issues.iter().filter(|i| i.code == RuleCode::DuplicateNodeId).collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].count, Some(3));
}

#[test]
fn test_cycle_path_pinned_by_node_order() {
    let mut g = abc_cycle();
    g.nodes.rotate_left(1);
    assert_eq!(format_cycle(&find_requires_cycle(&g).unwrap()), "B -> C -> A -> B");
}

#[test]
fn test_only_requires_edges_form_cycles() {
    let mut g = abc_cycle();
    g.edges[2] = Edge::new(EdgeType::PreparesFor, "C", "A");
    assert!(find_requires_cycle(&g).is_none());
    let report = ValidationReport::for_graph(&g, &ValidationConfig::default());
    assert!(report.is_valid());
    assert_eq!(report.errors().count(), 0);
}

#[test]
fn test_issue_serializes_camel_case() {
    let issues = rules::validate(&abc_cycle());
    let value = serde_json::to_value(&issues).unwrap();
    let last = value.as_array().unwrap().last().unwrap();
    assert_eq!(last["code"], "requires_cycle");
    assert_eq!(last["severity"], "error");
    assert_eq!(last["nodeId"], "A");
}
