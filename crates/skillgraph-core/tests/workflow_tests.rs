use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use skillgraph_core::advisor::EdgeRejection;
use skillgraph_core::curriculum::CurriculumDoc;
use skillgraph_core::editor::NodeMetaUpdate;
use skillgraph_core::schema::SchemaIssueCode;
use skillgraph_core::{
    Config, Edge, EdgeType, FileKv, GraphWorkflow, KvGraphStore, MemoryGraphStore, NodeCategory, PublishOptions,
    RuleCode, Severity, WorkflowError,
};
use tempfile::TempDir;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn document() -> serde_json::Value {
    json!({
        "schemaVersion": "skill-graph/v1",
        "graphId": "g",
        "title": "G",
        "nodes": [
            {"id": "a", "nodeCategory": "core", "label": "A", "start": true},
            {"id": "b", "nodeCategory": "core", "label": "B"},
            {"id": "c", "nodeCategory": "core", "label": "C"}
        ],
        "edges": [
            {"edgeType": "requires", "source": "a", "target": "b"}
        ]
    })
}

fn create_test_workflow() -> GraphWorkflow<MemoryGraphStore> {
    let mut wf = GraphWorkflow::new(MemoryGraphStore::new());
    wf.import_document("u1", &document(), at(1)).unwrap();
    wf
}

#[test]
fn test_import_rejects_invalid_document() {
    let mut wf = GraphWorkflow::new(MemoryGraphStore::new());
    let mut doc = document();
    doc["edges"][0]["target"] = json!("ghost");
    match wf.import_document("u1", &doc, at(1)) {
        Err(WorkflowError::Schema(err)) => assert!(err.has_code(SchemaIssueCode::UnknownNodeRef)),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_connect_then_cycle_rejected() {
    let mut wf = create_test_workflow();
    let draft = wf.connect("u1", "g", EdgeType::Requires, "b", "c", at(2)).unwrap();
    assert_eq!(draft.graph.edges.len(), 2);
    assert_eq!(draft.updated_at, at(2));

    let err = wf.connect("u1", "g", EdgeType::Requires, "c", "a", at(3)).unwrap_err();
    assert!(matches!(err, WorkflowError::EdgeRejected(EdgeRejection::RequiresIntoStart)));
    let err = wf.connect("u1", "g", EdgeType::Requires, "c", "b", at(3)).unwrap_err();
    assert!(matches!(err, WorkflowError::EdgeRejected(EdgeRejection::WouldCreateCycle)));
}

#[test]
fn test_retype_and_reverse() {
    let mut wf = create_test_workflow();
    let draft = wf.retype("u1", "g", &Edge::requires("a", "b"), EdgeType::Related, at(2)).unwrap();
    assert_eq!(draft.graph.edges, vec![Edge::new(EdgeType::Related, "a", "b")]);

    let draft = wf.reverse("u1", "g", &Edge::new(EdgeType::Related, "a", "b"), at(3)).unwrap();
    assert_eq!(draft.graph.edges, vec![Edge::new(EdgeType::Related, "b", "a")]);
    assert_eq!(draft.created_at, at(1));
}

#[test]
fn test_node_meta_that_breaks_schema_is_refused() {
    let mut wf = create_test_workflow();
    let update = NodeMetaUpdate {
        node_category: NodeCategory::Core,
        start: true,
    };
    let err = wf.update_node_meta("u1", "g", "b", update, at(2)).unwrap_err();
    assert!(matches!(err, WorkflowError::Schema(_)));
    assert!(!wf.draft("u1", "g").unwrap().graph.node("b").unwrap().is_start());

    let draft = wf.update_node_meta("u1", "g", "c", update, at(3)).unwrap();
    assert!(draft.graph.node("c").unwrap().is_start());
}

#[test]
fn test_report_uses_configured_policy() {
    let mut wf = create_test_workflow();
    let update = NodeMetaUpdate {
        node_category: NodeCategory::Formal,
        start: true,
    };
    wf.update_node_meta("u1", "g", "c", update, at(2)).unwrap();

    let report = wf.validation_report("u1", "g").unwrap();
    assert!(report.is_valid());
    let warning = report.warnings().next().unwrap();
    assert_eq!(warning.code, RuleCode::MultipleStartNodes);
    assert_eq!(warning.severity, Severity::Warning);
}

#[test]
fn test_publish_and_student_graph() {
    let mut wf = create_test_workflow();
    assert!(wf.student_graph().is_none());

    let snapshot = wf
        .publish("u1", "g", at(5), PublishOptions::activate())
        .unwrap()
        .unwrap();
    assert_eq!(wf.student_graph().unwrap(), snapshot);

    wf.activate(None);
    assert!(wf.student_graph().is_none());

    let err = wf.publish("u2", "g", at(6), PublishOptions::default()).unwrap_err();
    assert!(matches!(err, WorkflowError::DraftNotFound { .. }));
}

#[test]
fn test_sync_curriculum_saves_only_on_change() {
    let temp = TempDir::new().unwrap();
    let config = Config::default();
    let store = KvGraphStore::with_config(FileKv::new(temp.path()), &config.store);
    let mut wf = GraphWorkflow::with_config(store, &config);

    let doc = CurriculumDoc::from_yaml(
        "meta:\n  curriculum_id: math\nnodes:\n  - id: d1\n    type: domain\n    title: Domain\n    children_ids: [s1]\n  - id: s1\n    type: standard\n    title: Standard\n",
    )
    .unwrap();

    let first = wf.sync_curriculum("u1", None, &doc, at(1)).unwrap();
    assert!(first.changed);
    assert_eq!(first.draft.graph_id, "math");

    let second = wf.sync_curriculum("u1", None, &doc, at(2)).unwrap();
    assert!(!second.changed);
    assert_eq!(second.draft.updated_at, at(1));

    let renamed = wf.sync_curriculum("u1", Some("math-custom"), &doc, at(3)).unwrap();
    assert!(renamed.changed);
    assert_eq!(renamed.draft.graph.graph_id, "math-custom");
    assert_eq!(renamed.draft.graph.edges.len(), 1);
}
