use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::advisor::{edge_addition_error, EdgeRejection};
use crate::config::{Config, ValidationConfig};
use crate::curriculum::{merge_into, CurriculumDoc};
use crate::editor::{self, NodeMetaUpdate};
use crate::model::{Edge, EdgeType, SkillGraph};
use crate::rules::ValidationReport;
use crate::schema::{self, SchemaError};
use crate::store::{DraftRecord, GraphStore, PublishOptions, PublishedSnapshot};

/// Drives the author workflow: import, edit, validate, publish.
///
/// Every edit loads the draft, applies a pure editor operation and saves
/// only when the operation changed something. Timestamps are passed in.
pub struct GraphWorkflow<S: GraphStore> {
    store: S,
    validation: ValidationConfig,
}

/// Result of [`GraphWorkflow::sync_curriculum`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub draft: DraftRecord,
    /// False when the curriculum added nothing and no save happened.
    pub changed: bool,
}

impl<S: GraphStore> GraphWorkflow<S> {
    /// Creates a workflow with the default validation policy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            validation: ValidationConfig::default(),
        }
    }

    pub fn with_config(store: S, config: &Config) -> Self {
        Self {
            store,
            validation: config.validation.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Loads a draft or fails with [`WorkflowError::DraftNotFound`].
    pub fn draft(&mut self, user_id: &str, graph_id: &str) -> Result<DraftRecord, WorkflowError> {
        self.store
            .load_draft(user_id, graph_id)
            .ok_or_else(|| WorkflowError::DraftNotFound {
                user_id: user_id.to_string(),
                graph_id: graph_id.to_string(),
            })
    }

    /// Parses an untyped document and saves it as the author's draft.
    pub fn import_document(
        &mut self,
        user_id: &str,
        document: &Value,
        now: DateTime<Utc>,
    ) -> Result<DraftRecord, WorkflowError> {
        let graph = schema::parse(document)?;
        self.save(user_id, &graph, now)
    }

    /// Merges a curriculum into the draft, saving only when it added
    /// something. `graph_id` overrides the id derived from the curriculum.
    pub fn sync_curriculum(
        &mut self,
        user_id: &str,
        graph_id: Option<&str>,
        doc: &CurriculumDoc,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, WorkflowError> {
        let target = graph_id.map(str::to_string).unwrap_or_else(|| doc.graph_id());
        let existing = self.store.load_draft(user_id, &target);

        let mut outcome = merge_into(existing.as_ref().map(|d| &d.graph), doc);
        if let (false, Some(draft)) = (outcome.changed, existing) {
            tracing::debug!(user_id, graph_id = %target, "Curriculum unchanged, skipping save");
            return Ok(SyncOutcome { draft, changed: false });
        }

        outcome.graph.graph_id = target;
        let draft = self.save(user_id, &outcome.graph, now)?;
        Ok(SyncOutcome { draft, changed: true })
    }

    /// Adds an edge after the advisor accepts it.
    pub fn connect(
        &mut self,
        user_id: &str,
        graph_id: &str,
        edge_type: EdgeType,
        source: &str,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<DraftRecord, WorkflowError> {
        let draft = self.draft(user_id, graph_id)?;
        if let Some(rejection) = edge_addition_error(&draft.graph, edge_type, source, target) {
            return Err(WorkflowError::EdgeRejected(rejection));
        }
        let edge = Edge::new(edge_type, source, target);
        let next = owned(editor::add_edge(&draft.graph, &edge));
        self.commit(user_id, draft, next, now)
    }

    pub fn disconnect(
        &mut self,
        user_id: &str,
        graph_id: &str,
        edge: &Edge,
        now: DateTime<Utc>,
    ) -> Result<DraftRecord, WorkflowError> {
        let draft = self.draft(user_id, graph_id)?;
        let next = owned(editor::remove_edge(&draft.graph, edge));
        self.commit(user_id, draft, next, now)
    }

    pub fn reverse(
        &mut self,
        user_id: &str,
        graph_id: &str,
        edge: &Edge,
        now: DateTime<Utc>,
    ) -> Result<DraftRecord, WorkflowError> {
        let draft = self.draft(user_id, graph_id)?;
        let next = owned(editor::reverse_edge(&draft.graph, edge));
        self.commit(user_id, draft, next, now)
    }

    pub fn retype(
        &mut self,
        user_id: &str,
        graph_id: &str,
        edge: &Edge,
        next_type: EdgeType,
        now: DateTime<Utc>,
    ) -> Result<DraftRecord, WorkflowError> {
        let draft = self.draft(user_id, graph_id)?;
        let next = owned(editor::update_edge_type(&draft.graph, edge, next_type));
        self.commit(user_id, draft, next, now)
    }

    pub fn update_node_meta(
        &mut self,
        user_id: &str,
        graph_id: &str,
        node_id: &str,
        update: NodeMetaUpdate,
        now: DateTime<Utc>,
    ) -> Result<DraftRecord, WorkflowError> {
        let draft = self.draft(user_id, graph_id)?;
        let next = owned(editor::update_node_meta(&draft.graph, node_id, update));
        self.commit(user_id, draft, next, now)
    }

    /// Full rule validation of the draft under the configured policy.
    pub fn validation_report(&mut self, user_id: &str, graph_id: &str) -> Result<ValidationReport, WorkflowError> {
        let draft = self.draft(user_id, graph_id)?;
        Ok(ValidationReport::for_graph(&draft.graph, &self.validation))
    }

    /// Publishes the draft. `Ok(None)` means the store could not publish.
    pub fn publish(
        &mut self,
        user_id: &str,
        graph_id: &str,
        now: DateTime<Utc>,
        options: PublishOptions,
    ) -> Result<Option<PublishedSnapshot>, WorkflowError> {
        self.draft(user_id, graph_id)?;
        Ok(self.store.publish_draft(user_id, graph_id, now, options))
    }

    /// Points students at `graph_id`, or clears the pointer.
    pub fn activate(&mut self, graph_id: Option<&str>) {
        self.store.set_active_graph_id(graph_id);
    }

    pub fn student_graph(&mut self) -> Option<PublishedSnapshot> {
        self.store.load_student_graph()
    }

    fn commit(
        &mut self,
        user_id: &str,
        draft: DraftRecord,
        next: Option<SkillGraph>,
        now: DateTime<Utc>,
    ) -> Result<DraftRecord, WorkflowError> {
        match next {
            Some(graph) => self.save(user_id, &graph, now),
            None => Ok(draft),
        }
    }

    fn save(&mut self, user_id: &str, graph: &SkillGraph, now: DateTime<Utc>) -> Result<DraftRecord, WorkflowError> {
        // The store refuses schema-invalid drafts silently; surface the issues.
        schema::parse(&graph.to_value())?;
        self.store
            .save_draft(user_id, graph, now)
            .ok_or_else(|| WorkflowError::SaveFailed {
                graph_id: graph.graph_id.clone(),
            })
    }
}

fn owned(edit: Cow<'_, SkillGraph>) -> Option<SkillGraph> {
    match edit {
        Cow::Borrowed(_) => None,
        Cow::Owned(graph) => Some(graph),
    }
}

/// Errors that can occur in GraphWorkflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No draft of graph '{graph_id}' for user '{user_id}'")]
    DraftNotFound { user_id: String, graph_id: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Edge rejected: {0}")]
    EdgeRejected(EdgeRejection),

    #[error("Failed to save draft of graph '{graph_id}'")]
    SaveFailed { graph_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeCategory};
    use crate::store::MemoryGraphStore;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn create_test_workflow() -> GraphWorkflow<MemoryGraphStore> {
        let mut g = SkillGraph::new("g", "G");
        g.nodes = vec![
            Node::new("a", NodeCategory::Core, "A").as_start(),
            Node::new("b", NodeCategory::Core, "B"),
        ];
        let mut wf = GraphWorkflow::new(MemoryGraphStore::new());
        wf.import_document("u", &g.to_value(), at(1)).unwrap();
        wf
    }

    #[test]
    fn test_noop_edit_does_not_save() {
        let mut wf = create_test_workflow();
        let draft = wf.disconnect("u", "g", &Edge::requires("a", "b"), at(5)).unwrap();
        assert_eq!(draft.updated_at, at(1));
    }

    #[test]
    fn test_connect_rejection() {
        let mut wf = create_test_workflow();
        let err = wf.connect("u", "g", EdgeType::Requires, "b", "a", at(2)).unwrap_err();
        assert!(matches!(err, WorkflowError::EdgeRejected(EdgeRejection::RequiresIntoStart)));
    }

    #[test]
    fn test_missing_draft() {
        let mut wf = create_test_workflow();
        let err = wf.validation_report("u", "nope").unwrap_err();
        assert!(matches!(err, WorkflowError::DraftNotFound { .. }));
    }
}
