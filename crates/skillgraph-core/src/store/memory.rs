use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::{PublishMode, StoreConfig};
use crate::model::SkillGraph;

use super::keys::draft_ids_are_keyable;
use super::records::{next_draft, reparse, snapshot_from_draft, Listeners};
use super::{DraftListener, DraftRecord, GraphStore, PublishOptions, PublishedCollection, PublishedSnapshot};

/// Graph store over typed in-memory maps.
///
/// Behaves like [`super::KvGraphStore`] without serialization: stored graphs
/// are still re-validated on read and writes never fail.
#[derive(Default)]
pub struct MemoryGraphStore {
    mode: PublishMode,
    drafts: HashMap<(String, String), DraftRecord>,
    published: HashMap<String, PublishedCollection>,
    latest: Option<PublishedSnapshot>,
    active: Option<String>,
    listeners: Listeners,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: PublishMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self::with_mode(config.publish_mode)
    }

    fn draft_key(user_id: &str, graph_id: &str) -> (String, String) {
        (user_id.to_string(), graph_id.to_string())
    }
}

impl GraphStore for MemoryGraphStore {
    fn publish_mode(&self) -> PublishMode {
        self.mode
    }

    fn load_draft(&mut self, user_id: &str, graph_id: &str) -> Option<DraftRecord> {
        let key = Self::draft_key(user_id, graph_id);
        let draft = self.drafts.get(&key)?;
        match reparse(&draft.graph) {
            Some(graph) => Some(DraftRecord { graph, ..draft.clone() }),
            None => {
                tracing::warn!(user_id, graph_id, "Dropping draft that no longer parses");
                self.drafts.remove(&key);
                None
            }
        }
    }

    fn save_draft(&mut self, user_id: &str, graph: &SkillGraph, now: DateTime<Utc>) -> Option<DraftRecord> {
        if !draft_ids_are_keyable(user_id, &graph.graph_id) {
            tracing::warn!(user_id, graph_id = %graph.graph_id, "Refusing draft id containing ':'");
            return None;
        }
        let Some(graph) = reparse(graph) else {
            tracing::warn!(user_id, graph_id = %graph.graph_id, "Refusing to save schema-invalid draft");
            return None;
        };
        let key = Self::draft_key(user_id, &graph.graph_id);
        let record = next_draft(self.drafts.get(&key), user_id, graph, now);
        self.drafts.insert(key, record.clone());
        tracing::debug!(user_id, graph_id = %record.graph_id, "Saved draft");
        self.listeners.notify(&record);
        Some(record)
    }

    fn clear_draft(&mut self, user_id: &str, graph_id: &str) {
        self.drafts.remove(&Self::draft_key(user_id, graph_id));
    }

    fn publish_draft(
        &mut self,
        user_id: &str,
        graph_id: &str,
        now: DateTime<Utc>,
        options: PublishOptions,
    ) -> Option<PublishedSnapshot> {
        let draft = self.load_draft(user_id, graph_id)?;
        let snapshot = snapshot_from_draft(&draft, now, options.note)?;

        match self.mode {
            PublishMode::History => {
                self.published
                    .entry(graph_id.to_string())
                    .or_insert_with(|| PublishedCollection::new(graph_id))
                    .insert(snapshot.clone());
            }
            PublishMode::Latest => self.latest = Some(snapshot.clone()),
        }
        if options.set_active {
            self.active = Some(graph_id.to_string());
        }

        tracing::debug!(graph_id, published_id = %snapshot.published_id, "Published draft");
        Some(snapshot)
    }

    fn load_published(&mut self, graph_id: &str) -> Option<PublishedCollection> {
        self.published.get(graph_id).cloned()
    }

    fn clear_published(&mut self, graph_id: &str) {
        self.published.remove(graph_id);
    }

    fn active_graph_id(&mut self) -> Option<String> {
        self.active.clone()
    }

    fn set_active_graph_id(&mut self, graph_id: Option<&str>) {
        self.active = graph_id.map(str::to_string);
    }

    fn load_latest_slot(&mut self) -> Option<PublishedSnapshot> {
        self.latest.clone()
    }

    fn subscribe(&mut self, listener: DraftListener) {
        self.listeners.push(listener);
    }

    fn reset(&mut self) {
        self.drafts.clear();
        self.published.clear();
        self.latest = None;
        self.active = None;
    }
}
