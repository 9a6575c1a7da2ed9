use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{PublishMode, StoreConfig};
use crate::model::SkillGraph;
use crate::storage::{KvStore, StorageError};

use super::keys::{draft_ids_are_keyable, StoreKeys};
use super::records::{
    decode_collection, decode_draft, decode_snapshot, next_draft, reparse, snapshot_from_draft, Listeners,
};
use super::{DraftListener, DraftRecord, GraphStore, PublishOptions, PublishedCollection, PublishedSnapshot};

/// Graph store persisting JSON values in a [`KvStore`].
pub struct KvGraphStore<S: KvStore> {
    kv: S,
    keys: StoreKeys,
    mode: PublishMode,
    listeners: Listeners,
}

impl<S: KvStore> KvGraphStore<S> {
    /// Creates a store with the default namespace and history mode.
    pub fn new(kv: S) -> Self {
        Self::with_config(kv, &StoreConfig::default())
    }

    pub fn with_config(kv: S, config: &StoreConfig) -> Self {
        Self {
            kv,
            keys: StoreKeys::new(config.namespace.clone()),
            mode: config.publish_mode,
            listeners: Listeners::default(),
        }
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    /// Direct access to the backing store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    pub fn into_inner(self) -> S {
        self.kv
    }

    /// Reads and decodes `key`, deleting values that fail to decode.
    fn read<T>(&mut self, key: &str, decode: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let text = match self.kv.get(key) {
            Ok(text) => text?,
            Err(e @ StorageError::CorruptEntry(_)) => {
                tracing::warn!(key, error = %e, "Deleting corrupt store entry");
                self.delete(key);
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read store entry");
                return None;
            }
        };

        let decoded = decode(&text);
        if decoded.is_none() {
            tracing::warn!(key, "Deleting corrupt store entry");
            self.delete(key);
        }
        decoded
    }

    /// Serializes and writes `value`; returns false on failure.
    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode store entry");
                return false;
            }
        };
        match self.kv.set(key, &text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to write store entry");
                false
            }
        }
    }

    fn delete(&mut self, key: &str) {
        if let Err(e) = self.kv.remove(key) {
            tracing::warn!(key, error = %e, "Failed to delete store entry");
        }
    }
}

impl<S: KvStore> GraphStore for KvGraphStore<S> {
    fn publish_mode(&self) -> PublishMode {
        self.mode
    }

    fn load_draft(&mut self, user_id: &str, graph_id: &str) -> Option<DraftRecord> {
        let key = self.keys.draft(user_id, graph_id);
        self.read(&key, decode_draft)
            .filter(|d| d.user_id == user_id && d.graph_id == graph_id)
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
        let previous = self.load_draft(user_id, &graph.graph_id);
        let record = next_draft(previous.as_ref(), user_id, graph, now);

        let key = self.keys.draft(user_id, &record.graph_id);
        if !self.write(&key, &record) {
            return None;
        }
        tracing::debug!(user_id, graph_id = %record.graph_id, "Saved draft");
        self.listeners.notify(&record);
        Some(record)
    }

    fn clear_draft(&mut self, user_id: &str, graph_id: &str) {
        let key = self.keys.draft(user_id, graph_id);
        self.delete(&key);
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

        let written = match self.mode {
            PublishMode::History => {
                let mut collection = self
                    .load_published(graph_id)
                    .unwrap_or_else(|| PublishedCollection::new(graph_id));
                collection.insert(snapshot.clone());
                let key = self.keys.published(graph_id);
                self.write(&key, &collection)
            }
            PublishMode::Latest => {
                let key = self.keys.published_latest();
                self.write(&key, &snapshot)
            }
        };
        if !written {
            return None;
        }
        if options.set_active {
            self.set_active_graph_id(Some(graph_id));
        }

        tracing::debug!(graph_id, published_id = %snapshot.published_id, "Published draft");
        Some(snapshot)
    }

    fn load_published(&mut self, graph_id: &str) -> Option<PublishedCollection> {
        let key = self.keys.published(graph_id);
        self.read(&key, decode_collection)
    }

    fn clear_published(&mut self, graph_id: &str) {
        let key = self.keys.published(graph_id);
        self.delete(&key);
    }

    fn active_graph_id(&mut self) -> Option<String> {
        let key = self.keys.active_graph_id();
        self.read(&key, |text| {
            serde_json::from_str::<String>(text).ok().filter(|id| !id.is_empty())
        })
    }

    fn set_active_graph_id(&mut self, graph_id: Option<&str>) {
        let key = self.keys.active_graph_id();
        match graph_id {
            Some(id) => {
                self.write(&key, &id);
            }
            None => self.delete(&key),
        }
    }

    fn load_latest_slot(&mut self) -> Option<PublishedSnapshot> {
        let key = self.keys.published_latest();
        self.read(&key, decode_snapshot)
    }

    fn subscribe(&mut self, listener: DraftListener) {
        self.listeners.push(listener);
    }

    fn reset(&mut self) {
        let prefix = self.keys.prefix();
        let keys = match self.kv.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list store keys");
                return;
            }
        };
        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            self.delete(key);
        }
    }
}
