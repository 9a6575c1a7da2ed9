//! Stored record types and the pure helpers shared by every store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{SkillGraph, SCHEMA_VERSION};
use crate::schema;

/// One author's working copy of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub user_id: String,
    pub graph_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub graph: SkillGraph,
}

/// An immutable published copy of a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedSnapshot {
    pub published_id: String,
    pub schema_version: String,
    pub graph_id: String,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub graph: SkillGraph,
}

/// Every snapshot published for one graph id, keyed by `publishedId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedCollection {
    pub graph_id: String,
    pub snapshots: BTreeMap<String, PublishedSnapshot>,
}

impl PublishedCollection {
    pub fn new(graph_id: impl Into<String>) -> Self {
        Self {
            graph_id: graph_id.into(),
            snapshots: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, snapshot: PublishedSnapshot) {
        self.snapshots.insert(snapshot.published_id.clone(), snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Options for [`super::GraphStore::publish_draft`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub note: Option<String>,
    /// Point the active graph id at the published graph.
    pub set_active: bool,
}

impl PublishOptions {
    pub fn activate() -> Self {
        Self {
            note: None,
            set_active: true,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Event emitted after every successful draft save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSaved {
    pub user_id: String,
    pub graph_id: String,
    pub updated_at: DateTime<Utc>,
}

/// Callback invoked with every [`DraftSaved`] event.
pub type DraftListener = Box<dyn FnMut(&DraftSaved)>;

/// Registered draft listeners, notified in subscription order.
#[derive(Default)]
pub(crate) struct Listeners(Vec<DraftListener>);

impl Listeners {
    pub(crate) fn push(&mut self, listener: DraftListener) {
        self.0.push(listener);
    }

    pub(crate) fn notify(&mut self, record: &DraftRecord) {
        let event = DraftSaved {
            user_id: record.user_id.clone(),
            graph_id: record.graph_id.clone(),
            updated_at: record.updated_at,
        };
        for listener in self.0.iter_mut() {
            listener(&event);
        }
    }
}

/// Returns the newest snapshot: greatest `publishedAt`, ties broken by the
/// greater `publishedId`.
pub fn select_latest_published(collection: &PublishedCollection) -> Option<&PublishedSnapshot> {
    collection.snapshots.values().max_by(|a, b| {
        a.published_at
            .cmp(&b.published_at)
            .then_with(|| a.published_id.cmp(&b.published_id))
    })
}

/// Picks the snapshot students see for the active graph id.
///
/// Returns `None` when there is no active id, no collection, or the
/// collection belongs to another graph.
pub fn select_student_snapshot<'a>(
    active_graph_id: Option<&str>,
    collection: Option<&'a PublishedCollection>,
) -> Option<&'a PublishedSnapshot> {
    let active = active_graph_id?;
    let collection = collection?;
    if collection.graph_id != active {
        return None;
    }
    select_latest_published(collection)
}

/// Deep-copies `graph` through its JSON form, re-running schema validation.
pub(crate) fn reparse(graph: &SkillGraph) -> Option<SkillGraph> {
    schema::parse(&graph.to_value()).ok()
}

/// Builds the draft record for a save, keeping `createdAt` from `previous`.
pub(crate) fn next_draft(
    previous: Option<&DraftRecord>,
    user_id: &str,
    graph: SkillGraph,
    now: DateTime<Utc>,
) -> DraftRecord {
    DraftRecord {
        user_id: user_id.to_string(),
        graph_id: graph.graph_id.clone(),
        created_at: previous.map(|d| d.created_at).unwrap_or(now),
        updated_at: now,
        graph,
    }
}

/// Snapshots a draft under a fresh `publishedId`.
pub(crate) fn snapshot_from_draft(
    draft: &DraftRecord,
    published_at: DateTime<Utc>,
    note: Option<String>,
) -> Option<PublishedSnapshot> {
    let graph = reparse(&draft.graph)?;
    Some(PublishedSnapshot {
        published_id: uuid::Uuid::new_v4().to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        graph_id: draft.graph_id.clone(),
        published_at,
        note,
        graph,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
    user_id: String,
    graph_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    graph: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    published_id: String,
    schema_version: String,
    graph_id: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    note: Option<String>,
    graph: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCollection {
    graph_id: String,
    snapshots: BTreeMap<String, RawSnapshot>,
}

/// Decodes a stored draft, rejecting graphs that fail schema validation.
pub(crate) fn decode_draft(text: &str) -> Option<DraftRecord> {
    let raw: RawDraft = serde_json::from_str(text).ok()?;
    let graph = schema::parse(&raw.graph).ok()?;
    if graph.graph_id != raw.graph_id {
        return None;
    }
    Some(DraftRecord {
        user_id: raw.user_id,
        graph_id: raw.graph_id,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        graph,
    })
}

fn decode_raw_snapshot(raw: RawSnapshot) -> Option<PublishedSnapshot> {
    if raw.schema_version != SCHEMA_VERSION {
        return None;
    }
    let graph = schema::parse(&raw.graph).ok()?;
    Some(PublishedSnapshot {
        published_id: raw.published_id,
        schema_version: raw.schema_version,
        graph_id: raw.graph_id,
        published_at: raw.published_at,
        note: raw.note,
        graph,
    })
}

pub(crate) fn decode_snapshot(text: &str) -> Option<PublishedSnapshot> {
    decode_raw_snapshot(serde_json::from_str(text).ok()?)
}

/// Decodes a stored collection. One bad snapshot rejects the whole value.
pub(crate) fn decode_collection(text: &str) -> Option<PublishedCollection> {
    let raw: RawCollection = serde_json::from_str(text).ok()?;
    let mut collection = PublishedCollection::new(raw.graph_id);
    for (id, raw_snapshot) in raw.snapshots {
        let snapshot = decode_raw_snapshot(raw_snapshot)?;
        if snapshot.published_id != id || snapshot.graph_id != collection.graph_id {
            return None;
        }
        collection.insert(snapshot);
    }
    Some(collection)
}
