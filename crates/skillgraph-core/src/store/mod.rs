//! Versioned draft/publish storage for skill graphs.
//!
//! Authors edit drafts keyed by `(userId, graphId)`. Publishing deep-copies a
//! draft into an immutable [`PublishedSnapshot`]; students read the newest
//! snapshot of the active graph id (or the single latest slot in
//! [`PublishMode::Latest`]).
//!
//! Store failures never propagate. Reads that hit an undecodable or
//! schema-invalid value delete it and report absence; failed writes log a
//! warning and surface as `None` or a no-op.
//!
//! Draft keys join the user and graph ids with `:`, so `save_draft` refuses
//! either id when it contains `:`.
//!
//! Publishing reads the collection, appends, then writes it back with no
//! locking, so two concurrent publishers to one graph id can lose an update.

mod keys;
mod kv;
mod memory;
mod records;

pub use keys::StoreKeys;
pub use kv::KvGraphStore;
pub use memory::MemoryGraphStore;
pub use records::{
    select_latest_published, select_student_snapshot, DraftListener, DraftRecord, DraftSaved, PublishOptions,
    PublishedCollection, PublishedSnapshot,
};

use chrono::{DateTime, Utc};

use crate::config::PublishMode;
use crate::model::SkillGraph;

/// Draft and publish operations over engine state.
///
/// Every operation that may write (including self-healing reads) takes
/// `&mut self`.
pub trait GraphStore {
    /// Snapshot retention mode of this store.
    fn publish_mode(&self) -> PublishMode;

    /// Loads the draft of `graph_id` owned by `user_id`.
    fn load_draft(&mut self, user_id: &str, graph_id: &str) -> Option<DraftRecord>;

    /// Saves `graph` as the draft for `(user_id, graph.graph_id)`.
    ///
    /// `createdAt` survives from the previous draft; `updatedAt` becomes
    /// `now`. Subscribers are notified after the write. Returns `None` when
    /// either id contains `:`, the graph fails schema validation, or the
    /// write fails.
    fn save_draft(&mut self, user_id: &str, graph: &SkillGraph, now: DateTime<Utc>) -> Option<DraftRecord>;

    fn clear_draft(&mut self, user_id: &str, graph_id: &str);

    /// Publishes the current draft as a new snapshot.
    ///
    /// Returns `None` when there is no draft, the draft no longer parses, or
    /// the write fails.
    fn publish_draft(
        &mut self,
        user_id: &str,
        graph_id: &str,
        now: DateTime<Utc>,
        options: PublishOptions,
    ) -> Option<PublishedSnapshot>;

    fn load_published(&mut self, graph_id: &str) -> Option<PublishedCollection>;

    fn clear_published(&mut self, graph_id: &str);

    fn active_graph_id(&mut self) -> Option<String>;

    /// Sets or clears the active graph id.
    fn set_active_graph_id(&mut self, graph_id: Option<&str>);

    /// Reads the single-slot snapshot written in [`PublishMode::Latest`].
    fn load_latest_slot(&mut self) -> Option<PublishedSnapshot>;

    /// Registers a callback for [`DraftSaved`] events.
    fn subscribe(&mut self, listener: DraftListener);

    /// Clears all engine state. Listeners stay registered.
    fn reset(&mut self);

    /// The snapshot students currently see.
    fn load_student_graph(&mut self) -> Option<PublishedSnapshot> {
        match self.publish_mode() {
            PublishMode::Latest => self.load_latest_slot(),
            PublishMode::History => {
                let active = self.active_graph_id()?;
                let collection = self.load_published(&active);
                select_student_snapshot(Some(&active), collection.as_ref()).cloned()
            }
        }
    }
}
