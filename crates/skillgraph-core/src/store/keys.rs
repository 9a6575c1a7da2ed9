//! Key construction for stored engine state.
//!
//! All keys share the configured namespace and use `:` as the separator:
//!
//! ```text
//! <ns>:author:skill-graph:draft:v1:<userId>:<graphId>
//! <ns>:skill-graph:published:v1:<graphId>
//! <ns>:skill-graph:published_latest:v1
//! <ns>:skill-graph:activeGraphId:v1
//! ```

use crate::config::DEFAULT_NAMESPACE;

/// Separator used between key segments.
const SEP: char = ':';

/// Builds every storage key for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    namespace: String,
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl StoreKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key for one author's draft of one graph.
    pub fn draft(&self, user_id: &str, graph_id: &str) -> String {
        format!(
            "{}{SEP}author{SEP}skill-graph{SEP}draft{SEP}v1{SEP}{}{SEP}{}",
            self.namespace, user_id, graph_id
        )
    }

    /// Key for the published snapshot collection of one graph.
    pub fn published(&self, graph_id: &str) -> String {
        format!("{}{SEP}skill-graph{SEP}published{SEP}v1{SEP}{}", self.namespace, graph_id)
    }

    /// Key for the single-slot latest snapshot.
    pub fn published_latest(&self) -> String {
        format!("{}{SEP}skill-graph{SEP}published_latest{SEP}v1", self.namespace)
    }

    /// Key for the active graph id pointer.
    pub fn active_graph_id(&self) -> String {
        format!("{}{SEP}skill-graph{SEP}activeGraphId{SEP}v1", self.namespace)
    }

    /// Prefix shared by every key in this namespace.
    pub fn prefix(&self) -> String {
        format!("{}{SEP}", self.namespace)
    }
}

/// Returns true if a draft key for these ids cannot collide with another
/// pair. Ids are joined unescaped, so neither may contain the separator.
pub(crate) fn draft_ids_are_keyable(user_id: &str, graph_id: &str) -> bool {
    !user_id.contains(SEP) && !graph_id.contains(SEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        let keys = StoreKeys::new("app");
        assert_eq!(keys.draft("u1", "g1"), "app:author:skill-graph:draft:v1:u1:g1");
        assert_eq!(keys.published("g1"), "app:skill-graph:published:v1:g1");
        assert_eq!(keys.published_latest(), "app:skill-graph:published_latest:v1");
        assert_eq!(keys.active_graph_id(), "app:skill-graph:activeGraphId:v1");
    }

    #[test]
    fn test_separator_in_ids_is_not_keyable() {
        let keys = StoreKeys::default();
        assert_eq!(keys.draft("a:b", "c"), keys.draft("a", "b:c"));
        assert!(!draft_ids_are_keyable("a:b", "c"));
        assert!(!draft_ids_are_keyable("a", "b:c"));
        assert!(draft_ids_are_keyable("a", "b"));
    }

    #[test]
    fn test_prefix_matches_all_keys() {
        let keys = StoreKeys::default();
        let pfx = keys.prefix();
        assert!(keys.draft("u", "g").starts_with(&pfx));
        assert!(keys.published("g").starts_with(&pfx));
        assert!(keys.published_latest().starts_with(&pfx));
        assert!(keys.active_graph_id().starts_with(&pfx));
    }
}
