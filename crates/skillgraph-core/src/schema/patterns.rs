//! Regex patterns for node ids and issue locators.

use std::sync::OnceLock;

use regex::Regex;

/// Allowed node id format.
pub const NODE_ID_PATTERN: &str = r"^[A-Za-z0-9._-]+$";

/// Issue path pointing into a node: `nodes[3]` or `nodes[3].label`.
const NODE_PATH_PATTERN: &str = r"^nodes\[(\d+)\]";

/// Issue path pointing at an edge endpoint: `edges[0].source`.
const ENDPOINT_PATH_PATTERN: &str = r"^edges\[(\d+)\]\.(source|target)$";

/// A quoted node id inside an issue message: `'fractions'`.
const QUOTED_ID_PATTERN: &str = r"'([A-Za-z0-9._-]+)'";

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Returns true if `id` is a well-formed node id.
pub fn is_valid_node_id(id: &str) -> bool {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match compiled(&RE, NODE_ID_PATTERN) {
        Some(re) => re.is_match(id),
        None => false,
    }
}

/// Index of the node an issue path points into.
pub(crate) fn node_index_in_path(path: &str) -> Option<usize> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let caps = compiled(&RE, NODE_PATH_PATTERN)?.captures(path)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Edge index and endpoint key an issue path points at.
pub(crate) fn endpoint_in_path(path: &str) -> Option<(usize, String)> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let caps = compiled(&RE, ENDPOINT_PATH_PATTERN)?.captures(path)?;
    let index = caps.get(1)?.as_str().parse().ok()?;
    Some((index, caps.get(2)?.as_str().to_string()))
}

/// First quoted node id in an issue message.
pub(crate) fn quoted_id_in_message(message: &str) -> Option<String> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let caps = compiled(&RE, QUOTED_ID_PATTERN)?.captures(message)?;
    Some(caps.get(1)?.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_format() {
        assert!(is_valid_node_id("fractions.add-1_b"));
        assert!(!is_valid_node_id(""));
        assert!(!is_valid_node_id(" padded "));
        assert!(!is_valid_node_id("has/slash"));
    }

    #[test]
    fn test_path_locators() {
        assert_eq!(node_index_in_path("nodes[12].label"), Some(12));
        assert_eq!(node_index_in_path("edges[1].source"), None);
        assert_eq!(endpoint_in_path("edges[4].target"), Some((4, "target".to_string())));
        assert_eq!(endpoint_in_path("edges[4].edgeType"), None);
        assert_eq!(quoted_id_in_message("Duplicate node id 'a.b'"), Some("a.b".to_string()));
    }
}
