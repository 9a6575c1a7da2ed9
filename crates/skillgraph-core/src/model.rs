use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The only schema version tag this engine reads and writes.
pub const SCHEMA_VERSION: &str = "skill-graph/v1";

/// A skill-graph document: the unit of validation and versioning.
///
/// Documents are produced by [`crate::schema::parse`], which guarantees the
/// shape. Semantic invariants (acyclicity, start-node policy) are checked
/// separately by [`crate::rules`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGraph {
    /// Always [`SCHEMA_VERSION`] for a parsed document.
    pub schema_version: String,
    /// Identity of the document, stable across draft and publish cycles.
    pub graph_id: String,
    /// Display title.
    pub title: String,
    /// Nodes in document order.
    pub nodes: Vec<Node>,
    /// Edges in document order.
    pub edges: Vec<Edge>,
    /// Extension data (layout cache, curriculum provenance).
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl SkillGraph {
    /// Creates an empty document with the given identity.
    pub fn new(graph_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            graph_id: graph_id.into(),
            title: title.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            meta: Map::new(),
        }
    }

    /// Looks up a node by id (first occurrence).
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Returns true if a node with this id exists.
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Returns true if an edge with the same composite key exists.
    pub fn has_edge(&self, key: &EdgeKey) -> bool {
        self.edges.iter().any(|e| e.key() == *key)
    }

    /// Nodes flagged as entry points.
    pub fn start_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_start())
    }

    /// Cached layout positions written by the rendering layer, if any.
    ///
    /// Entries that are not `{x, y}` numbers are skipped.
    pub fn layout_positions(&self) -> Vec<(String, LayoutPosition)> {
        let Some(positions) = self
            .meta
            .get("layout")
            .and_then(|l| l.get("positions"))
            .and_then(Value::as_object)
        else {
            return Vec::new();
        };

        positions
            .iter()
            .filter_map(|(id, pos)| {
                let x = pos.get("x")?.as_f64()?;
                let y = pos.get("y")?.as_f64()?;
                Some((id.clone(), LayoutPosition { x, y }))
            })
            .collect()
    }

    /// Serializes the document to a JSON value.
    pub fn to_value(&self) -> Value {
        // A SkillGraph only holds strings, numbers, booleans and JSON maps.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A cached screen position for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPosition {
    pub x: f64,
    pub y: f64,
}

/// A skill node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub node_category: NodeCategory,
    pub label: String,
    /// Entry-point flag; absent rather than `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<bool>,
    /// Display ordering hint only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl Node {
    /// Creates a non-start node without an order hint.
    pub fn new(id: impl Into<String>, node_category: NodeCategory, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_category,
            label: label.into(),
            start: None,
            order: None,
        }
    }

    /// Builder-style helper marking the node as an entry point.
    pub fn as_start(mut self) -> Self {
        self.start = Some(true);
        self
    }

    pub fn is_start(&self) -> bool {
        self.start == Some(true)
    }
}

/// Category of a skill node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Core,
    Challenge,
    Formal,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 3] = [NodeCategory::Core, NodeCategory::Challenge, NodeCategory::Formal];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Core => "core",
            NodeCategory::Challenge => "challenge",
            NodeCategory::Formal => "formal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Kind of a relationship between two nodes.
///
/// Only [`EdgeType::Requires`] is subject to the acyclicity invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Requires,
    PreparesFor,
    Related,
    Contains,
}

impl EdgeType {
    pub const ALL: [EdgeType; 4] = [
        EdgeType::Requires,
        EdgeType::PreparesFor,
        EdgeType::Related,
        EdgeType::Contains,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Requires => "requires",
            EdgeType::PreparesFor => "prepares_for",
            EdgeType::Related => "related",
            EdgeType::Contains => "contains",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub edge_type: EdgeType,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(edge_type: EdgeType, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            edge_type,
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn requires(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(EdgeType::Requires, source, target)
    }

    /// The composite identity `(edgeType, source, target)`.
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            edge_type: self.edge_type,
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }

    /// The same edge with endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.edge_type, self.target.clone(), self.source.clone())
    }
}

/// Composite edge key used for identity and uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub edge_type: EdgeType,
    pub source: String,
    pub target: String,
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({} -> {})", self.edge_type, self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_serializes_camel_case_without_absent_fields() {
        let node = Node::new("fractions", NodeCategory::Core, "Fractions");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({"id": "fractions", "nodeCategory": "core", "label": "Fractions"})
        );
    }

    #[test]
    fn test_edge_type_names() {
        assert_eq!(EdgeType::parse("prepares_for"), Some(EdgeType::PreparesFor));
        assert_eq!(EdgeType::parse("Requires"), None);
        let value = serde_json::to_value(Edge::requires("a", "b")).unwrap();
        assert_eq!(value, json!({"edgeType": "requires", "source": "a", "target": "b"}));
    }

    #[test]
    fn test_layout_positions_skips_malformed_entries() {
        let mut graph = SkillGraph::new("g", "G");
        graph.meta.insert(
            "layout".to_string(),
            json!({"positions": {"a": {"x": 1.0, "y": 2.5}, "b": {"x": "oops"}}}),
        );
        let positions = graph.layout_positions();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].0, "a");
        assert_eq!(positions[0].1, LayoutPosition { x: 1.0, y: 2.5 });
    }
}
