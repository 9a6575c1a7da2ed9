//! Derives skill graphs from hierarchical curriculum documents.
//!
//! A curriculum is a flat list of nodes with `children_ids`. Each node becomes
//! a skill node and each parent/child link a `contains` edge. Merging into an
//! existing graph is an idempotent union, so repeated syncs of an unchanged
//! curriculum report `changed == false` and callers can skip the save.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{DEFAULT_CURRICULUM_GRAPH_ID, DEFAULT_CURRICULUM_TITLE, FORMAL_CURRICULUM_TYPE};
use crate::model::{Edge, EdgeType, Node, NodeCategory, SkillGraph};
use crate::schema::is_valid_node_id;

/// Curriculum loading errors.
#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("Failed to read curriculum: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid curriculum JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid curriculum YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// External curriculum document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumDoc {
    #[serde(default)]
    pub meta: CurriculumMeta,
    #[serde(default)]
    pub nodes: Vec<CurriculumNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curriculum_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub children_ids: Vec<String>,
}

impl CurriculumDoc {
    pub fn from_json(text: &str) -> Result<Self, CurriculumError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, CurriculumError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Loads a curriculum file, choosing YAML for `.yaml`/`.yml` and JSON
    /// otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CurriculumError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Graph id a built graph receives.
    pub fn graph_id(&self) -> String {
        self.meta
            .curriculum_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CURRICULUM_GRAPH_ID)
            .to_string()
    }
}

/// Maps a curriculum node type to a node category.
pub fn category_for_type(node_type: &str) -> NodeCategory {
    if node_type == FORMAL_CURRICULUM_TYPE {
        NodeCategory::Formal
    } else {
        NodeCategory::Core
    }
}

/// Builds a fresh graph from `doc`.
///
/// Nodes with an id the schema would reject, repeated ids, self-children and
/// children that do not resolve are skipped so the result always parses.
pub fn build_from_curriculum(doc: &CurriculumDoc) -> SkillGraph {
    let graph_id = doc.graph_id();
    let title = if graph_id == DEFAULT_CURRICULUM_GRAPH_ID {
        DEFAULT_CURRICULUM_TITLE.to_string()
    } else {
        title_from_id(&graph_id)
    };
    let mut graph = SkillGraph::new(graph_id, title);
    graph.meta.insert("curriculum".to_string(), provenance(&doc.meta));

    let mut seen: HashSet<&str> = HashSet::new();
    let kept: Vec<&CurriculumNode> = doc
        .nodes
        .iter()
        .filter(|n| is_valid_node_id(&n.id) && seen.insert(n.id.as_str()))
        .collect();

    for node in &kept {
        let label = match node.title.trim() {
            "" => node.id.clone(),
            title => title.to_string(),
        };
        graph
            .nodes
            .push(Node::new(node.id.clone(), category_for_type(&node.node_type), label));
    }

    for parent in &kept {
        for child in &parent.children_ids {
            if *child == parent.id || !seen.contains(child.as_str()) {
                continue;
            }
            let edge = Edge::new(EdgeType::Contains, parent.id.clone(), child.clone());
            if !graph.has_edge(&edge.key()) {
                graph.edges.push(edge);
            }
        }
    }

    graph
}

/// Result of [`merge_into`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub graph: SkillGraph,
    /// False exactly when nothing new was added.
    pub changed: bool,
}

/// Unions the curriculum into `existing`, appending only nodes and edges that
/// are not already present. Without an existing graph this is
/// [`build_from_curriculum`].
pub fn merge_into(existing: Option<&SkillGraph>, doc: &CurriculumDoc) -> MergeOutcome {
    let built = build_from_curriculum(doc);
    let Some(existing) = existing else {
        return MergeOutcome {
            graph: built,
            changed: true,
        };
    };

    let mut graph = existing.clone();
    let mut changed = false;
    for node in built.nodes {
        if !graph.has_node(&node.id) {
            graph.nodes.push(node);
            changed = true;
        }
    }
    for edge in built.edges {
        if !graph.has_edge(&edge.key()) {
            graph.edges.push(edge);
            changed = true;
        }
    }

    MergeOutcome { graph, changed }
}

fn provenance(meta: &CurriculumMeta) -> Value {
    let mut map = Map::new();
    let fields = [
        ("curriculumId", &meta.curriculum_id),
        ("schemaVersion", &meta.schema_version),
        ("locale", &meta.locale),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            map.insert(key.to_string(), Value::String(v.clone()));
        }
    }
    Value::Object(map)
}

/// `"grade-3_math"` becomes `"Grade 3 Math"`.
fn title_from_id(id: &str) -> String {
    let title = id
        .split(['-', '_', '.', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        id.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_id() {
        assert_eq!(title_from_id("grade-3_math"), "Grade 3 Math");
        assert_eq!(title_from_id("ccss.math"), "Ccss Math");
    }

    #[test]
    fn test_category_mapping() {
        assert_eq!(category_for_type("standard"), NodeCategory::Formal);
        assert_eq!(category_for_type("domain"), NodeCategory::Core);
        assert_eq!(category_for_type(""), NodeCategory::Core);
    }

    #[test]
    fn test_yaml_doc() {
        let doc = CurriculumDoc::from_yaml(
            "meta:\n  curriculum_id: ccss\nnodes:\n  - id: d1\n    type: domain\n    title: Numbers\n    children_ids: [s1]\n  - id: s1\n    type: standard\n    title: Count\n",
        )
        .unwrap();
        assert_eq!(doc.graph_id(), "ccss");
        assert_eq!(doc.nodes[1].children_ids, Vec::<String>::new());
    }
}
