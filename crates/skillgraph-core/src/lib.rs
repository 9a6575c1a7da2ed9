pub mod advisor;
pub mod config;
pub mod curriculum;
pub mod editor;
pub mod model;
pub mod rules;
pub mod schema;
pub mod storage;
pub mod store;
pub mod workflow;

pub use advisor::{connectable_targets, edge_addition_error, ConnectableTarget, EdgeRejection};
pub use config::{Config, ConfigError, PublishMode, StoreConfig, ValidationConfig};
pub use curriculum::{build_from_curriculum, merge_into, CurriculumDoc, MergeOutcome};
pub use model::{Edge, EdgeKey, EdgeType, Node, NodeCategory, SkillGraph, SCHEMA_VERSION};
pub use rules::{RuleCode, Severity, ValidationIssue, ValidationReport};
pub use schema::{SchemaError, SchemaIssue, SchemaIssueCode};
pub use storage::{FileKv, KvStore, MemoryKv, StorageError};
pub use store::{
    DraftRecord, GraphStore, KvGraphStore, MemoryGraphStore, PublishOptions, PublishedCollection, PublishedSnapshot,
};
pub use workflow::{GraphWorkflow, SyncOutcome, WorkflowError};
