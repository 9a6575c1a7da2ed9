//! Default values for skill-graph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Store Defaults
// ============================================================================

/// Default key namespace prefix for every stored entry.
pub const DEFAULT_NAMESPACE: &str = "skillgraph";

/// Default directory for the file-backed key/value store.
pub const DEFAULT_DATA_DIR: &str = ".skillgraph";

/// Extension of entry files written by the file-backed store.
pub const DEFAULT_ENTRY_EXTENSION: &str = "json";

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "skillgraph.toml";

/// Directory under the user config dir (`~/.config/<dir>/config.toml`).
pub const DEFAULT_USER_CONFIG_DIR: &str = "skillgraph";

// ============================================================================
// Curriculum Defaults
// ============================================================================

/// Graph id used when a curriculum document carries no `curriculum_id`.
pub const DEFAULT_CURRICULUM_GRAPH_ID: &str = "curriculum";

/// Title used when a curriculum document carries no `curriculum_id`.
pub const DEFAULT_CURRICULUM_TITLE: &str = "Curriculum";

/// Curriculum node type that maps to the `formal` category.
pub const FORMAL_CURRICULUM_TYPE: &str = "standard";
