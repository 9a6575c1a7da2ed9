use std::io::Write;

use skillgraph_core::config::{DEFAULT_DATA_DIR, DEFAULT_NAMESPACE};
use skillgraph_core::{Config, PublishMode, Severity};
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.store.namespace, DEFAULT_NAMESPACE);
    assert_eq!(config.store.data_dir, DEFAULT_DATA_DIR);
    assert_eq!(config.store.publish_mode, PublishMode::History);
}

#[test]
fn test_config_from_toml() {
    let toml_str = r#"
[store]
namespace = "school"
publish_mode = "latest"

[validation]
start_incoming_requires = "error"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.store.namespace, "school");
    assert_eq!(config.store.data_dir, DEFAULT_DATA_DIR);
    assert_eq!(config.store.publish_mode, PublishMode::Latest);
    assert_eq!(config.validation.start_incoming_requires, Severity::Error);
}

#[test]
fn test_default_config_string_round_trips() {
    let text = Config::default_config_string();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, Config::default());
}

#[test]
fn test_from_file_rejects_bad_toml() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[store\nnamespace = ").unwrap();
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_file_reads_values() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[store]\ndata_dir = \"/tmp/graphs\"").unwrap();
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.store.data_path(), std::path::PathBuf::from("/tmp/graphs"));
}
