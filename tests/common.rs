//! Shared helpers for schema builder integration tests

#![allow(dead_code)]

use std::path::Path;

use schemaforge::builder::paths::SchemaPaths;
use schemaforge::Attribute;
use tempfile::TempDir;

pub fn schema_paths(root: &TempDir) -> SchemaPaths {
    SchemaPaths::new(
        root.path().join("src").join("api"),
        root.path().join("src").join("components"),
    )
}

pub fn attribute(value: serde_json::Value) -> Attribute {
    serde_json::from_value(value).expect("valid attribute payload")
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let contents = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&contents)
        .unwrap_or_else(|e| panic!("failed to parse {}: {}", path.display(), e))
}
