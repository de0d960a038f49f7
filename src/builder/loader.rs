//! Registry seeding from persisted schema files
//!
//! Scans the api and components roots once at session start and parses every
//! schema document into the snapshot the registry is built from. Unparseable
//! files are skipped with a warning rather than failing the whole session;
//! the engine never reads the filesystem again mid-session.

use std::path::Path;

use log::{info, warn};

use crate::builder::paths::SchemaPaths;
use crate::builder::registry::RegistrySnapshot;
use crate::builder::types::EntitySchema;
use crate::error::BuilderResult;

/// Load every persisted entity definition under the configured roots.
pub fn load_snapshot(paths: &SchemaPaths) -> BuilderResult<RegistrySnapshot> {
    let mut snapshot = RegistrySnapshot::default();
    load_content_types(&paths.api_root, &mut snapshot);
    load_components(&paths.components_root, &mut snapshot);
    info!(
        "Seeded registry snapshot with {} content types and {} components",
        snapshot.content_types.len(),
        snapshot.components.len()
    );
    Ok(snapshot)
}

fn read_schema(path: &Path) -> Option<EntitySchema> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Skipping unreadable schema file {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str::<EntitySchema>(&contents) {
        Ok(schema) => Some(schema),
        Err(e) => {
            warn!("Skipping unparseable schema file {}: {}", path.display(), e);
            None
        }
    }
}

fn load_content_types(api_root: &Path, snapshot: &mut RegistrySnapshot) {
    let Ok(entries) = std::fs::read_dir(api_root) else {
        return;
    };
    for entry in entries.flatten() {
        let content_types_dir = entry.path().join("content-types");
        let Ok(inner) = std::fs::read_dir(&content_types_dir) else {
            continue;
        };
        for inner_entry in inner.flatten() {
            let file = inner_entry.path().join("schema.json");
            if !file.is_file() {
                continue;
            }
            let Some(singular) = inner_entry.file_name().to_str().map(|s| s.to_string()) else {
                continue;
            };
            if let Some(schema) = read_schema(&file) {
                let uid = format!("api::{}.{}", singular, singular);
                info!("Loaded content type '{}' from {}", uid, file.display());
                snapshot.content_types.insert(uid, schema);
            }
        }
    }
}

fn load_components(components_root: &Path, snapshot: &mut RegistrySnapshot) {
    let Ok(entries) = std::fs::read_dir(components_root) else {
        return;
    };
    for entry in entries.flatten() {
        let Some(category) = entry.file_name().to_str().map(|s| s.to_string()) else {
            continue;
        };
        let Ok(files) = std::fs::read_dir(entry.path()) else {
            continue;
        };
        for file_entry in files.flatten() {
            let path = file_entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if let Some(schema) = read_schema(&path) {
                    let uid = format!("{}.{}", category, name);
                    info!("Loaded component '{}' from {}", uid, path.display());
                    snapshot.components.insert(uid, schema);
                }
            }
        }
    }
}
