//! On-disk layout of schema definition files
//!
//! Content types live at
//! `<api-root>/<singularName>/content-types/<singularName>/schema.json`,
//! components at `<components-root>/<category>/<slug>.json`. Paths are
//! derived from UIDs only, so a renamed entity automatically resolves to its
//! new location and the writer can treat the old path as a removal.

use std::path::{Path, PathBuf};

use crate::builder::types::{uid, EntityType};
use crate::error::{BuilderError, BuilderResult};

#[derive(Debug, Clone)]
pub struct SchemaPaths {
    pub api_root: PathBuf,
    pub components_root: PathBuf,
}

impl SchemaPaths {
    pub fn new(api_root: impl Into<PathBuf>, components_root: impl Into<PathBuf>) -> Self {
        Self {
            api_root: api_root.into(),
            components_root: components_root.into(),
        }
    }

    /// Target file for one entity's schema document.
    pub fn schema_file(&self, entity_type: EntityType, entity_uid: &str) -> BuilderResult<PathBuf> {
        match entity_type {
            EntityType::ContentType => {
                let singular = uid::content_type_singular(entity_uid).ok_or_else(|| {
                    BuilderError::invalid_uid(entity_uid, "not a content-type UID")
                })?;
                Ok(self
                    .api_root
                    .join(singular)
                    .join("content-types")
                    .join(singular)
                    .join("schema.json"))
            }
            EntityType::Component => {
                let category = uid::component_category(entity_uid)
                    .ok_or_else(|| BuilderError::invalid_uid(entity_uid, "not a component UID"))?;
                let name = uid::component_name(entity_uid)
                    .ok_or_else(|| BuilderError::invalid_uid(entity_uid, "not a component UID"))?;
                Ok(self
                    .components_root
                    .join(category)
                    .join(format!("{}.json", name)))
            }
        }
    }

    /// The root directory a file's empty parents may be pruned up to,
    /// exclusive.
    pub fn prune_root(&self, entity_type: EntityType) -> &Path {
        match entity_type {
            EntityType::ContentType => &self.api_root,
            EntityType::Component => &self.components_root,
        }
    }
}
