//! The per-session schema registry
//!
//! Holds every schema handle for the current edit session, keyed by UID and
//! split between content types and components. The registry is seeded from a
//! snapshot passed in at session start and never reads ambient state
//! mid-session; it exclusively owns all handles until the session ends.

use std::collections::HashMap;

use crate::builder::handle::SchemaHandle;
use crate::builder::types::{uid, EntitySchema, EntityType};
use crate::error::{BuilderError, BuilderResult};

/// Point-in-time view of the persisted model, the registry's only input.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    pub content_types: HashMap<String, EntitySchema>,
    pub components: HashMap<String, EntitySchema>,
}

/// A component that exists only in the incoming batch, identified by a
/// client-supplied temporary token until its final UID is computed.
#[derive(Debug, Clone)]
pub struct PendingComponent {
    pub tmp_uid: String,
    pub category: String,
    pub display_name: String,
}

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    content_types: HashMap<String, SchemaHandle>,
    components: HashMap<String, SchemaHandle>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one handle per pre-existing entity.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let content_types = snapshot
            .content_types
            .into_iter()
            .map(|(uid, schema)| {
                let handle = SchemaHandle::new_existing(uid.clone(), EntityType::ContentType, schema);
                (uid, handle)
            })
            .collect();
        let components = snapshot
            .components
            .into_iter()
            .map(|(uid, schema)| {
                let handle = SchemaHandle::new_existing(uid.clone(), EntityType::Component, schema);
                (uid, handle)
            })
            .collect();
        Self {
            content_types,
            components,
        }
    }

    /// UID uniqueness spans both maps combined.
    pub fn contains(&self, uid: &str) -> bool {
        self.content_types.contains_key(uid) || self.components.contains_key(uid)
    }

    pub fn content_type(&self, uid: &str) -> Option<&SchemaHandle> {
        self.content_types.get(uid)
    }

    pub fn content_type_mut(&mut self, uid: &str) -> Option<&mut SchemaHandle> {
        self.content_types.get_mut(uid)
    }

    pub fn component(&self, uid: &str) -> Option<&SchemaHandle> {
        self.components.get(uid)
    }

    pub fn component_mut(&mut self, uid: &str) -> Option<&mut SchemaHandle> {
        self.components.get_mut(uid)
    }

    pub fn handle(&self, uid: &str) -> Option<&SchemaHandle> {
        self.content_types.get(uid).or_else(|| self.components.get(uid))
    }

    pub fn handle_mut(&mut self, uid: &str) -> Option<&mut SchemaHandle> {
        if self.content_types.contains_key(uid) {
            self.content_types.get_mut(uid)
        } else {
            self.components.get_mut(uid)
        }
    }

    pub fn insert_content_type(&mut self, handle: SchemaHandle) -> BuilderResult<()> {
        let uid = handle.uid().to_string();
        if self.contains(&uid) {
            return Err(BuilderError::already_exists(uid));
        }
        self.content_types.insert(uid, handle);
        Ok(())
    }

    pub fn insert_component(&mut self, handle: SchemaHandle) -> BuilderResult<()> {
        let uid = handle.uid().to_string();
        if self.contains(&uid) {
            return Err(BuilderError::already_exists(uid));
        }
        self.components.insert(uid, handle);
        Ok(())
    }

    /// Move a component handle under a new UID, e.g. after a category rename.
    /// The handle itself keeps its initial UID so the writer can relocate the
    /// file.
    pub fn rekey_component(&mut self, old_uid: &str, new_uid: String) -> BuilderResult<()> {
        if self.contains(&new_uid) {
            return Err(BuilderError::already_exists(new_uid));
        }
        let mut handle = self
            .components
            .remove(old_uid)
            .ok_or_else(|| BuilderError::not_found(old_uid))?;
        handle.set_uid(new_uid.clone());
        self.components.insert(new_uid, handle);
        Ok(())
    }

    /// Drop a handle from the registry, used after a successful flush has
    /// removed its file.
    pub fn remove(&mut self, uid: &str) -> Option<SchemaHandle> {
        self.content_types
            .remove(uid)
            .or_else(|| self.components.remove(uid))
    }

    pub fn handles(&self) -> impl Iterator<Item = &SchemaHandle> {
        self.content_types.values().chain(self.components.values())
    }

    pub fn handles_mut(&mut self) -> impl Iterator<Item = &mut SchemaHandle> {
        self.content_types
            .values_mut()
            .chain(self.components.values_mut())
    }

    pub fn dirty_handles(&self) -> impl Iterator<Item = &SchemaHandle> {
        self.handles().filter(|handle| handle.is_dirty())
    }

    pub fn content_type_uids(&self) -> Vec<String> {
        let mut uids: Vec<String> = self.content_types.keys().cloned().collect();
        uids.sort();
        uids
    }

    pub fn component_uids(&self) -> Vec<String> {
        let mut uids: Vec<String> = self.components.keys().cloned().collect();
        uids.sort();
        uids
    }

    /// Distinct component categories currently registered, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .components
            .keys()
            .filter_map(|uid| uid::component_category(uid))
            .map(|category| category.to_string())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Deterministically compute the final UID of every not-yet-persisted
    /// component in a batch, keyed by temporary token, so sibling entities
    /// created together can reference each other before persistence. Two
    /// pending components resolving to the same UID collide.
    pub fn new_component_uid_map(
        &self,
        pending: &[PendingComponent],
    ) -> BuilderResult<HashMap<String, String>> {
        let mut map = HashMap::new();
        let mut seen: HashMap<String, String> = HashMap::new();
        for component in pending {
            let final_uid = uid::component_uid(&component.category, &component.display_name);
            if seen.contains_key(&final_uid) {
                return Err(BuilderError::already_exists(final_uid));
            }
            seen.insert(final_uid.clone(), component.tmp_uid.clone());
            map.insert(component.tmp_uid.clone(), final_uid);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::SchemaInfo;

    fn schema(display_name: &str) -> EntitySchema {
        EntitySchema::new(SchemaInfo {
            display_name: display_name.to_string(),
            ..SchemaInfo::default()
        })
    }

    #[test]
    fn uid_uniqueness_spans_both_maps() {
        let mut registry = SchemaRegistry::new();
        registry
            .insert_component(SchemaHandle::new_created(
                "default.seo".to_string(),
                EntityType::Component,
                schema("SEO"),
            ))
            .unwrap();
        let err = registry
            .insert_content_type(SchemaHandle::new_created(
                "default.seo".to_string(),
                EntityType::ContentType,
                schema("Seo"),
            ))
            .unwrap_err();
        assert!(matches!(err, BuilderError::AlreadyExists { .. }));
    }

    #[test]
    fn pending_uid_map_is_deterministic() {
        let registry = SchemaRegistry::new();
        let map = registry
            .new_component_uid_map(&[
                PendingComponent {
                    tmp_uid: "tmp-1".to_string(),
                    category: "Blocks".to_string(),
                    display_name: "Hero Banner".to_string(),
                },
                PendingComponent {
                    tmp_uid: "tmp-2".to_string(),
                    category: "Blocks".to_string(),
                    display_name: "Quote".to_string(),
                },
            ])
            .unwrap();
        assert_eq!(map["tmp-1"], "blocks.hero-banner");
        assert_eq!(map["tmp-2"], "blocks.quote");
    }

    #[test]
    fn pending_uid_collision_in_batch_is_rejected() {
        let registry = SchemaRegistry::new();
        let err = registry
            .new_component_uid_map(&[
                PendingComponent {
                    tmp_uid: "tmp-1".to_string(),
                    category: "Blocks".to_string(),
                    display_name: "Hero".to_string(),
                },
                PendingComponent {
                    tmp_uid: "tmp-2".to_string(),
                    category: "blocks".to_string(),
                    display_name: "hero".to_string(),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, BuilderError::AlreadyExists { .. }));
    }

    #[test]
    fn rekey_component_marks_the_move() {
        let mut registry = SchemaRegistry::new();
        registry
            .insert_component(SchemaHandle::new_existing(
                "default.seo".to_string(),
                EntityType::Component,
                schema("SEO"),
            ))
            .unwrap();
        registry
            .rekey_component("default.seo", "meta.seo".to_string())
            .unwrap();
        let handle = registry.component("meta.seo").unwrap();
        assert_eq!(handle.initial_uid(), "default.seo");
        assert!(handle.was_moved());
        assert!(registry.component("default.seo").is_none());
    }
}
