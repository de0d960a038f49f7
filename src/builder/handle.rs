//! Schema handles: original-vs-draft state for one entity
//!
//! A handle wraps one entity's declarative definition for the duration of an
//! edit session. The initial snapshot is kept frozen for rollback; every
//! mutation goes through the draft and records the handle as modified. The
//! lifecycle is `Clean -> Modified -> (Deleted | Clean after flush)`; a
//! brand-new handle starts out modified because nothing on disk backs it yet.

use serde_json::{Map, Value};

use crate::builder::types::{Attribute, ContentTypeKind, EntitySchema, EntityType, SchemaInfo};
use crate::error::{BuilderError, BuilderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleStatus {
    #[default]
    Clean,
    Modified,
    Deleted,
}

/// Mutable wrapper around one entity's schema for the current edit session.
#[derive(Debug, Clone)]
pub struct SchemaHandle {
    uid: String,
    /// UID at session start; differs from `uid` after a rename, in which case
    /// the writer moves the file.
    initial_uid: String,
    entity_type: EntityType,
    /// Frozen pre-session snapshot, the rollback source. `None` for entities
    /// created this session.
    initial: Option<EntitySchema>,
    draft: EntitySchema,
    status: HandleStatus,
}

impl SchemaHandle {
    /// Handle for an entity seeded from persisted state.
    pub fn new_existing(uid: String, entity_type: EntityType, schema: EntitySchema) -> Self {
        Self {
            initial_uid: uid.clone(),
            uid,
            entity_type,
            initial: Some(schema.clone()),
            draft: schema,
            status: HandleStatus::Clean,
        }
    }

    /// Handle for an entity created during this session.
    pub fn new_created(uid: String, entity_type: EntityType, schema: EntitySchema) -> Self {
        Self {
            initial_uid: uid.clone(),
            uid,
            entity_type,
            initial: None,
            draft: schema,
            status: HandleStatus::Modified,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn initial_uid(&self) -> &str {
        &self.initial_uid
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn status(&self) -> HandleStatus {
        self.status
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.draft
    }

    pub fn initial(&self) -> Option<&EntitySchema> {
        self.initial.as_ref()
    }

    pub fn is_new(&self) -> bool {
        self.initial.is_none()
    }

    pub fn is_dirty(&self) -> bool {
        self.status != HandleStatus::Clean
    }

    pub fn is_deleted(&self) -> bool {
        self.status == HandleStatus::Deleted
    }

    /// The file moved if the UID changed during the session.
    pub fn was_moved(&self) -> bool {
        !self.is_new() && self.uid != self.initial_uid
    }

    fn touch(&mut self) {
        if self.status != HandleStatus::Deleted {
            self.status = HandleStatus::Modified;
        }
    }

    /// Structural read access by dotted path, e.g. `info.displayName`.
    pub fn get(&self, path: &str) -> Option<Value> {
        let document = serde_json::to_value(&self.draft).ok()?;
        let mut cursor = &document;
        for segment in path.split('.') {
            cursor = cursor.as_object()?.get(segment)?;
        }
        Some(cursor.clone())
    }

    /// Structural write access by dotted path, creating intermediate objects.
    pub fn set(&mut self, path: &str, new_value: Value) -> BuilderResult<()> {
        let mut document = serde_json::to_value(&self.draft).map_err(|e| {
            BuilderError::Serialize {
                uid: self.uid.clone(),
                source: e,
            }
        })?;
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| BuilderError::Application("Empty schema path".to_string()))?;
        let mut cursor = &mut document;
        for segment in parents {
            cursor = cursor
                .as_object_mut()
                .ok_or_else(|| {
                    BuilderError::Application(format!("Path `{}` is not an object", segment))
                })?
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        cursor
            .as_object_mut()
            .ok_or_else(|| BuilderError::Application(format!("Path `{}` is not an object", path)))?
            .insert((*last).to_string(), new_value);
        self.draft = serde_json::from_value(document).map_err(|e| BuilderError::Serialize {
            uid: self.uid.clone(),
            source: e,
        })?;
        self.touch();
        Ok(())
    }

    pub fn set_uid(&mut self, uid: String) {
        self.uid = uid;
        self.touch();
    }

    pub fn set_kind(&mut self, kind: ContentTypeKind) {
        self.draft.kind = Some(kind);
        self.touch();
    }

    pub fn set_collection_name(&mut self, collection_name: Option<String>) {
        self.draft.collection_name = collection_name;
        self.touch();
    }

    pub fn set_info(&mut self, info: SchemaInfo) {
        self.draft.info = info;
        self.touch();
    }

    pub fn set_options(&mut self, options: Map<String, Value>) {
        self.draft.options = options;
        self.touch();
    }

    pub fn set_plugin_options(&mut self, plugin_options: Map<String, Value>) {
        self.draft.plugin_options = plugin_options;
        self.touch();
    }

    pub fn set_config(&mut self, config: Map<String, Value>) {
        self.draft.config = config;
        self.touch();
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.draft.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: String, attribute: Attribute) {
        self.draft.set_attribute(key, attribute);
        self.touch();
    }

    pub fn delete_attribute(&mut self, key: &str) -> Option<Attribute> {
        let removed = self.draft.remove_attribute(key);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    pub fn mark_deleted(&mut self) {
        self.status = HandleStatus::Deleted;
    }

    /// Point every component, dynamic zone and relation reference at the new
    /// UID. Returns whether anything changed; an untouched handle stays clean.
    pub fn rename_component_references(&mut self, old_uid: &str, new_uid: &str) -> bool {
        let mut changed = false;
        for attribute in self.draft.attributes.values_mut() {
            match attribute {
                Attribute::Component(options) => {
                    if options.component == old_uid {
                        options.component = new_uid.to_string();
                        changed = true;
                    }
                }
                Attribute::Dynamiczone(options) => {
                    for entry in options.components.iter_mut() {
                        if entry == old_uid {
                            *entry = new_uid.to_string();
                            changed = true;
                        }
                    }
                }
                Attribute::Relation(options) => {
                    if options.target.as_deref() == Some(old_uid) {
                        options.target = Some(new_uid.to_string());
                        changed = true;
                    }
                }
                Attribute::String(_)
                | Attribute::Text(_)
                | Attribute::Richtext(_)
                | Attribute::Email(_)
                | Attribute::Password(_)
                | Attribute::Integer(_)
                | Attribute::Biginteger(_)
                | Attribute::Float(_)
                | Attribute::Decimal(_)
                | Attribute::Boolean(_)
                | Attribute::Date(_)
                | Attribute::Datetime(_)
                | Attribute::Time(_)
                | Attribute::Timestamp(_)
                | Attribute::Json(_)
                | Attribute::Enumeration(_)
                | Attribute::Uid(_) => {}
            }
        }
        if changed {
            self.touch();
        }
        changed
    }

    /// Strip every reference to a removed entity. A `component` attribute
    /// pointing at it is deleted, a `dynamiczone` has the UID filtered out of
    /// its list (order preserved; emptiness is validated upstream), and a
    /// relation targeting it is deleted since a dangling relation cannot be
    /// persisted.
    pub fn remove_references(&mut self, uid: &str) -> bool {
        let mut removed_keys: Vec<String> = Vec::new();
        let mut changed = false;
        for (key, attribute) in self.draft.attributes.iter_mut() {
            match attribute {
                Attribute::Component(options) => {
                    if options.component == uid {
                        removed_keys.push(key.clone());
                    }
                }
                Attribute::Dynamiczone(options) => {
                    let before = options.components.len();
                    options.components.retain(|entry| entry != uid);
                    if options.components.len() != before {
                        changed = true;
                    }
                }
                Attribute::Relation(options) => {
                    if options.target.as_deref() == Some(uid) {
                        removed_keys.push(key.clone());
                    }
                }
                Attribute::String(_)
                | Attribute::Text(_)
                | Attribute::Richtext(_)
                | Attribute::Email(_)
                | Attribute::Password(_)
                | Attribute::Integer(_)
                | Attribute::Biginteger(_)
                | Attribute::Float(_)
                | Attribute::Decimal(_)
                | Attribute::Boolean(_)
                | Attribute::Date(_)
                | Attribute::Datetime(_)
                | Attribute::Time(_)
                | Attribute::Timestamp(_)
                | Attribute::Json(_)
                | Attribute::Enumeration(_)
                | Attribute::Uid(_) => {}
            }
        }
        for key in &removed_keys {
            self.draft.attributes.remove(key);
            changed = true;
        }
        if changed {
            self.touch();
        }
        changed
    }

    /// Pretty JSON document for the draft, as flushed to disk.
    pub fn draft_document(&self) -> BuilderResult<String> {
        let mut document =
            serde_json::to_string_pretty(&self.draft).map_err(|e| BuilderError::Serialize {
                uid: self.uid.clone(),
                source: e,
            })?;
        document.push('\n');
        Ok(document)
    }

    /// Pretty JSON document for the initial snapshot, the rollback payload.
    pub fn initial_document(&self) -> BuilderResult<Option<String>> {
        match &self.initial {
            None => Ok(None),
            Some(schema) => {
                let mut document =
                    serde_json::to_string_pretty(schema).map_err(|e| BuilderError::Serialize {
                        uid: self.uid.clone(),
                        source: e,
                    })?;
                document.push('\n');
                Ok(Some(document))
            }
        }
    }

    /// After a successful flush the draft becomes the new original.
    pub fn finalize_commit(&mut self) {
        self.initial = Some(self.draft.clone());
        self.initial_uid = self.uid.clone();
        self.status = HandleStatus::Clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handle_with_attributes(attrs: Value) -> SchemaHandle {
        let schema: EntitySchema =
            serde_json::from_value(json!({ "info": { "displayName": "Page" }, "attributes": attrs }))
                .unwrap();
        SchemaHandle::new_existing("api::page.page".to_string(), EntityType::ContentType, schema)
    }

    #[test]
    fn mutators_set_modified_idempotently() {
        let mut handle = handle_with_attributes(json!({}));
        assert_eq!(handle.status(), HandleStatus::Clean);
        handle.set_collection_name(Some("pages".to_string()));
        assert_eq!(handle.status(), HandleStatus::Modified);
        handle.set_collection_name(Some("pages".to_string()));
        assert_eq!(handle.status(), HandleStatus::Modified);
    }

    #[test]
    fn get_and_set_follow_dotted_paths() {
        let mut handle = handle_with_attributes(json!({}));
        assert_eq!(handle.get("info.displayName"), Some(json!("Page")));
        handle.set("options.draftAndPublish", json!(true)).unwrap();
        assert_eq!(handle.get("options.draftAndPublish"), Some(json!(true)));
        assert!(handle.get("options.missing").is_none());
    }

    #[test]
    fn remove_references_handles_all_three_shapes() {
        let mut handle = handle_with_attributes(json!({
            "seo": { "type": "component", "component": "shared.seo" },
            "body": {
                "type": "dynamiczone",
                "components": ["shared.hero", "shared.seo", "shared.quote"]
            },
            "author": {
                "type": "relation",
                "relation": "oneWay",
                "target": "shared.seo"
            },
            "title": { "type": "string" }
        }));

        assert!(handle.remove_references("shared.seo"));
        assert!(handle.attribute("seo").is_none());
        assert!(handle.attribute("author").is_none());
        match handle.attribute("body").unwrap() {
            Attribute::Dynamiczone(dz) => {
                assert_eq!(dz.components, vec!["shared.hero", "shared.quote"]);
            }
            _ => panic!("expected dynamiczone"),
        }
        assert!(handle.attribute("title").is_some());
        assert_eq!(handle.status(), HandleStatus::Modified);
    }

    #[test]
    fn remove_references_without_match_keeps_handle_clean() {
        let mut handle = handle_with_attributes(json!({
            "title": { "type": "string" }
        }));
        assert!(!handle.remove_references("shared.seo"));
        assert_eq!(handle.status(), HandleStatus::Clean);
    }

    #[test]
    fn rename_preserves_every_reference() {
        let mut handle = handle_with_attributes(json!({
            "seo": { "type": "component", "component": "shared.seo", "repeatable": true },
            "body": { "type": "dynamiczone", "components": ["shared.seo", "shared.hero"] }
        }));
        assert!(handle.rename_component_references("shared.seo", "meta.seo"));
        match handle.attribute("seo").unwrap() {
            Attribute::Component(c) => assert_eq!(c.component, "meta.seo"),
            _ => panic!("expected component"),
        }
        match handle.attribute("body").unwrap() {
            Attribute::Dynamiczone(dz) => {
                assert_eq!(dz.components, vec!["meta.seo", "shared.hero"]);
            }
            _ => panic!("expected dynamiczone"),
        }
    }

    #[test]
    fn finalize_commit_freezes_the_draft() {
        let mut handle = handle_with_attributes(json!({}));
        handle.set_collection_name(Some("pages".to_string()));
        handle.finalize_commit();
        assert_eq!(handle.status(), HandleStatus::Clean);
        assert_eq!(
            handle.initial().unwrap().collection_name.as_deref(),
            Some("pages")
        );
    }
}
