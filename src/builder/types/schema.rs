//! Entity schema documents
//!
//! One `EntitySchema` is the declarative definition persisted as a single
//! JSON document per entity. The UID is not part of the document; it is the
//! registry key, derived from the document's location on disk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::attributes::Attribute;
use super::uid::normalize_key;

/// Whether an entity is a content type or a reusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    ContentType,
    Component,
}

/// Content-type discriminator: one document vs a collection of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentTypeKind {
    SingleType,
    CollectionType,
}

/// Descriptive metadata for an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaInfo {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singular_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// The persisted declarative definition of one content type or component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySchema {
    /// Present on content types only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentTypeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub info: SchemaInfo,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub plugin_options: Map<String, Value>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

impl EntitySchema {
    pub fn new(info: SchemaInfo) -> Self {
        Self {
            info,
            ..Self::default()
        }
    }

    pub fn set_attribute(&mut self, key: String, attribute: Attribute) {
        self.attributes.insert(key, attribute);
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<Attribute> {
        self.attributes.remove(key)
    }

    /// The existing key that collides with `key` under normalized comparison,
    /// if any. `"coverImage"` and `"cover_image"` map to the same storage
    /// column and must not coexist.
    pub fn colliding_key(&self, key: &str) -> Option<&str> {
        let normalized = normalize_key(key);
        self.attributes
            .keys()
            .find(|existing| normalize_key(existing) == normalized)
            .map(|existing| existing.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_serializes_spec_fields_only_when_set() {
        let mut schema = EntitySchema::new(SchemaInfo {
            display_name: "Article".to_string(),
            singular_name: Some("article".to_string()),
            plural_name: Some("articles".to_string()),
            ..SchemaInfo::default()
        });
        schema.kind = Some(ContentTypeKind::CollectionType);
        schema.collection_name = Some("articles".to_string());

        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["kind"], json!("collectionType"));
        assert_eq!(value["collectionName"], json!("articles"));
        assert_eq!(value["info"]["displayName"], json!("Article"));
        assert!(value.get("options").is_none());
        assert!(value.get("pluginOptions").is_none());
    }

    #[test]
    fn colliding_key_uses_normalized_comparison() {
        let mut schema = EntitySchema::default();
        schema.set_attribute(
            "cover_image".to_string(),
            serde_json::from_value(json!({ "type": "string" })).unwrap(),
        );
        assert_eq!(schema.colliding_key("coverImage"), Some("cover_image"));
        assert_eq!(schema.colliding_key("title"), None);
    }
}
