//! Builder orchestration: the public create/edit/delete surface
//!
//! This module sequences registry mutations, relation synthesis and cascade
//! resolution so the registry stays globally consistent across a batch of
//! operations. Payload shape is validated upstream; the orchestrator only
//! enforces the engine's own structural invariants (UID uniqueness, relation
//! target existence, component reference validity).

use std::collections::BTreeSet;

use log::info;
use serde_json::{Map, Value};

use crate::builder::cascade;
use crate::builder::registry::{RegistrySnapshot, SchemaRegistry};
use crate::builder::synthesizer;
use crate::builder::types::{
    uid, Attribute, ContentTypeKind, EntitySchema, EntityType, RelationOptions, SchemaInfo,
};
use crate::builder::handle::SchemaHandle;
use crate::error::{BuilderError, BuilderResult};

/// Payload for creating a content type. An explicit `uid` is accepted only
/// when it matches the deterministic derivation from the singular name.
#[derive(Debug, Clone)]
pub struct ContentTypeDefinition {
    pub uid: Option<String>,
    pub kind: ContentTypeKind,
    pub info: SchemaInfo,
    pub collection_name: Option<String>,
    pub options: Map<String, Value>,
    pub plugin_options: Map<String, Value>,
    pub config: Map<String, Value>,
    pub attributes: Vec<(String, Attribute)>,
}

impl ContentTypeDefinition {
    pub fn new(kind: ContentTypeKind, display_name: impl Into<String>) -> Self {
        Self {
            uid: None,
            kind,
            info: SchemaInfo {
                display_name: display_name.into(),
                ..SchemaInfo::default()
            },
            collection_name: None,
            options: Map::new(),
            plugin_options: Map::new(),
            config: Map::new(),
            attributes: Vec::new(),
        }
    }
}

/// Payload for creating a component inside a category.
#[derive(Debug, Clone)]
pub struct ComponentDefinition {
    pub uid: Option<String>,
    pub category: String,
    pub info: SchemaInfo,
    pub collection_name: Option<String>,
    pub options: Map<String, Value>,
    pub plugin_options: Map<String, Value>,
    pub config: Map<String, Value>,
    pub attributes: Vec<(String, Attribute)>,
}

impl ComponentDefinition {
    pub fn new(category: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            uid: None,
            category: category.into(),
            info: SchemaInfo {
                display_name: display_name.into(),
                ..SchemaInfo::default()
            },
            collection_name: None,
            options: Map::new(),
            plugin_options: Map::new(),
            config: Map::new(),
            attributes: Vec::new(),
        }
    }
}

/// Partial edit payload; `None` fields are left untouched. `attributes`
/// replaces the configurable attribute set wholesale when present: keys
/// absent from it are deletions, unknown keys are creations.
#[derive(Debug, Clone, Default)]
pub struct EditDefinition {
    pub kind: Option<ContentTypeKind>,
    pub category: Option<String>,
    pub info: Option<SchemaInfo>,
    pub collection_name: Option<String>,
    pub options: Option<Map<String, Value>>,
    pub plugin_options: Option<Map<String, Value>>,
    pub config: Option<Map<String, Value>>,
    pub attributes: Option<Vec<(String, Attribute)>>,
}

/// What an edit did, for collaborators that care about kind changes and
/// UID moves.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    /// Final UID, which differs from the input after a category move.
    pub uid: String,
    pub kind_changed: bool,
}

/// The public API surface over one edit session's registry.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    registry: SchemaRegistry,
}

impl SchemaBuilder {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            registry: SchemaRegistry::from_snapshot(snapshot),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> SchemaRegistry {
        self.registry
    }

    /// Create a content type with a deterministic UID and install its
    /// attributes, synthesizing relation counterparts as needed.
    pub fn create_content_type(
        &mut self,
        definition: ContentTypeDefinition,
    ) -> BuilderResult<String> {
        let singular = definition
            .info
            .singular_name
            .clone()
            .unwrap_or_else(|| uid::slugify(&definition.info.display_name));
        let derived = uid::content_type_uid(&singular);
        if let Some(explicit) = &definition.uid {
            if explicit != &derived {
                return Err(BuilderError::invalid_uid(
                    explicit.as_str(),
                    format!("does not match the derived UID `{}`", derived),
                ));
            }
        }
        if self.registry.contains(&derived) {
            return Err(BuilderError::already_exists(derived));
        }

        let singular_slug = uid::slugify(&singular);
        let plural = definition
            .info
            .plural_name
            .clone()
            .unwrap_or_else(|| format!("{}s", singular_slug));
        let mut schema = EntitySchema::new(SchemaInfo {
            singular_name: Some(singular_slug),
            plural_name: Some(uid::slugify(&plural)),
            ..definition.info
        });
        schema.kind = Some(definition.kind);
        schema.collection_name = Some(
            definition
                .collection_name
                .unwrap_or_else(|| uid::slugify(&plural).replace('-', "_")),
        );
        schema.options = definition.options;
        schema.plugin_options = definition.plugin_options;
        schema.config = definition.config;

        self.registry.insert_content_type(SchemaHandle::new_created(
            derived.clone(),
            EntityType::ContentType,
            schema,
        ))?;
        info!("Created content type '{}'", derived);
        self.create_attributes(&derived, definition.attributes)?;
        Ok(derived)
    }

    /// Create a component with a deterministic `category.name` UID.
    pub fn create_component(&mut self, definition: ComponentDefinition) -> BuilderResult<String> {
        let derived = uid::component_uid(&definition.category, &definition.info.display_name);
        if let Some(explicit) = &definition.uid {
            if explicit != &derived {
                return Err(BuilderError::invalid_uid(
                    explicit.as_str(),
                    format!("does not match the derived UID `{}`", derived),
                ));
            }
        }
        if self.registry.contains(&derived) {
            return Err(BuilderError::already_exists(derived));
        }

        let category_slug = uid::slugify(&definition.category);
        let name_slug = uid::slugify(&definition.info.display_name);
        let mut schema = EntitySchema::new(definition.info);
        schema.collection_name = Some(definition.collection_name.unwrap_or_else(|| {
            format!(
                "components_{}_{}s",
                category_slug.replace('-', "_"),
                name_slug.replace('-', "_")
            )
        }));
        schema.options = definition.options;
        schema.plugin_options = definition.plugin_options;
        schema.config = definition.config;

        self.registry.insert_component(SchemaHandle::new_created(
            derived.clone(),
            EntityType::Component,
            schema,
        ))?;
        info!("Created component '{}'", derived);
        self.create_attributes(&derived, definition.attributes)?;
        Ok(derived)
    }

    /// Install a batch of attributes on an entity, in payload order. Relation
    /// attributes go through the synthesizer; the first symmetric
    /// self-referencing side processed stays dominant.
    pub fn create_attributes(
        &mut self,
        entity_uid: &str,
        attributes: Vec<(String, Attribute)>,
    ) -> BuilderResult<()> {
        if !self.registry.contains(entity_uid) {
            return Err(BuilderError::not_found(entity_uid));
        }
        for (key, attribute) in attributes {
            self.install_attribute(entity_uid, &key, attribute)?;
        }
        Ok(())
    }

    /// Apply a partial edit to a content type, diffing the attribute set per
    /// the relation transition rules.
    pub fn edit_content_type(
        &mut self,
        entity_uid: &str,
        definition: EditDefinition,
    ) -> BuilderResult<EditOutcome> {
        let previous_kind = {
            let handle = self
                .registry
                .content_type(entity_uid)
                .ok_or_else(|| BuilderError::not_found(entity_uid))?;
            handle.schema().kind
        };
        let kind_changed = matches!(
            (previous_kind, definition.kind),
            (Some(previous), Some(next)) if previous != next
        );
        {
            let handle = self
                .registry
                .content_type_mut(entity_uid)
                .ok_or_else(|| BuilderError::not_found(entity_uid))?;
            if let Some(kind) = definition.kind {
                handle.set_kind(kind);
            }
            if let Some(info) = definition.info {
                handle.set_info(info);
            }
            if let Some(collection_name) = definition.collection_name {
                handle.set_collection_name(Some(collection_name));
            }
            if let Some(options) = definition.options {
                handle.set_options(options);
            }
            if let Some(plugin_options) = definition.plugin_options {
                handle.set_plugin_options(plugin_options);
            }
            if let Some(config) = definition.config {
                handle.set_config(config);
            }
        }
        if let Some(attributes) = definition.attributes {
            self.diff_attributes(entity_uid, attributes)?;
        }
        info!("Edited content type '{}'", entity_uid);
        Ok(EditOutcome {
            uid: entity_uid.to_string(),
            kind_changed,
        })
    }

    /// Apply a partial edit to a component. A category change re-keys the
    /// component under its new UID and cascades the rename across the
    /// registry before any attribute work happens.
    pub fn edit_component(
        &mut self,
        entity_uid: &str,
        definition: EditDefinition,
    ) -> BuilderResult<EditOutcome> {
        if self.registry.component(entity_uid).is_none() {
            return Err(BuilderError::not_found(entity_uid));
        }
        let mut working_uid = entity_uid.to_string();
        if let Some(new_category) = &definition.category {
            let new_category_slug = uid::slugify(new_category);
            let current_category = uid::component_category(entity_uid)
                .ok_or_else(|| BuilderError::invalid_uid(entity_uid, "not a component UID"))?
                .to_string();
            if new_category_slug != current_category {
                let name = uid::component_name(entity_uid)
                    .ok_or_else(|| BuilderError::invalid_uid(entity_uid, "not a component UID"))?
                    .to_string();
                let new_uid = format!("{}.{}", new_category_slug, name);
                self.registry.rekey_component(entity_uid, new_uid.clone())?;
                cascade::on_component_renamed(&mut self.registry, entity_uid, &new_uid);
                working_uid = new_uid;
            }
        }
        {
            let handle = self
                .registry
                .component_mut(&working_uid)
                .ok_or_else(|| BuilderError::not_found(working_uid.as_str()))?;
            if let Some(info) = definition.info {
                handle.set_info(info);
            }
            if let Some(collection_name) = definition.collection_name {
                handle.set_collection_name(Some(collection_name));
            }
            if let Some(options) = definition.options {
                handle.set_options(options);
            }
            if let Some(plugin_options) = definition.plugin_options {
                handle.set_plugin_options(plugin_options);
            }
            if let Some(config) = definition.config {
                handle.set_config(config);
            }
        }
        if let Some(attributes) = definition.attributes {
            self.diff_attributes(&working_uid, attributes)?;
        }
        info!("Edited component '{}'", working_uid);
        Ok(EditOutcome {
            uid: working_uid,
            kind_changed: false,
        })
    }

    pub fn delete_content_type(&mut self, entity_uid: &str) -> BuilderResult<()> {
        cascade::on_content_type_deleted(&mut self.registry, entity_uid)
    }

    pub fn delete_component(&mut self, entity_uid: &str) -> BuilderResult<()> {
        cascade::on_component_deleted(&mut self.registry, entity_uid)
    }

    /// Rename a component category: every component in it is re-keyed and the
    /// rename is cascaded across the registry. Returns the `(old, new)` UID
    /// pairs.
    pub fn edit_category(
        &mut self,
        old_name: &str,
        new_name: &str,
    ) -> BuilderResult<Vec<(String, String)>> {
        let old_slug = uid::slugify(old_name);
        let new_slug = uid::slugify(new_name);
        let categories: BTreeSet<String> = self.registry.categories().into_iter().collect();
        if !categories.contains(&old_slug) {
            return Err(BuilderError::Application(format!(
                "Category `{}` does not exist",
                old_name
            )));
        }
        if categories.contains(&new_slug) {
            return Err(BuilderError::Application(format!(
                "Category `{}` already exists",
                new_name
            )));
        }
        let targets: Vec<String> = self
            .registry
            .component_uids()
            .into_iter()
            .filter(|component_uid| uid::component_category(component_uid) == Some(old_slug.as_str()))
            .collect();
        let mut renames = Vec::with_capacity(targets.len());
        for old_uid in targets {
            let name = uid::component_name(&old_uid)
                .ok_or_else(|| BuilderError::invalid_uid(old_uid.as_str(), "not a component UID"))?
                .to_string();
            let new_uid = format!("{}.{}", new_slug, name);
            self.registry.rekey_component(&old_uid, new_uid.clone())?;
            cascade::on_component_renamed(&mut self.registry, &old_uid, &new_uid);
            renames.push((old_uid, new_uid));
        }
        info!(
            "Renamed category '{}' to '{}' ({} components)",
            old_slug,
            new_slug,
            renames.len()
        );
        Ok(renames)
    }

    /// Install one attribute, enforcing key uniqueness under normalized
    /// comparison and the structural checks its kind requires.
    fn install_attribute(
        &mut self,
        entity_uid: &str,
        key: &str,
        mut attribute: Attribute,
    ) -> BuilderResult<()> {
        {
            let handle = self
                .registry
                .handle(entity_uid)
                .ok_or_else(|| BuilderError::not_found(entity_uid))?;
            if let Some(existing) = handle.schema().colliding_key(key) {
                if existing != key {
                    return Err(BuilderError::DuplicateAttribute {
                        uid: entity_uid.to_string(),
                        key: key.to_string(),
                    });
                }
            }
        }
        match &mut attribute {
            Attribute::Relation(relation) => {
                resolve_target_sentinels(entity_uid, relation);
                return synthesizer::set_relation(
                    &mut self.registry,
                    entity_uid,
                    key,
                    relation.clone(),
                );
            }
            Attribute::Component(options) => {
                if self.registry.component(&options.component).is_none() {
                    return Err(BuilderError::not_found(options.component.as_str()));
                }
            }
            Attribute::Dynamiczone(options) => {
                for component in &options.components {
                    if self.registry.component(component).is_none() {
                        return Err(BuilderError::not_found(component.as_str()));
                    }
                }
            }
            Attribute::Uid(options) => {
                if let Some(target_field) = &options.target_field {
                    let backing = self
                        .registry
                        .handle(entity_uid)
                        .and_then(|handle| handle.attribute(target_field))
                        .map(|attribute| attribute.is_text_like())
                        .unwrap_or(false);
                    if !backing {
                        return Err(BuilderError::Application(format!(
                            "`targetField` `{}` must reference a text attribute on the same entity",
                            target_field
                        )));
                    }
                }
            }
            _ => {}
        }
        let handle = self
            .registry
            .handle_mut(entity_uid)
            .ok_or_else(|| BuilderError::not_found(entity_uid))?;
        handle.set_attribute(key.to_string(), attribute);
        Ok(())
    }

    /// Diff a previous attribute map against an edit payload: locked
    /// attributes are preserved, missing keys are deletions (detaching any
    /// relation counterpart), shared keys follow the relation transition
    /// rules, and new keys are plain creations.
    fn diff_attributes(
        &mut self,
        entity_uid: &str,
        new_attributes: Vec<(String, Attribute)>,
    ) -> BuilderResult<()> {
        let previous = self
            .registry
            .handle(entity_uid)
            .ok_or_else(|| BuilderError::not_found(entity_uid))?
            .schema()
            .attributes
            .clone();
        let new_keys: BTreeSet<&str> = new_attributes.iter().map(|(key, _)| key.as_str()).collect();

        for (key, previous_attribute) in &previous {
            if new_keys.contains(key.as_str()) {
                continue;
            }
            if previous_attribute.is_unconfigurable() {
                continue;
            }
            if let Some(relation) = previous_attribute.as_relation() {
                let relation = relation.clone();
                synthesizer::detach_counterpart(&mut self.registry, &relation);
            }
            if let Some(handle) = self.registry.handle_mut(entity_uid) {
                handle.delete_attribute(key);
            }
        }

        for (key, next_attribute) in new_attributes {
            match previous.get(&key) {
                None => self.install_attribute(entity_uid, &key, next_attribute)?,
                Some(previous_attribute) => {
                    self.update_attribute(entity_uid, &key, previous_attribute, next_attribute)?
                }
            }
        }
        Ok(())
    }

    /// Transition one attribute present in both the previous map and the
    /// edit payload.
    fn update_attribute(
        &mut self,
        entity_uid: &str,
        key: &str,
        previous: &Attribute,
        next: Attribute,
    ) -> BuilderResult<()> {
        if previous.is_unconfigurable() {
            return Ok(());
        }
        match (previous.as_relation(), next) {
            (Some(previous_relation), Attribute::Relation(mut next_relation)) => {
                resolve_target_sentinels(entity_uid, &mut next_relation);
                if synthesizer::is_same_shape(previous_relation, &next_relation) {
                    // An unchanged shape keeps its dominance unless the
                    // payload overrides it.
                    if next_relation.dominant.is_none() {
                        next_relation.dominant = previous_relation.dominant;
                    }
                } else {
                    let previous_relation = previous_relation.clone();
                    synthesizer::unset_relation(&mut self.registry, &previous_relation);
                }
                synthesizer::set_relation(&mut self.registry, entity_uid, key, next_relation)
            }
            (Some(previous_relation), next) => {
                let previous_relation = previous_relation.clone();
                synthesizer::unset_relation(&mut self.registry, &previous_relation);
                self.install_attribute(entity_uid, key, next)
            }
            (None, next) => self.install_attribute(entity_uid, key, next),
        }
    }
}

fn resolve_target_sentinels(entity_uid: &str, relation: &mut RelationOptions) {
    if let Some(target) = relation.target.as_deref() {
        if target == uid::SELF_SENTINEL || target == uid::NEW_ENTITY_SENTINEL {
            relation.target = Some(entity_uid.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::types::RelationKind;
    use serde_json::json;

    fn attribute(value: Value) -> Attribute {
        serde_json::from_value(value).unwrap()
    }

    fn builder_with_test_type() -> SchemaBuilder {
        let mut builder = SchemaBuilder::default();
        let mut definition = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Test");
        definition.attributes = vec![("title".to_string(), attribute(json!({ "type": "string" })))];
        builder.create_content_type(definition).unwrap();
        builder
    }

    #[test]
    fn create_content_type_derives_uid_from_singular_name() {
        let builder = builder_with_test_type();
        let handle = builder.registry().content_type("api::test.test").unwrap();
        assert_eq!(handle.schema().kind, Some(ContentTypeKind::CollectionType));
        assert_eq!(handle.schema().collection_name.as_deref(), Some("tests"));
        assert!(handle.attribute("title").is_some());
    }

    #[test]
    fn explicit_uid_must_match_derivation() {
        let mut builder = SchemaBuilder::default();
        let mut definition = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Test");
        definition.uid = Some("api::other.other".to_string());
        let err = builder.create_content_type(definition).unwrap_err();
        assert!(matches!(err, BuilderError::InvalidUid { .. }));
    }

    #[test]
    fn duplicate_uid_is_rejected() {
        let mut builder = builder_with_test_type();
        let definition = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Test");
        let err = builder.create_content_type(definition).unwrap_err();
        assert!(matches!(err, BuilderError::AlreadyExists { .. }));
    }

    #[test]
    fn normalized_key_collision_is_rejected() {
        let mut builder = builder_with_test_type();
        let err = builder
            .create_attributes(
                "api::test.test",
                vec![
                    ("cover_image".to_string(), attribute(json!({ "type": "string" }))),
                    ("coverImage".to_string(), attribute(json!({ "type": "string" }))),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, BuilderError::DuplicateAttribute { .. }));
    }

    #[test]
    fn relation_scenario_synthesizes_owner() {
        let mut builder = builder_with_test_type();
        let mut other = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Other");
        other.attributes = vec![(
            "items".to_string(),
            attribute(json!({
                "type": "relation",
                "relation": "oneToMany",
                "target": "api::test.test",
                "targetAttribute": "owner"
            })),
        )];
        builder.create_content_type(other).unwrap();

        let owner = builder
            .registry()
            .content_type("api::test.test")
            .unwrap()
            .attribute("owner")
            .unwrap()
            .as_relation()
            .cloned()
            .unwrap();
        assert_eq!(owner.relation, RelationKind::ManyToOne);
        assert_eq!(owner.target.as_deref(), Some("api::other.other"));
    }

    #[test]
    fn deleting_synthesized_side_converts_declaring_side() {
        let mut builder = builder_with_test_type();
        let mut other = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Other");
        other.attributes = vec![(
            "items".to_string(),
            attribute(json!({
                "type": "relation",
                "relation": "oneToMany",
                "target": "api::test.test",
                "targetAttribute": "owner"
            })),
        )];
        builder.create_content_type(other).unwrap();

        // Edit drops `owner`, keeps `title`.
        builder
            .edit_content_type(
                "api::test.test",
                EditDefinition {
                    attributes: Some(vec![(
                        "title".to_string(),
                        attribute(json!({ "type": "string" })),
                    )]),
                    ..EditDefinition::default()
                },
            )
            .unwrap();

        assert!(builder
            .registry()
            .content_type("api::test.test")
            .unwrap()
            .attribute("owner")
            .is_none());
        let items = builder
            .registry()
            .content_type("api::other.other")
            .unwrap()
            .attribute("items")
            .unwrap()
            .as_relation()
            .cloned()
            .unwrap();
        assert_eq!(items.relation, RelationKind::ManyWay);
        assert!(items.counterpart_key().is_none());
    }

    #[test]
    fn retyping_relation_removes_counterpart() {
        let mut builder = builder_with_test_type();
        let mut other = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Other");
        other.attributes = vec![(
            "items".to_string(),
            attribute(json!({
                "type": "relation",
                "relation": "oneToMany",
                "target": "api::test.test",
                "targetAttribute": "owner"
            })),
        )];
        builder.create_content_type(other).unwrap();

        builder
            .edit_content_type(
                "api::other.other",
                EditDefinition {
                    attributes: Some(vec![(
                        "items".to_string(),
                        attribute(json!({ "type": "string" })),
                    )]),
                    ..EditDefinition::default()
                },
            )
            .unwrap();

        assert!(builder
            .registry()
            .content_type("api::test.test")
            .unwrap()
            .attribute("owner")
            .is_none());
        assert!(builder
            .registry()
            .content_type("api::other.other")
            .unwrap()
            .attribute("items")
            .unwrap()
            .as_relation()
            .is_none());
    }

    #[test]
    fn unconfigurable_attributes_survive_edits() {
        let mut builder = builder_with_test_type();
        builder
            .create_attributes(
                "api::test.test",
                vec![(
                    "locked".to_string(),
                    attribute(json!({ "type": "string", "configurable": false })),
                )],
            )
            .unwrap();
        builder
            .edit_content_type(
                "api::test.test",
                EditDefinition {
                    attributes: Some(vec![(
                        "title".to_string(),
                        attribute(json!({ "type": "string" })),
                    )]),
                    ..EditDefinition::default()
                },
            )
            .unwrap();
        assert!(builder
            .registry()
            .content_type("api::test.test")
            .unwrap()
            .attribute("locked")
            .is_some());
    }

    #[test]
    fn self_sentinel_resolves_to_created_type() {
        let mut builder = SchemaBuilder::default();
        let mut definition = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Page");
        definition.attributes = vec![(
            "parent".to_string(),
            attribute(json!({
                "type": "relation",
                "relation": "manyToOne",
                "target": "__self__",
                "targetAttribute": "children"
            })),
        )];
        builder.create_content_type(definition).unwrap();
        let children = builder
            .registry()
            .content_type("api::page.page")
            .unwrap()
            .attribute("children")
            .unwrap()
            .as_relation()
            .cloned()
            .unwrap();
        assert_eq!(children.relation, RelationKind::OneToMany);
        assert_eq!(children.target.as_deref(), Some("api::page.page"));
    }

    #[test]
    fn edit_category_renames_and_cascades() {
        let mut builder = SchemaBuilder::default();
        builder
            .create_component(ComponentDefinition::new("shared", "Seo"))
            .unwrap();
        builder
            .create_component(ComponentDefinition::new("shared", "Hero"))
            .unwrap();
        let mut page = ContentTypeDefinition::new(ContentTypeKind::SingleType, "Page");
        page.attributes = vec![(
            "body".to_string(),
            attribute(json!({
                "type": "dynamiczone",
                "components": ["shared.seo", "shared.hero"]
            })),
        )];
        builder.create_content_type(page).unwrap();

        let renames = builder.edit_category("shared", "common").unwrap();
        assert_eq!(renames.len(), 2);
        match builder
            .registry()
            .content_type("api::page.page")
            .unwrap()
            .attribute("body")
            .unwrap()
        {
            Attribute::Dynamiczone(dz) => {
                assert_eq!(dz.components, vec!["common.seo", "common.hero"]);
            }
            _ => panic!("expected dynamiczone"),
        }

        let err = builder.edit_category("missing", "other").unwrap_err();
        assert!(matches!(err, BuilderError::Application(_)));
        builder
            .create_component(ComponentDefinition::new("legacy", "Card"))
            .unwrap();
        let err = builder.edit_category("legacy", "common").unwrap_err();
        assert!(matches!(err, BuilderError::Application(_)));
    }

    #[test]
    fn component_attribute_requires_registered_component() {
        let mut builder = builder_with_test_type();
        let err = builder
            .create_attributes(
                "api::test.test",
                vec![(
                    "seo".to_string(),
                    attribute(json!({ "type": "component", "component": "shared.missing" })),
                )],
            )
            .unwrap_err();
        assert!(matches!(err, BuilderError::NotFound { .. }));
    }

    #[test]
    fn uid_attribute_target_field_must_be_text_like() {
        let mut builder = builder_with_test_type();
        builder
            .create_attributes(
                "api::test.test",
                vec![(
                    "slug".to_string(),
                    attribute(json!({ "type": "uid", "targetField": "title" })),
                )],
            )
            .unwrap();
        let err = builder
            .create_attributes(
                "api::test.test",
                vec![(
                    "badSlug".to_string(),
                    attribute(json!({ "type": "uid", "targetField": "missing" })),
                )],
            )
            .unwrap_err();
        assert!(matches!(err, BuilderError::Application(_)));
    }
}
