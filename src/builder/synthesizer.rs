//! Relation synthesis
//!
//! Pure logic that keeps both sides of every relation consistent. Installing
//! a relation attribute with a `targetAttribute` writes a synthesized
//! counterpart onto the target entity with the inverse kind and the opposite
//! dominance; removing or retyping it takes the counterpart away again.
//! Components may only hold unidirectional relations, and relation targets
//! must be content types.

use serde_json::Value;

use crate::builder::registry::SchemaRegistry;
use crate::builder::types::{Attribute, RelationKind, RelationOptions};
use crate::error::{BuilderError, BuilderResult};

/// Inverse-side fields never carried over blindly when a counterpart is
/// re-synthesized on top of an existing attribute.
const NON_REUSABLE_FIELDS: &[&str] = &[
    "configurable",
    "required",
    "private",
    "unique",
    "pluginOptions",
    "inversedBy",
    "mappedBy",
    "conditions",
];

/// Whether an edited relation kept its shape (kind, target and counterpart
/// name), meaning only cosmetic fields changed and the counterpart must not
/// be torn down and re-created.
pub fn is_same_shape(previous: &RelationOptions, next: &RelationOptions) -> bool {
    let next_counterpart = next
        .target_attribute
        .as_deref()
        .or(next.inversed_by.as_deref())
        .or(next.mapped_by.as_deref());
    previous.relation == next.relation
        && previous.target == next.target
        && previous.counterpart_key() == next_counterpart
}

/// Install `relation` as attribute `key` on `source_uid`, synthesizing the
/// counterpart attribute on the target entity when a counterpart name is
/// given. The source attribute's `targetAttribute` is folded into the
/// `inversedBy`/`mappedBy` side pointers before anything is persisted.
pub fn set_relation(
    registry: &mut SchemaRegistry,
    source_uid: &str,
    key: &str,
    mut relation: RelationOptions,
) -> BuilderResult<()> {
    let kind = relation.relation;
    let counterpart_key = relation
        .target_attribute
        .take()
        .or(relation.inversed_by.take())
        .or(relation.mapped_by.take());

    let source_is_component = registry.component(source_uid).is_some();
    if registry.handle(source_uid).is_none() {
        return Err(BuilderError::not_found(source_uid));
    }

    if kind.is_targeted() {
        let target = relation
            .target
            .as_deref()
            .ok_or_else(|| {
                BuilderError::invalid_relation_target(key, format!("{} relation has no target", kind.as_str()))
            })?
            .to_string();
        if registry.component(&target).is_some() {
            return Err(BuilderError::invalid_relation_target(
                key,
                format!("`{}` is a component; relations may only target content types", target),
            ));
        }
        if registry.content_type(&target).is_none() {
            return Err(BuilderError::invalid_relation_target(
                key,
                format!("`{}` is not registered", target),
            ));
        }
    } else if counterpart_key.is_some() {
        return Err(BuilderError::invalid_relation_target(
            key,
            format!("{} relations cannot declare a target attribute", kind.as_str()),
        ));
    }

    if source_is_component && (counterpart_key.is_some() || !kind.is_unidirectional()) {
        return Err(BuilderError::invalid_relation_target(
            key,
            "components may only hold unidirectional relations".to_string(),
        ));
    }

    let counterpart_key = match counterpart_key {
        None => {
            relation.dominant = if kind.is_symmetric() { relation.dominant } else { None };
            let handle = registry
                .handle_mut(source_uid)
                .ok_or_else(|| BuilderError::not_found(source_uid))?;
            handle.set_attribute(key.to_string(), Attribute::Relation(relation));
            return Ok(());
        }
        Some(counterpart_key) => {
            if kind.is_unidirectional() {
                return Err(BuilderError::invalid_relation_target(
                    key,
                    format!("{} relations cannot declare a target attribute", kind.as_str()),
                ));
            }
            counterpart_key
        }
    };

    let inverse_kind = kind.inverse().ok_or_else(|| {
        BuilderError::invalid_relation_target(key, format!("{} has no counterpart kind", kind.as_str()))
    })?;

    // Dominance only exists for symmetric kinds. The tie-break for
    // self-referencing relations: the side installed first stays dominant, a
    // later attribute pointing back at it becomes the inverse side.
    let dominant = if kind.is_symmetric() {
        Some(match relation.dominant {
            Some(explicit) => explicit,
            None => {
                let second_side = relation.target.as_deref() == Some(source_uid)
                    && registry
                        .handle(source_uid)
                        .and_then(|handle| handle.attribute(&counterpart_key))
                        .and_then(|attribute| attribute.as_relation())
                        .map(|existing| {
                            existing.counterpart_key() == Some(key)
                                && existing.dominant == Some(true)
                        })
                        .unwrap_or(false);
                !second_side
            }
        })
    } else {
        None
    };
    relation.dominant = dominant;

    let source_owns = match kind {
        RelationKind::OneToOne | RelationKind::ManyToMany => dominant.unwrap_or(true),
        RelationKind::ManyToOne => true,
        RelationKind::OneToMany => false,
        RelationKind::MorphOne | RelationKind::MorphMany => true,
        RelationKind::OneWay
        | RelationKind::ManyWay
        | RelationKind::MorphToOne
        | RelationKind::MorphToMany => true,
    };
    if source_owns {
        relation.inversed_by = Some(counterpart_key.clone());
    } else {
        relation.mapped_by = Some(counterpart_key.clone());
    }

    let counterpart_target = if kind.is_morph() {
        // Fixed polymorphic counterpart, resolves its target per entry.
        None
    } else {
        Some(source_uid.to_string())
    };
    let mut counterpart = RelationOptions::new(inverse_kind, counterpart_target);
    counterpart.dominant = dominant.map(|d| !d);
    if source_owns {
        counterpart.mapped_by = Some(key.to_string());
    } else {
        counterpart.inversed_by = Some(key.to_string());
    }

    let target_uid = relation.target.clone().unwrap_or_else(|| source_uid.to_string());
    let previous_counterpart = registry
        .content_type(&target_uid)
        .and_then(|handle| handle.attribute(&counterpart_key))
        .and_then(|attribute| attribute.as_relation())
        .cloned();
    if let Some(previous) = previous_counterpart {
        counterpart = reuse_unset_previous_properties(&previous, counterpart)?;
    }

    let target_handle = registry
        .content_type_mut(&target_uid)
        .ok_or_else(|| BuilderError::not_found(target_uid.as_str()))?;
    target_handle.set_attribute(counterpart_key, Attribute::Relation(counterpart));

    let source_handle = registry
        .handle_mut(source_uid)
        .ok_or_else(|| BuilderError::not_found(source_uid))?;
    source_handle.set_attribute(key.to_string(), Attribute::Relation(relation));
    Ok(())
}

/// Delete the previously-synthesized counterpart of `attribute`, used when
/// the declaring side is retyped or replaced by a different relation. Silent
/// when the target or counterpart is already gone (a cascade may have beaten
/// us to it).
pub fn unset_relation(registry: &mut SchemaRegistry, attribute: &RelationOptions) {
    let Some(counterpart_key) = attribute.counterpart_key() else {
        return;
    };
    let counterpart_key = counterpart_key.to_string();
    let Some(target) = attribute.target.as_deref() else {
        return;
    };
    let target = target.to_string();
    if let Some(handle) = registry.handle_mut(&target) {
        handle.delete_attribute(&counterpart_key);
    }
}

/// When one side of a bidirectional relation is deleted outright, the
/// surviving side is converted to its unidirectional variant rather than
/// deleted: it loses its side pointer and dominance but keeps targeting the
/// same entity.
pub fn detach_counterpart(registry: &mut SchemaRegistry, attribute: &RelationOptions) {
    let Some(counterpart_key) = attribute.counterpart_key() else {
        return;
    };
    let counterpart_key = counterpart_key.to_string();
    let Some(target) = attribute.target.as_deref() else {
        return;
    };
    let target = target.to_string();
    let Some(handle) = registry.handle_mut(&target) else {
        return;
    };
    let Some(surviving) = handle.attribute(&counterpart_key).and_then(|a| a.as_relation()).cloned()
    else {
        return;
    };
    let mut surviving = surviving;
    surviving.relation = surviving.relation.as_unidirectional();
    surviving.target_attribute = None;
    surviving.inversed_by = None;
    surviving.mapped_by = None;
    surviving.dominant = None;
    handle.set_attribute(counterpart_key, Attribute::Relation(surviving));
}

/// Merge a freshly generated counterpart over the attribute it replaces:
/// fields manually set on the inverse side survive unless the new definition
/// supplies them, excluding the side pointers and per-side flags that must
/// always be re-derived. `conditions` is kept from the previous side only
/// when the new definition does not define any.
fn reuse_unset_previous_properties(
    previous: &RelationOptions,
    next: RelationOptions,
) -> BuilderResult<RelationOptions> {
    let previous_value = serde_json::to_value(previous).map_err(|e| BuilderError::Serialize {
        uid: previous.target.clone().unwrap_or_default(),
        source: e,
    })?;
    let next_value = serde_json::to_value(&next).map_err(|e| BuilderError::Serialize {
        uid: next.target.clone().unwrap_or_default(),
        source: e,
    })?;
    let (Value::Object(previous_map), Value::Object(mut next_map)) = (previous_value, next_value)
    else {
        return Ok(next);
    };
    for (field, value) in &previous_map {
        if NON_REUSABLE_FIELDS.contains(&field.as_str()) {
            continue;
        }
        next_map
            .entry(field.clone())
            .or_insert_with(|| value.clone());
    }
    if !next_map.contains_key("conditions") {
        if let Some(conditions) = previous_map.get("conditions") {
            next_map.insert("conditions".to_string(), conditions.clone());
        }
    }
    serde_json::from_value(Value::Object(next_map)).map_err(|e| BuilderError::Serialize {
        uid: previous.target.clone().unwrap_or_default(),
        source: e,
    })
}
