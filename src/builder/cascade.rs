//! Cascade resolution for renames and deletions
//!
//! A rename or deletion of one entity must propagate to every other handle
//! in the registry that references it before the next operation in a batch
//! runs, because later operations may depend on the post-cascade state.

use log::info;

use crate::builder::registry::SchemaRegistry;
use crate::error::{BuilderError, BuilderResult};

/// Point every reference to a renamed component at its new UID.
pub fn on_component_renamed(registry: &mut SchemaRegistry, old_uid: &str, new_uid: &str) {
    let mut touched = 0;
    for handle in registry.handles_mut() {
        if handle.rename_component_references(old_uid, new_uid) {
            touched += 1;
        }
    }
    info!(
        "Renamed component '{}' to '{}', updated {} referencing schemas",
        old_uid, new_uid, touched
    );
}

/// Strip every reference to a deleted component, then mark its own handle
/// deleted.
pub fn on_component_deleted(registry: &mut SchemaRegistry, uid: &str) -> BuilderResult<()> {
    if registry.component(uid).is_none() {
        return Err(BuilderError::not_found(uid));
    }
    let mut touched = 0;
    for handle in registry.handles_mut() {
        if handle.remove_references(uid) {
            touched += 1;
        }
    }
    if let Some(handle) = registry.component_mut(uid) {
        handle.mark_deleted();
    }
    info!(
        "Deleted component '{}', stripped references from {} schemas",
        uid, touched
    );
    Ok(())
}

/// Strip every reference to a deleted content type, then mark its own handle
/// deleted. Relations held by other entities that target the deleted type are
/// removed entirely; an entity cannot keep a dangling relation.
pub fn on_content_type_deleted(registry: &mut SchemaRegistry, uid: &str) -> BuilderResult<()> {
    if registry.content_type(uid).is_none() {
        return Err(BuilderError::not_found(uid));
    }
    let mut touched = 0;
    for handle in registry.handles_mut() {
        if handle.remove_references(uid) {
            touched += 1;
        }
    }
    if let Some(handle) = registry.content_type_mut(uid) {
        handle.mark_deleted();
    }
    info!(
        "Deleted content type '{}', stripped references from {} schemas",
        uid, touched
    );
    Ok(())
}
