//! Transactional flush of dirty schema handles
//!
//! Serializes every non-clean handle to its target file, removes files for
//! deleted handles (pruning now-empty parent directories) and relocates
//! files for renamed handles. There is no cross-file atomicity on the
//! filesystem, so on any failure the writer immediately attempts to restore
//! every touched handle's original content; only if that rollback itself
//! fails is the session left in an unrecoverable state.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;

use crate::builder::handle::HandleStatus;
use crate::builder::paths::SchemaPaths;
use crate::builder::registry::SchemaRegistry;
use crate::error::{BuilderError, BuilderResult};

/// What a successful flush did.
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    /// UIDs whose documents were written.
    pub written: Vec<String>,
    /// UIDs whose documents were removed.
    pub deleted: Vec<String>,
    /// `(old, new)` UID pairs whose documents were relocated.
    pub moved: Vec<(String, String)>,
    pub committed_at: DateTime<Utc>,
}

impl CommitReport {
    fn empty() -> Self {
        Self {
            written: Vec::new(),
            deleted: Vec::new(),
            moved: Vec::new(),
            committed_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty() && self.deleted.is_empty() && self.moved.is_empty()
    }
}

/// Flush every dirty handle to disk, or roll the whole session back.
///
/// A session with no dirty handle performs zero filesystem operations. On
/// success deleted handles leave the registry and every surviving handle's
/// draft becomes its new original. On failure the original error is returned
/// after rollback; a rollback failure surfaces as
/// [`BuilderError::RollbackFailed`] and poisons the registry.
pub async fn write_files(
    registry: &mut SchemaRegistry,
    paths: &SchemaPaths,
) -> BuilderResult<CommitReport> {
    let mut dirty: Vec<String> = registry
        .dirty_handles()
        .map(|handle| handle.uid().to_string())
        .collect();
    dirty.sort();
    if dirty.is_empty() {
        return Ok(CommitReport::empty());
    }
    info!("Flushing {} dirty schema handles", dirty.len());

    let mut report = CommitReport::empty();
    if let Err(original) = flush_handles(registry, paths, &dirty, &mut report).await {
        error!("Schema flush failed, rolling back every handle: {}", original);
        rollback(registry, paths, &dirty).await?;
        return Err(original);
    }

    for uid in &dirty {
        let deleted = registry
            .handle(uid)
            .map(|handle| handle.is_deleted())
            .unwrap_or(false);
        if deleted {
            registry.remove(uid);
        } else if let Some(handle) = registry.handle_mut(uid) {
            handle.finalize_commit();
        }
    }
    report.committed_at = Utc::now();
    info!(
        "Flushed schema session: {} written, {} deleted, {} moved",
        report.written.len(),
        report.deleted.len(),
        report.moved.len()
    );
    Ok(report)
}

async fn flush_handles(
    registry: &SchemaRegistry,
    paths: &SchemaPaths,
    dirty: &[String],
    report: &mut CommitReport,
) -> BuilderResult<()> {
    for uid in dirty {
        let Some(handle) = registry.handle(uid) else {
            continue;
        };
        let entity_type = handle.entity_type();
        match handle.status() {
            HandleStatus::Clean => {}
            HandleStatus::Deleted => {
                // Created and deleted within one session: nothing persisted.
                if handle.is_new() {
                    continue;
                }
                let path = paths.schema_file(entity_type, handle.initial_uid())?;
                remove_file_if_exists(&path, uid).await?;
                prune_empty_parents(&path, paths.prune_root(entity_type)).await;
                report.deleted.push(uid.clone());
            }
            HandleStatus::Modified => {
                let document = handle.draft_document()?;
                let path = paths.schema_file(entity_type, handle.uid())?;
                write_document(&path, &document, uid).await?;
                if handle.was_moved() {
                    let old_path = paths.schema_file(entity_type, handle.initial_uid())?;
                    remove_file_if_exists(&old_path, uid).await?;
                    prune_empty_parents(&old_path, paths.prune_root(entity_type)).await;
                    report
                        .moved
                        .push((handle.initial_uid().to_string(), uid.clone()));
                }
                report.written.push(uid.clone());
            }
        }
    }
    Ok(())
}

/// Restore every dirty handle's original persisted content, removing any
/// path this session created. Best effort: the first handle that cannot be
/// restored aborts with the fatal error.
async fn rollback(
    registry: &SchemaRegistry,
    paths: &SchemaPaths,
    dirty: &[String],
) -> BuilderResult<()> {
    for uid in dirty {
        let Some(handle) = registry.handle(uid) else {
            continue;
        };
        let entity_type = handle.entity_type();
        let restored: BuilderResult<()> = async {
            let current_path = paths.schema_file(entity_type, handle.uid())?;
            match handle.initial_document()? {
                None => {
                    force_remove_path(&current_path, uid).await?;
                    prune_empty_parents(&current_path, paths.prune_root(entity_type)).await;
                }
                Some(document) => {
                    let initial_path = paths.schema_file(entity_type, handle.initial_uid())?;
                    if current_path != initial_path {
                        force_remove_path(&current_path, uid).await?;
                        prune_empty_parents(&current_path, paths.prune_root(entity_type)).await;
                    }
                    write_document(&initial_path, &document, uid).await?;
                }
            }
            Ok(())
        }
        .await;
        if let Err(cause) = restored {
            return Err(BuilderError::RollbackFailed {
                uid: uid.clone(),
                reason: cause.to_string(),
            });
        }
    }
    info!("Rolled back {} handles to their pre-session content", dirty.len());
    Ok(())
}

async fn write_document(path: &Path, document: &str, uid: &str) -> BuilderResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BuilderError::Write {
                uid: uid.to_string(),
                path: parent.display().to_string(),
                source: e,
            })?;
    }
    tokio::fs::write(path, document)
        .await
        .map_err(|e| BuilderError::Write {
            uid: uid.to_string(),
            path: path.display().to_string(),
            source: e,
        })
}

async fn remove_file_if_exists(path: &Path, uid: &str) -> BuilderResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuilderError::Write {
            uid: uid.to_string(),
            path: path.display().to_string(),
            source: e,
        }),
    }
}

/// Rollback variant of [`remove_file_if_exists`]: whatever occupies the path
/// after a failed attempt is cleared, even if it is not a plain file.
async fn force_remove_path(path: &Path, uid: &str) -> BuilderResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(original) => match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(_) => Err(BuilderError::Write {
                uid: uid.to_string(),
                path: path.display().to_string(),
                source: original,
            }),
        },
    }
}

/// Remove now-empty directories between a deleted file and the layout root,
/// exclusive. Failures here are ignored; stray empty directories are
/// harmless.
async fn prune_empty_parents(path: &Path, root: &Path) {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        let empty = match tokio::fs::read_dir(dir).await {
            Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
            Err(_) => false,
        };
        if !empty || tokio::fs::remove_dir(dir).await.is_err() {
            break;
        }
        current = dir.parent();
    }
}
