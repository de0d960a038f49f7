//! Top-level batch update service
//!
//! One update session: seed the registry from disk, apply every operation
//! through the orchestrator, flush transactionally, then notify the event
//! sink. A single in-flight guard rejects a concurrent update with a
//! conflict instead of queueing it. Either every requested change lands on
//! disk and every event fires, or none do; scaffold clears that already ran
//! are reverted best-effort with a warning on failure.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use log::warn;

use crate::builder::events::{EventAction, EventSink, NoopSink, SchemaEvent};
use crate::builder::loader;
use crate::builder::orchestrator::{
    ComponentDefinition, ContentTypeDefinition, EditDefinition, SchemaBuilder,
};
use crate::builder::paths::SchemaPaths;
use crate::builder::scaffold::{NoopScaffold, ScaffoldGenerator};
use crate::builder::types::EntitySchema;
use crate::builder::writer::{self, CommitReport};
use crate::error::{BuilderError, BuilderResult};

/// One requested entity operation within a batch update.
#[derive(Debug, Clone)]
pub enum SchemaOperation {
    CreateContentType(ContentTypeDefinition),
    EditContentType {
        uid: String,
        definition: EditDefinition,
    },
    DeleteContentType {
        uid: String,
    },
    CreateComponent(ComponentDefinition),
    EditComponent {
        uid: String,
        definition: EditDefinition,
    },
    DeleteComponent {
        uid: String,
    },
    EditCategory {
        old_name: String,
        new_name: String,
    },
}

pub struct UpdateService {
    paths: SchemaPaths,
    events: Box<dyn EventSink>,
    scaffold: Box<dyn ScaffoldGenerator>,
    update_in_progress: AtomicBool,
}

impl UpdateService {
    pub fn new(paths: SchemaPaths) -> Self {
        Self::with_collaborators(paths, Box::new(NoopSink), Box::new(NoopScaffold))
    }

    pub fn with_collaborators(
        paths: SchemaPaths,
        events: Box<dyn EventSink>,
        scaffold: Box<dyn ScaffoldGenerator>,
    ) -> Self {
        Self {
            paths,
            events,
            scaffold,
            update_in_progress: AtomicBool::new(false),
        }
    }

    /// Apply a batch of operations as one transactional session. A second
    /// call while one is in flight fails with
    /// [`BuilderError::UpdateInProgress`] rather than queueing.
    pub async fn apply_update(
        &self,
        operations: Vec<SchemaOperation>,
    ) -> BuilderResult<CommitReport> {
        if self
            .update_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BuilderError::UpdateInProgress);
        }
        let result = self.run_update(operations).await;
        self.update_in_progress.store(false, Ordering::SeqCst);
        result
    }

    async fn run_update(&self, operations: Vec<SchemaOperation>) -> BuilderResult<CommitReport> {
        let snapshot = loader::load_snapshot(&self.paths)?;
        let mut builder = SchemaBuilder::from_snapshot(snapshot);
        let mut pending_events: Vec<(EventAction, String, Option<EntitySchema>)> = Vec::new();
        let mut scaffold_cleared: Vec<String> = Vec::new();

        let applied: BuilderResult<()> = (|| {
            for operation in operations {
                match operation {
                    SchemaOperation::CreateContentType(definition) => {
                        let uid = builder.create_content_type(definition)?;
                        pending_events.push((EventAction::ContentTypeCreate, uid, None));
                    }
                    SchemaOperation::EditContentType { uid, definition } => {
                        let outcome = builder.edit_content_type(&uid, definition)?;
                        if outcome.kind_changed {
                            self.scaffold.backup(&uid)?;
                            self.scaffold.clear(&uid)?;
                            scaffold_cleared.push(uid.clone());
                        }
                        pending_events.push((EventAction::ContentTypeUpdate, outcome.uid, None));
                    }
                    SchemaOperation::DeleteContentType { uid } => {
                        let schema = builder
                            .registry()
                            .content_type(&uid)
                            .map(|handle| handle.schema().clone())
                            .ok_or_else(|| BuilderError::not_found(uid.clone()))?;
                        let schema = Some(schema);
                        self.scaffold.backup(&uid)?;
                        self.scaffold.clear(&uid)?;
                        scaffold_cleared.push(uid.clone());
                        builder.delete_content_type(&uid)?;
                        pending_events.push((EventAction::ContentTypeDelete, uid, schema));
                    }
                    SchemaOperation::CreateComponent(definition) => {
                        let uid = builder.create_component(definition)?;
                        pending_events.push((EventAction::ComponentCreate, uid, None));
                    }
                    SchemaOperation::EditComponent { uid, definition } => {
                        let outcome = builder.edit_component(&uid, definition)?;
                        pending_events.push((EventAction::ComponentUpdate, outcome.uid, None));
                    }
                    SchemaOperation::DeleteComponent { uid } => {
                        let schema = builder
                            .registry()
                            .component(&uid)
                            .map(|handle| handle.schema().clone());
                        builder.delete_component(&uid)?;
                        pending_events.push((EventAction::ComponentDelete, uid, schema));
                    }
                    SchemaOperation::EditCategory { old_name, new_name } => {
                        let renames = builder.edit_category(&old_name, &new_name)?;
                        for (_, new_uid) in renames {
                            pending_events.push((EventAction::ComponentUpdate, new_uid, None));
                        }
                    }
                }
            }
            Ok(())
        })();
        if let Err(e) = applied {
            self.rollback_scaffolds(&scaffold_cleared);
            return Err(e);
        }

        match writer::write_files(builder.registry_mut(), &self.paths).await {
            Ok(report) => {
                for (action, uid, captured) in pending_events {
                    let schema = captured.or_else(|| {
                        builder
                            .registry()
                            .handle(&uid)
                            .map(|handle| handle.schema().clone())
                    });
                    self.events.emit(SchemaEvent {
                        action,
                        uid,
                        schema,
                        emitted_at: Utc::now(),
                    });
                }
                Ok(report)
            }
            Err(e) => {
                self.rollback_scaffolds(&scaffold_cleared);
                Err(e)
            }
        }
    }

    fn rollback_scaffolds(&self, cleared: &[String]) {
        for uid in cleared {
            if let Err(e) = self.scaffold.rollback(uid) {
                warn!("Failed to restore API scaffolding for '{}': {}", uid, e);
            }
        }
    }
}
