//! Transactional guarantees of the writer: a failed flush restores every
//! touched file, fires no events, and the in-flight guard rejects a
//! concurrent update.

mod common;

use std::sync::Arc;
use std::time::Duration;

use schemaforge::builder::events::BufferedSink;
use schemaforge::builder::scaffold::ScaffoldGenerator;
use schemaforge::builder::{loader, writer, SchemaBuilder};
use schemaforge::{
    BuilderError, BuilderResult, ContentTypeDefinition, ContentTypeKind, EditDefinition,
    EntityType, SchemaOperation, UpdateService,
};
use serde_json::json;
use tempfile::TempDir;

fn create_op(display_name: &str) -> SchemaOperation {
    let mut definition = ContentTypeDefinition::new(ContentTypeKind::CollectionType, display_name);
    definition.attributes = vec![(
        "title".to_string(),
        common::attribute(json!({ "type": "string" })),
    )];
    SchemaOperation::CreateContentType(definition)
}

fn edit_add_attribute(uid: &str, key: &str) -> SchemaOperation {
    SchemaOperation::EditContentType {
        uid: uid.to_string(),
        definition: EditDefinition {
            attributes: Some(vec![
                (
                    "title".to_string(),
                    common::attribute(json!({ "type": "string" })),
                ),
                (
                    key.to_string(),
                    common::attribute(json!({ "type": "boolean" })),
                ),
            ]),
            ..EditDefinition::default()
        },
    }
}

#[tokio::test]
async fn failed_flush_restores_every_file_and_fires_no_events() {
    let dir = TempDir::new().unwrap();
    let paths = common::schema_paths(&dir);
    let service = UpdateService::new(paths.clone());
    service
        .apply_update(vec![create_op("Alpha"), create_op("Beta")])
        .await
        .unwrap();

    let alpha_path = paths
        .schema_file(EntityType::ContentType, "api::alpha.alpha")
        .unwrap();
    let beta_path = paths
        .schema_file(EntityType::ContentType, "api::beta.beta")
        .unwrap();
    let alpha_before = std::fs::read_to_string(&alpha_path).unwrap();
    let beta_before = std::fs::read_to_string(&beta_path).unwrap();

    // Occupy the third handle's target path with a directory so its write
    // fails after the first two handles have already been flushed.
    let gamma_path = paths
        .schema_file(EntityType::ContentType, "api::gamma.gamma")
        .unwrap();
    std::fs::create_dir_all(&gamma_path).unwrap();

    let sink = Arc::new(BufferedSink::new());
    let service = UpdateService::with_collaborators(
        paths.clone(),
        Box::new(Arc::clone(&sink)),
        Box::new(schemaforge::builder::scaffold::NoopScaffold),
    );
    let err = service
        .apply_update(vec![
            edit_add_attribute("api::alpha.alpha", "published"),
            edit_add_attribute("api::beta.beta", "archived"),
            create_op("Gamma"),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::Write { .. }));

    // Already-written handles are restored to their pre-session content.
    assert_eq!(std::fs::read_to_string(&alpha_path).unwrap(), alpha_before);
    assert_eq!(std::fs::read_to_string(&beta_path).unwrap(), beta_before);
    assert!(!gamma_path.is_file());
    // Zero lifecycle events fire for a failed session.
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn direct_flush_finalizes_handles_and_becomes_idempotent() {
    let dir = TempDir::new().unwrap();
    let paths = common::schema_paths(&dir);

    let mut builder = SchemaBuilder::default();
    let mut definition = ContentTypeDefinition::new(ContentTypeKind::CollectionType, "Note");
    definition.attributes = vec![(
        "body".to_string(),
        common::attribute(json!({ "type": "text" })),
    )];
    builder.create_content_type(definition).unwrap();

    let report = writer::write_files(builder.registry_mut(), &paths)
        .await
        .unwrap();
    assert_eq!(report.written, vec!["api::note.note".to_string()]);

    // Nothing left dirty: a second flush performs zero writes.
    let report = writer::write_files(builder.registry_mut(), &paths)
        .await
        .unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn reloaded_unmodified_session_flushes_nothing() {
    let dir = TempDir::new().unwrap();
    let paths = common::schema_paths(&dir);
    let service = UpdateService::new(paths.clone());
    service.apply_update(vec![create_op("Alpha")]).await.unwrap();

    let snapshot = loader::load_snapshot(&paths).unwrap();
    let mut builder = SchemaBuilder::from_snapshot(snapshot);
    assert!(builder.registry().content_type("api::alpha.alpha").is_some());
    let report = writer::write_files(builder.registry_mut(), &paths)
        .await
        .unwrap();
    assert!(report.is_empty());
}

struct SlowScaffold;

impl ScaffoldGenerator for SlowScaffold {
    fn backup(&self, _uid: &str) -> BuilderResult<()> {
        Ok(())
    }

    fn clear(&self, _uid: &str) -> BuilderResult<()> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(())
    }

    fn rollback(&self, _uid: &str) -> BuilderResult<()> {
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_update_is_rejected_not_queued() {
    let dir = TempDir::new().unwrap();
    let paths = common::schema_paths(&dir);
    let service = UpdateService::new(paths.clone());
    service.apply_update(vec![create_op("Alpha")]).await.unwrap();

    let service = Arc::new(UpdateService::with_collaborators(
        paths,
        Box::new(schemaforge::builder::events::NoopSink),
        Box::new(SlowScaffold),
    ));

    let slow = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .apply_update(vec![SchemaOperation::DeleteContentType {
                    uid: "api::alpha.alpha".to_string(),
                }])
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    let err = service
        .apply_update(vec![create_op("Beta")])
        .await
        .unwrap_err();
    assert!(matches!(err, BuilderError::UpdateInProgress));

    slow.await.unwrap().unwrap();
}
