//! # schemaforge
//!
//! A schema builder engine: describe a data model as content types and
//! reusable components with typed attributes, and persist that description
//! as one JSON schema file per entity while keeping the whole model
//! internally consistent.
//!
//! The engine is responsible for:
//! - Maintaining a per-session registry of draft schema handles
//! - Synthesizing and maintaining the counterpart of every relation
//! - Cascading renames and deletions across every referencing entity
//! - Committing all drafts to disk transactionally, or rolling them back
//!
//! HTTP handling, payload shape validation, runtime scaffolding generation
//! and telemetry delivery are external collaborators; see
//! [`builder::scaffold`] and [`builder::events`] for their interfaces.

pub mod builder;
pub mod error;

pub use builder::{
    Attribute, CommitReport, ComponentDefinition, ContentTypeDefinition, ContentTypeKind,
    EditDefinition, EntitySchema, EntityType, RelationKind, RelationOptions, SchemaBuilder,
    SchemaInfo, SchemaOperation, SchemaPaths, SchemaRegistry, UpdateService,
};
pub use error::{BuilderError, BuilderResult};
