pub mod cascade;
pub mod events;
pub mod handle;
pub mod loader;
pub mod orchestrator;
pub mod paths;
pub mod registry;
pub mod scaffold;
pub mod service;
pub mod synthesizer;
pub mod types;
pub mod writer;

pub use handle::{HandleStatus, SchemaHandle};
pub use orchestrator::{
    ComponentDefinition, ContentTypeDefinition, EditDefinition, EditOutcome, SchemaBuilder,
};
pub use paths::SchemaPaths;
pub use registry::{PendingComponent, RegistrySnapshot, SchemaRegistry};
pub use service::{SchemaOperation, UpdateService};
pub use writer::CommitReport;

// Re-export all types at the builder module level
pub use types::{
    Attribute, ComponentOptions, ContentTypeKind, DynamicZoneOptions, EntitySchema, EntityType,
    RelationKind, RelationOptions, ScalarOptions, SchemaInfo, UidOptions,
};
