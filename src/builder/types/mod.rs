pub mod attributes;
pub mod relations;
pub mod schema;
pub mod uid;

pub use attributes::{
    Attribute, ComponentOptions, DynamicZoneOptions, EnumerationOptions, RelationOptions,
    ScalarOptions, UidOptions,
};
pub use relations::RelationKind;
pub use schema::{ContentTypeKind, EntitySchema, EntityType, SchemaInfo};
