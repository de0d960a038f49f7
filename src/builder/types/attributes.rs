//! The attribute sum type
//!
//! Attributes are a closed tagged union keyed by `type` in the persisted
//! JSON. Scalar kinds are opaque to the engine beyond the validity of their
//! options; the structural kinds (`uid`, `component`, `dynamiczone`,
//! `relation`) are the ones the builder reasons about. Keeping this a closed
//! enum means every new kind is a compile-time exhaustiveness gap in the
//! synthesizer and cascade code rather than a silent no-op branch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::relations::RelationKind;

/// One attribute of an entity schema, discriminated by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Attribute {
    String(ScalarOptions),
    Text(ScalarOptions),
    Richtext(ScalarOptions),
    Email(ScalarOptions),
    Password(ScalarOptions),
    Integer(ScalarOptions),
    Biginteger(ScalarOptions),
    Float(ScalarOptions),
    Decimal(ScalarOptions),
    Boolean(ScalarOptions),
    Date(ScalarOptions),
    Datetime(ScalarOptions),
    Time(ScalarOptions),
    Timestamp(ScalarOptions),
    Json(ScalarOptions),
    Enumeration(EnumerationOptions),
    Uid(UidOptions),
    Component(ComponentOptions),
    Dynamiczone(DynamicZoneOptions),
    Relation(RelationOptions),
}

/// Options shared by every scalar kind. Anything the engine does not need to
/// inspect (min/max, regex, default formats) passes through `extra` verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_options: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumerationOptions {
    #[serde(rename = "enum")]
    pub values: Vec<String>,
    #[serde(flatten)]
    pub options: ScalarOptions,
}

/// A slug field, optionally bound to a text-like scalar on the same entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UidOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    #[serde(flatten)]
    pub options: ScalarOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOptions {
    /// UID of the referenced component.
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<bool>,
    #[serde(flatten)]
    pub options: ScalarOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicZoneOptions {
    /// Ordered list of allowed component UIDs.
    pub components: Vec<String>,
    #[serde(flatten)]
    pub options: ScalarOptions,
}

/// A relation attribute. `target_attribute` only exists on incoming edit
/// payloads; once the counterpart is synthesized the persisted document
/// carries `inversed_by` on the owning side and `mapped_by` on the inverse
/// side instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationOptions {
    pub relation: RelationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inversed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RelationOptions {
    pub fn new(relation: RelationKind, target: Option<String>) -> Self {
        Self {
            relation,
            target,
            target_attribute: None,
            inversed_by: None,
            mapped_by: None,
            dominant: None,
            required: None,
            unique: None,
            private: None,
            configurable: None,
            plugin_options: None,
            conditions: None,
            extra: Map::new(),
        }
    }

    /// Key of the counterpart attribute on the target entity, whichever
    /// side-pointer is present.
    pub fn counterpart_key(&self) -> Option<&str> {
        self.inversed_by.as_deref().or(self.mapped_by.as_deref())
    }
}

impl Attribute {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Text(_) => "text",
            Self::Richtext(_) => "richtext",
            Self::Email(_) => "email",
            Self::Password(_) => "password",
            Self::Integer(_) => "integer",
            Self::Biginteger(_) => "biginteger",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Datetime(_) => "datetime",
            Self::Time(_) => "time",
            Self::Timestamp(_) => "timestamp",
            Self::Json(_) => "json",
            Self::Enumeration(_) => "enumeration",
            Self::Uid(_) => "uid",
            Self::Component(_) => "component",
            Self::Dynamiczone(_) => "dynamiczone",
            Self::Relation(_) => "relation",
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, Self::Relation(_))
    }

    pub fn as_relation(&self) -> Option<&RelationOptions> {
        match self {
            Self::Relation(options) => Some(options),
            _ => None,
        }
    }

    pub fn as_relation_mut(&mut self) -> Option<&mut RelationOptions> {
        match self {
            Self::Relation(options) => Some(options),
            _ => None,
        }
    }

    /// Whether a text-like scalar can back a `uid` attribute's `targetField`.
    pub fn is_text_like(&self) -> bool {
        matches!(self, Self::String(_) | Self::Text(_))
    }

    /// Whether the attribute was locked by its author against edits from the
    /// builder surface.
    pub fn is_unconfigurable(&self) -> bool {
        let configurable = match self {
            Self::Enumeration(o) => o.options.configurable,
            Self::Uid(o) => o.options.configurable,
            Self::Component(o) => o.options.configurable,
            Self::Dynamiczone(o) => o.options.configurable,
            Self::Relation(o) => o.configurable,
            Self::String(o)
            | Self::Text(o)
            | Self::Richtext(o)
            | Self::Email(o)
            | Self::Password(o)
            | Self::Integer(o)
            | Self::Biginteger(o)
            | Self::Float(o)
            | Self::Decimal(o)
            | Self::Boolean(o)
            | Self::Date(o)
            | Self::Datetime(o)
            | Self::Time(o)
            | Self::Timestamp(o)
            | Self::Json(o) => o.configurable,
        };
        configurable == Some(false)
    }
}
