//! Relation kinds and the inverse-kind mapping
//!
//! The relation kind is the cardinality/directionality tag of a relation
//! attribute. Asymmetric kinds swap under inversion, symmetric kinds keep
//! their kind and flip dominance, morph source kinds map onto a fixed morph
//! counterpart, and unidirectional kinds have no counterpart at all.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    OneWay,
    ManyWay,
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    MorphOne,
    MorphMany,
    MorphToOne,
    MorphToMany,
}

impl RelationKind {
    /// Kinds where exactly one side owns the join and the other is inverse.
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::OneToOne | Self::ManyToMany)
    }

    /// Kinds that can never carry a counterpart attribute.
    pub fn is_unidirectional(self) -> bool {
        matches!(
            self,
            Self::OneWay | Self::ManyWay | Self::MorphToOne | Self::MorphToMany
        )
    }

    pub fn is_morph(self) -> bool {
        matches!(
            self,
            Self::MorphOne | Self::MorphMany | Self::MorphToOne | Self::MorphToMany
        )
    }

    /// Kinds whose `target` field is meaningful. The polymorphic `morphTo*`
    /// kinds resolve their target per entry, not per schema.
    pub fn is_targeted(self) -> bool {
        !matches!(self, Self::MorphToOne | Self::MorphToMany)
    }

    /// The counterpart kind installed on the target entity, or `None` for
    /// kinds that never synthesize one.
    pub fn inverse(self) -> Option<RelationKind> {
        match self {
            Self::OneToOne => Some(Self::OneToOne),
            Self::OneToMany => Some(Self::ManyToOne),
            Self::ManyToOne => Some(Self::OneToMany),
            Self::ManyToMany => Some(Self::ManyToMany),
            // Morph sources get a fixed polymorphic counterpart, not a swap.
            Self::MorphOne | Self::MorphMany => Some(Self::MorphToMany),
            Self::OneWay | Self::ManyWay | Self::MorphToOne | Self::MorphToMany => None,
        }
    }

    /// The unidirectional variant a surviving side falls back to when its
    /// counterpart attribute is deleted out from under it.
    pub fn as_unidirectional(self) -> RelationKind {
        match self {
            Self::OneToOne | Self::ManyToOne => Self::OneWay,
            Self::OneToMany | Self::ManyToMany => Self::ManyWay,
            Self::OneWay
            | Self::ManyWay
            | Self::MorphOne
            | Self::MorphMany
            | Self::MorphToOne
            | Self::MorphToMany => self,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneWay => "oneWay",
            Self::ManyWay => "manyWay",
            Self::OneToOne => "oneToOne",
            Self::OneToMany => "oneToMany",
            Self::ManyToOne => "manyToOne",
            Self::ManyToMany => "manyToMany",
            Self::MorphOne => "morphOne",
            Self::MorphMany => "morphMany",
            Self::MorphToOne => "morphToOne",
            Self::MorphToMany => "morphToMany",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asymmetric_kinds_swap_under_inversion() {
        assert_eq!(RelationKind::OneToMany.inverse(), Some(RelationKind::ManyToOne));
        assert_eq!(RelationKind::ManyToOne.inverse(), Some(RelationKind::OneToMany));
    }

    #[test]
    fn symmetric_kinds_keep_their_kind() {
        assert_eq!(RelationKind::OneToOne.inverse(), Some(RelationKind::OneToOne));
        assert_eq!(RelationKind::ManyToMany.inverse(), Some(RelationKind::ManyToMany));
    }

    #[test]
    fn unidirectional_kinds_have_no_inverse() {
        assert_eq!(RelationKind::OneWay.inverse(), None);
        assert_eq!(RelationKind::ManyWay.inverse(), None);
        assert_eq!(RelationKind::MorphToMany.inverse(), None);
    }

    #[test]
    fn morph_sources_map_to_fixed_counterpart() {
        assert_eq!(RelationKind::MorphOne.inverse(), Some(RelationKind::MorphToMany));
        assert_eq!(RelationKind::MorphMany.inverse(), Some(RelationKind::MorphToMany));
    }

    #[test]
    fn serde_uses_camel_case_tags() {
        let kind: RelationKind = serde_json::from_str("\"manyToOne\"").unwrap();
        assert_eq!(kind, RelationKind::ManyToOne);
        assert_eq!(serde_json::to_string(&RelationKind::OneWay).unwrap(), "\"oneWay\"");
    }
}
