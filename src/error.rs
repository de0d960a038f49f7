//! # Builder Error Handling
//!
//! Unified error handling for the schema builder engine, providing structured
//! error information that preserves context while enabling better debugging.
//!
//! This error system is designed to:
//! - Provide specific error variants for registry, relation and persistence failures
//! - Preserve error context and enable error chaining
//! - Distinguish recoverable write failures from a failed rollback

use thiserror::Error;

/// Result alias used throughout the builder engine.
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Unified error type for schema builder operations.
///
/// Structural and graph violations are raised synchronously at the point of
/// mutation and abort the in-progress operation. Persistence variants are
/// produced by the transactional writer; `RollbackFailed` means the registry
/// is poisoned and must be re-seeded from disk before further edits.
#[derive(Error, Debug)]
pub enum BuilderError {
    // ========== Registry Lookup Errors ==========
    /// No entity with the given UID is registered
    #[error("Schema not found: {uid}")]
    NotFound { uid: String },

    /// An entity with the given UID is already registered
    #[error("Schema already exists: {uid}")]
    AlreadyExists { uid: String },

    /// An attribute key collides with an existing key on the same entity
    #[error("Attribute `{key}` already exists on {uid}")]
    DuplicateAttribute { uid: String, key: String },

    // ========== Identifier Errors ==========
    /// A supplied UID does not match its deterministic derivation
    #[error("Invalid UID `{uid}`: {reason}")]
    InvalidUid { uid: String, reason: String },

    // ========== Relation Errors ==========
    /// A relation points at a UID that is absent from the registry, or at an
    /// entity kind that cannot hold this relation
    #[error("Invalid relation target for `{attribute}`: {reason}")]
    InvalidRelationTarget { attribute: String, reason: String },

    // ========== Business Rule Errors ==========
    /// A category rename or similar business-rule violation
    #[error("{0}")]
    Application(String),

    // ========== Persistence Errors ==========
    /// Filesystem failure while flushing a handle; triggers rollback
    #[error("Failed to write schema `{uid}` to {path}: {source}")]
    Write {
        uid: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failure while flushing a handle; triggers rollback
    #[error("Failed to serialize schema `{uid}`: {source}")]
    Serialize {
        uid: String,
        #[source]
        source: serde_json::Error,
    },

    /// Rollback itself failed; the registry is in an inconsistent state and
    /// the session must not be reused
    #[error("Rollback failed for `{uid}`: {reason}")]
    RollbackFailed { uid: String, reason: String },

    // ========== Session Errors ==========
    /// A second top-level update was attempted while one is in flight
    #[error("A schema update is already in progress")]
    UpdateInProgress,
}

impl BuilderError {
    pub fn not_found(uid: impl Into<String>) -> Self {
        Self::NotFound { uid: uid.into() }
    }

    pub fn already_exists(uid: impl Into<String>) -> Self {
        Self::AlreadyExists { uid: uid.into() }
    }

    pub fn invalid_uid(uid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUid {
            uid: uid.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_relation_target(
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRelationTarget {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// True for the fatal variant after which a session must be discarded.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RollbackFailed { .. })
    }
}
