//! API-scaffold collaborator interface
//!
//! The hosting process regenerates runtime endpoint code whenever a content
//! type's kind changes or the type is deleted. The update service drives the
//! collaborator through the same backup/rollback discipline the writer
//! applies to schema files: backup before clearing, roll back (best effort)
//! if the session fails after a clear.

use crate::error::BuilderResult;

pub trait ScaffoldGenerator: Send + Sync {
    /// Snapshot the generated scaffolding for one content type.
    fn backup(&self, uid: &str) -> BuilderResult<()>;

    /// Remove the generated scaffolding for one content type.
    fn clear(&self, uid: &str) -> BuilderResult<()>;

    /// Restore the scaffolding from the last backup.
    fn rollback(&self, uid: &str) -> BuilderResult<()>;
}

/// Collaborator for hosts that generate no scaffolding.
#[derive(Debug, Default)]
pub struct NoopScaffold;

impl ScaffoldGenerator for NoopScaffold {
    fn backup(&self, _uid: &str) -> BuilderResult<()> {
        Ok(())
    }

    fn clear(&self, _uid: &str) -> BuilderResult<()> {
        Ok(())
    }

    fn rollback(&self, _uid: &str) -> BuilderResult<()> {
        Ok(())
    }
}
