use std::time::Duration;

use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{backend::BackendKind, error::Result, probe::ObjectRef};

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "postgres")]
mod pg;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "memory")]
pub use memory::*;
#[cfg(feature = "postgres")]
pub use pg::*;
#[cfg(feature = "sqlite")]
pub use sqlite::*;

/// The mapping-layer boundary: everything the lifecycle needs from a
/// concrete storage backend.
///
/// An engine is scoped to a single lifecycle run. Implementations must treat
/// `object_exists` as a pure query; absence is a valid answer, never an
/// error.
#[async_trait]
pub trait Engine: DynClone + Send + Sync {
    /// The backend kind this engine targets, resolved at construction.
    fn kind(&self) -> BackendKind;

    /// Whether the target database exists at all.
    async fn schema_exists(&self) -> Result<bool>;

    /// Create the database and run the full creation script, bounded by the
    /// extended creation timeout.
    async fn create_schema(&self, timeout: Duration) -> Result<()>;

    /// The full baseline DDL script, re-issuable as a raw statement batch.
    fn creation_script(&self) -> String;

    /// Drop the database entirely.
    async fn drop_schema(&self) -> Result<()>;

    /// Execute a raw statement batch.
    async fn execute(&self, sql: &str) -> Result<()>;

    /// Run a raw scalar query, `None` when no row matches.
    async fn fetch_scalar(&self, sql: &str) -> Result<Option<i64>>;

    /// Whether a named schema object exists, case insensitive, optionally
    /// filtered by namespace.
    async fn object_exists(&self, object: &ObjectRef) -> Result<bool>;
}

dyn_clone::clone_trait_object!(Engine);
