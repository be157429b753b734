use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{backend::BackendKind, error::Result};

/// The versioned migration runner boundary.
///
/// The runner owns the compiled set of migration steps, decides which steps
/// between `from_version` and its latest available step must run, and runs
/// them in ascending order under its own transaction discipline. The
/// lifecycle treats it as a black box: its errors propagate unchanged and
/// nothing here rolls back steps it has already applied.
#[async_trait]
pub trait MigrationRunner: DynClone + Send + Sync {
    async fn run(&self, kind: BackendKind, from_version: i64) -> Result<()>;
}

dyn_clone::clone_trait_object!(MigrationRunner);

/// Runner that applies nothing, for databases managed entirely by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunner;

#[async_trait]
impl MigrationRunner for NoopRunner {
    async fn run(&self, _kind: BackendKind, _from_version: i64) -> Result<()> {
        Ok(())
    }
}
