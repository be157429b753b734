use tracing::debug;

use crate::{engine::Engine, error::Result, probe::ObjectRef};

/// Applies structural patches guarded by existence checks, so a patch can be
/// attempted on every start without ever re-executing its DDL.
///
/// DDL failures propagate; a failed structural patch aborts the whole
/// creation or migration attempt.
pub struct PatchApplier<'a> {
    engine: &'a dyn Engine,
}

impl<'a> PatchApplier<'a> {
    pub fn new(engine: &'a dyn Engine) -> Self {
        Self { engine }
    }

    /// Execute `ddl` only if `target` does not exist yet. Returns whether
    /// the statement ran.
    pub async fn apply_if_absent(&self, ddl: &str, target: &ObjectRef) -> Result<bool> {
        if self.engine.object_exists(target).await? {
            debug!(target = %target, "patch target already present, skipping");
            return Ok(false);
        }

        self.engine.execute(ddl).await?;

        Ok(true)
    }

    /// Execute `ddl` only if `target` is absent and `prereq` exists.
    ///
    /// Some tables are created lazily by the mapping layer; an index patch
    /// on such a table is skipped rather than failed while the table is
    /// missing.
    pub async fn apply_if_absent_with_prereq(
        &self,
        ddl: &str,
        target: &ObjectRef,
        prereq: &ObjectRef,
    ) -> Result<bool> {
        if !self.engine.object_exists(prereq).await? {
            debug!(target = %target, prereq = %prereq, "prerequisite absent, skipping patch");
            return Ok(false);
        }

        self.apply_if_absent(ddl, target).await
    }
}
