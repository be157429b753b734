use crate::{engine::Engine, error::Result, probe::ObjectRef};

/// Name of the version ledger table.
pub const VERSION_TABLE: &str = "version_info";

/// The durable, append-only record of every schema version this database
/// has passed through.
///
/// Its maximum value is the authoritative current schema version; an absent
/// ledger table reads as version 0, never as an error. Rows are only ever
/// inserted, each guarded so repeated runs stay idempotent.
pub struct VersionLedger<'a> {
    engine: &'a dyn Engine,
}

impl<'a> VersionLedger<'a> {
    pub fn new(engine: &'a dyn Engine) -> Self {
        Self { engine }
    }

    /// The maximum recorded version, 0 when the ledger table is absent or
    /// empty.
    pub async fn current_version(&self) -> Result<i64> {
        if !self
            .engine
            .object_exists(&ObjectRef::new(VERSION_TABLE))
            .await?
        {
            return Ok(0);
        }

        let version = self
            .engine
            .fetch_scalar("SELECT version FROM version_info ORDER BY version DESC LIMIT 1")
            .await?;

        Ok(version.unwrap_or(0))
    }

    /// Insert `version` into the ledger unless a row for it already exists.
    pub async fn ensure_version_recorded(&self, version: i64) -> Result<()> {
        let sql = format!(
            "INSERT INTO version_info (version) \
             SELECT {version} \
             WHERE NOT EXISTS (SELECT 1 FROM version_info WHERE version = {version})"
        );

        self.engine.execute(&sql).await
    }

    /// Record every version in `[1, version]` in ascending order.
    ///
    /// Used after a fresh creation: a schema created from the current model
    /// has implicitly passed through every version.
    pub async fn ensure_versions_recorded_up_to(&self, version: i64) -> Result<()> {
        for v in 1..=version {
            self.ensure_version_recorded(v).await?;
        }

        Ok(())
    }
}
