//! Configuration for a schema lifecycle run.
//!
//! All tunables that were implicit in earlier Tally releases live here as an
//! explicit struct handed to [`SchemaLifecycle`](crate::SchemaLifecycle);
//! there is no hidden process-global connection state.

use std::path::PathBuf;
use std::time::Duration;

/// The schema version this build of the application expects.
///
/// A freshly created database is stamped with every version up to this one,
/// since a schema created from the current model is definitionally current.
pub const LATEST_SCHEMA_VERSION: i64 = 24;

/// Databases below this version on the compact local engine still carry the
/// two legacy payment map display columns that are dropped best-effort
/// before migration.
pub const LEGACY_PAYMENT_MAP_FIX_VERSION: i64 = 18;

/// Extended timeout for the initial schema creation.
///
/// Structural creation of the full table set against a remote server can far
/// exceed default command timeouts.
pub const DEFAULT_CREATION_TIMEOUT: Duration = Duration::from_secs(60 * 15);

/// Grace interval before re-issuing the creation script after a creation
/// failure, giving a slow remote provisioning operation time to finish.
pub const DEFAULT_RETRY_GRACE: Duration = Duration::from_secs(10);

/// File name of the migration marker artifact that gates whether migration
/// runs at all on an existing database.
pub const MIGRATION_MARKER_FILE: &str = "migrate.txt";

/// Configuration for one schema lifecycle run.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Target schema version for this application build.
    pub schema_version: i64,

    /// Drop and recreate the database even if it already exists.
    pub recreate: bool,

    /// Path of the migration marker artifact. Migration of an existing
    /// database only runs while this file is present; it is removed after a
    /// successful run.
    pub marker_path: PathBuf,

    /// Timeout applied to the schema creation operation.
    pub creation_timeout: Duration,

    /// Wait before the single raw-script creation retry.
    pub retry_grace: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            schema_version: LATEST_SCHEMA_VERSION,
            recreate: false,
            marker_path: PathBuf::from(MIGRATION_MARKER_FILE),
            creation_timeout: DEFAULT_CREATION_TIMEOUT,
            retry_grace: DEFAULT_RETRY_GRACE,
        }
    }
}

/// Builder for [`LifecycleConfig`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: LifecycleConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target schema version.
    pub fn schema_version(mut self, version: i64) -> Self {
        self.config.schema_version = version;
        self
    }

    /// Force a drop-and-recreate of any existing database.
    pub fn recreate(mut self, recreate: bool) -> Self {
        self.config.recreate = recreate;
        self
    }

    /// Set the migration marker artifact path.
    pub fn marker_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.marker_path = path.into();
        self
    }

    /// Set the schema creation timeout.
    pub fn creation_timeout(mut self, timeout: Duration) -> Self {
        self.config.creation_timeout = timeout;
        self
    }

    /// Set the grace interval before the raw-script creation retry.
    pub fn retry_grace(mut self, grace: Duration) -> Self {
        self.config.retry_grace = grace;
        self
    }

    pub fn build(self) -> LifecycleConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ConfigBuilder::new()
            .schema_version(7)
            .recreate(true)
            .marker_path("/tmp/migrate.txt")
            .retry_grace(Duration::from_millis(1))
            .build();

        assert_eq!(config.schema_version, 7);
        assert!(config.recreate);
        assert_eq!(config.marker_path, PathBuf::from("/tmp/migrate.txt"));
        assert_eq!(config.retry_grace, Duration::from_millis(1));
        assert_eq!(config.creation_timeout, DEFAULT_CREATION_TIMEOUT);
    }
}
