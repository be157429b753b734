use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::LifecycleConfig,
    create,
    engine::Engine,
    error::Result,
    ledger::VersionLedger,
    migrate::{self, MigratePass},
    runner::MigrationRunner,
    state::PublishedVersion,
};

/// Where a lifecycle run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Unprobed,
    Creating,
    Migrating,
    Ready,
    Failed,
}

/// How a completed lifecycle run left the database, carrying the resulting
/// current schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleOutcome {
    /// The schema did not exist (or recreation was forced) and was created
    /// at the latest version.
    Created(i64),
    /// The migration runner was invoked on an existing schema.
    Migrated(i64),
    /// The schema existed and nothing had to run.
    AlreadyCurrent(i64),
}

impl LifecycleOutcome {
    /// The current schema version after the run.
    pub fn version(&self) -> i64 {
        match self {
            Self::Created(v) | Self::Migrated(v) | Self::AlreadyCurrent(v) => *v,
        }
    }
}

/// Drives the schema lifecycle once, early in process startup: decides
/// between creation and migration, carries the chosen path out, and
/// publishes the resulting schema version.
///
/// Not designed for concurrent invocation; callers must ensure at most one
/// lifecycle run per physical database at a time. The engine is scoped to
/// the run and can be released once `run` returns, on every exit path.
pub struct SchemaLifecycle {
    engine: Box<dyn Engine>,
    runner: Box<dyn MigrationRunner>,
    config: LifecycleConfig,
    state: LifecycleState,
    published: PublishedVersion,
}

impl SchemaLifecycle {
    pub fn new<E, R>(engine: E, runner: R, config: LifecycleConfig) -> Self
    where
        E: Engine + 'static,
        R: MigrationRunner + 'static,
    {
        Self {
            engine: Box::new(engine),
            runner: Box::new(runner),
            config,
            state: LifecycleState::Unprobed,
            published: PublishedVersion::new(),
        }
    }

    /// The process-wide version handle; `Some` once the run reaches Ready.
    pub fn published(&self) -> PublishedVersion {
        self.published.clone()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Probe the database and run the creation or migration path to
    /// completion.
    ///
    /// Any fatal error leaves the lifecycle in `Failed`; the application is
    /// expected to abort startup rather than continue against an unknown
    /// schema state.
    pub async fn run(&mut self) -> Result<LifecycleOutcome> {
        let exists = self.engine.schema_exists().await?;

        self.state = if !exists || self.config.recreate {
            LifecycleState::Creating
        } else {
            LifecycleState::Migrating
        };

        let outcome = match self.state {
            LifecycleState::Creating => {
                create::run(self.engine.as_ref(), &self.config)
                    .await
                    .map(|_| Route::Created)
            }
            LifecycleState::Migrating => {
                migrate::run(self.engine.as_ref(), self.runner.as_ref(), &self.config)
                    .await
                    .map(Route::Migrated)
            }
            _ => unreachable!("lifecycle routed to a non-working state"),
        };

        let route = match outcome {
            Ok(route) => route,
            Err(err) => {
                self.state = LifecycleState::Failed;
                return Err(err);
            }
        };

        self.state = LifecycleState::Ready;

        let version = VersionLedger::new(self.engine.as_ref())
            .current_version()
            .await?;
        self.published.publish(version);
        info!(version, "schema lifecycle ready");

        Ok(match route {
            Route::Created => LifecycleOutcome::Created(version),
            Route::Migrated(MigratePass::Ran) => LifecycleOutcome::Migrated(version),
            Route::Migrated(MigratePass::Skipped) => LifecycleOutcome::AlreadyCurrent(version),
        })
    }
}

enum Route {
    Created,
    Migrated(MigratePass),
}
