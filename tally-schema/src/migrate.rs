//! Incremental upgrade of an existing, outdated schema.
//!
//! Migration is opt-in: it only runs while the migration marker artifact is
//! present (or recreation is forced), so an unrelated or manually managed
//! database is never migrated by surprise. The marker is removed only after
//! the runner reports success.

use tracing::{debug, info, warn};

use crate::{
    backend::BackendKind,
    config::{LifecycleConfig, LEGACY_PAYMENT_MAP_FIX_VERSION},
    engine::Engine,
    error::Result,
    ledger::{VersionLedger, VERSION_TABLE},
    patch::PatchApplier,
    probe::ObjectRef,
    runner::MigrationRunner,
    schema,
};

/// How a migration pass concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MigratePass {
    /// Marker absent, schema left untouched.
    Skipped,
    /// The runner was invoked and completed.
    Ran,
}

pub(crate) async fn run(
    engine: &dyn Engine,
    runner: &dyn MigrationRunner,
    config: &LifecycleConfig,
) -> Result<MigratePass> {
    if !config.marker_path.exists() && !config.recreate {
        debug!(marker = %config.marker_path.display(), "no migration marker, leaving schema as-is");
        return Ok(MigratePass::Skipped);
    }

    let ledger = VersionLedger::new(engine);
    let from_version = ledger.current_version().await?;
    let kind = engine.kind();

    if from_version < LEGACY_PAYMENT_MAP_FIX_VERSION && kind == BackendKind::Sqlite {
        apply_payment_map_fix(engine).await;
    }

    info!(%kind, from_version, "running versioned migrations");
    runner.run(kind, from_version).await?;

    // The runner tracks applied steps in its own table; the ledger is ours
    // to keep authoritative.
    PatchApplier::new(engine)
        .apply_if_absent(&schema::version_table_ddl(kind), &ObjectRef::new(VERSION_TABLE))
        .await?;
    ledger
        .ensure_versions_recorded_up_to(config.schema_version)
        .await?;

    if config.marker_path.exists() {
        std::fs::remove_file(&config.marker_path)?;
    }

    Ok(MigratePass::Ran)
}

/// One-time cleanup of the two legacy payment map display columns on the
/// compact local engine.
///
/// Best effort per column: some installs never had them, so each failure is
/// logged and swallowed. This is the only tolerated DDL error in the whole
/// lifecycle.
async fn apply_payment_map_fix(engine: &dyn Engine) {
    for column in ["display_at_payment_screen", "display_under_ticket"] {
        let sql = format!("ALTER TABLE payment_type_maps DROP COLUMN {column}");
        if let Err(err) = engine.execute(&sql).await {
            warn!(column, error = %err, "legacy payment map column drop failed, continuing");
        }
    }
}
