use std::time::Duration;

use sqlx_migrator::Info;
use tally_migrations::SqliteMigrationRunner;
use tally_schema::{
    schema, BackendKind, ConfigBuilder, Engine, LifecycleConfig, LifecycleOutcome,
    MigrationRunner, ObjectRef, SchemaError, SchemaLifecycle, SqliteEngine, VersionLedger,
    LATEST_SCHEMA_VERSION,
};
use tempfile::TempDir;

fn setup(dir: &TempDir) -> (String, LifecycleConfig) {
    let url = format!("sqlite://{}/tally.db", dir.path().display());
    let config = ConfigBuilder::new()
        .marker_path(dir.path().join("migrate.txt"))
        .build();

    (url, config)
}

/// Build a database the way a pre-v18 install would have left it: baseline
/// tables, a ledger stopping at 17 and the two legacy payment map display
/// columns still in place.
async fn stale_database(url: &str) -> anyhow::Result<SqliteEngine> {
    let engine = SqliteEngine::connect(url)?;
    engine.create_schema(Duration::from_secs(30)).await?;
    engine
        .execute(&schema::version_table_ddl(BackendKind::Sqlite))
        .await?;
    VersionLedger::new(&engine)
        .ensure_versions_recorded_up_to(17)
        .await?;
    engine
        .execute("ALTER TABLE payment_type_maps ADD COLUMN display_at_payment_screen boolean")
        .await?;
    engine
        .execute("ALTER TABLE payment_type_maps ADD COLUMN display_under_ticket boolean")
        .await?;

    Ok(engine)
}

#[tokio::test]
async fn stale_database_is_migrated_to_current() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    std::fs::write(&config.marker_path, "1")?;

    let engine = stale_database(&url).await?;
    let runner = SqliteMigrationRunner::new(engine.pool());

    let mut lifecycle = SchemaLifecycle::new(engine.clone(), runner, config.clone());
    let outcome = lifecycle.run().await?;

    assert_eq!(outcome, LifecycleOutcome::Migrated(LATEST_SCHEMA_VERSION));
    assert!(!config.marker_path.exists());

    for object in ["order_states", "idx_order_states_ticket_id"] {
        assert!(
            engine.object_exists(&ObjectRef::new(object)).await?,
            "missing `{object}`"
        );
    }
    assert!(
        engine
            .object_exists(&ObjectRef::new("idx_payment_type_maps_payment_type_id"))
            .await?
    );

    let note_columns = engine
        .fetch_scalar("SELECT count(*) FROM pragma_table_info('tickets') WHERE name = 'note'")
        .await?;
    assert_eq!(note_columns, Some(1));

    let legacy_columns = engine
        .fetch_scalar(
            "SELECT count(*) FROM pragma_table_info('payment_type_maps') \
             WHERE name IN ('display_at_payment_screen', 'display_under_ticket')",
        )
        .await?;
    assert_eq!(legacy_columns, Some(0));

    let ledger = VersionLedger::new(&engine);
    assert_eq!(ledger.current_version().await?, LATEST_SCHEMA_VERSION);
    let rows = engine
        .fetch_scalar("SELECT count(*) FROM version_info")
        .await?;
    assert_eq!(rows, Some(LATEST_SCHEMA_VERSION));

    Ok(())
}

#[tokio::test]
async fn migration_is_repeatable_once_current() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    std::fs::write(&config.marker_path, "1")?;

    let engine = stale_database(&url).await?;
    let runner = SqliteMigrationRunner::new(engine.pool());

    SchemaLifecycle::new(engine.clone(), runner.clone(), config.clone())
        .run()
        .await?;

    // A fresh marker on an up-to-date database runs the runner again with
    // nothing pending.
    std::fs::write(&config.marker_path, "1")?;
    let mut lifecycle = SchemaLifecycle::new(engine.clone(), runner, config.clone());
    let outcome = lifecycle.run().await?;

    assert_eq!(outcome, LifecycleOutcome::Migrated(LATEST_SCHEMA_VERSION));
    assert!(!config.marker_path.exists());
    let rows = engine
        .fetch_scalar("SELECT count(*) FROM version_info")
        .await?;
    assert_eq!(rows, Some(LATEST_SCHEMA_VERSION));

    Ok(())
}

#[tokio::test]
async fn runner_rejects_a_mismatched_backend() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, _) = setup(&dir);

    let runner = SqliteMigrationRunner::new(SqliteEngine::connect(&url)?.pool());
    let result = runner.run(BackendKind::Postgres, 0).await;

    assert!(matches!(
        result,
        Err(SchemaError::BackendMismatch { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn migrator_registers_the_full_set() -> anyhow::Result<()> {
    let migrator = tally_migrations::new::<sqlx::Sqlite>()?;

    assert_eq!(migrator.migrations().len(), 2);

    Ok(())
}
