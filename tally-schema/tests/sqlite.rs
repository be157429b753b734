use tally_schema::{
    schema, BackendKind, ConfigBuilder, Engine, LifecycleConfig, LifecycleOutcome, NoopRunner,
    ObjectRef, PatchApplier, SchemaLifecycle, SqliteEngine, VersionLedger,
    LATEST_SCHEMA_VERSION,
};
use tempfile::TempDir;

use crate::common::FakeRunner;

mod common;

fn setup(dir: &TempDir) -> (String, LifecycleConfig) {
    let url = format!("sqlite://{}/tally.db", dir.path().display());
    let config = ConfigBuilder::new()
        .marker_path(dir.path().join("migrate.txt"))
        .build();

    (url, config)
}

#[tokio::test]
async fn fresh_lifecycle_creates_the_full_schema() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    let engine = SqliteEngine::connect(&url)?;

    let mut lifecycle = SchemaLifecycle::new(engine.clone(), NoopRunner, config);
    let outcome = lifecycle.run().await?;

    assert_eq!(outcome, LifecycleOutcome::Created(LATEST_SCHEMA_VERSION));

    for object in [
        "tickets",
        "entity_state_values",
        "users",
        "payment_type_maps",
        "version_info",
        schema::IDX_TICKETS_LAST_PAYMENT_DATE,
        schema::IDX_ENTITY_STATE_VALUES_ENTITY_ID,
    ] {
        assert!(
            engine.object_exists(&ObjectRef::new(object)).await?,
            "missing `{object}`"
        );
    }

    let rows: Option<i64> = engine
        .fetch_scalar("SELECT count(*) FROM version_info")
        .await?;
    assert_eq!(rows, Some(LATEST_SCHEMA_VERSION));

    Ok(())
}

#[tokio::test]
async fn second_run_without_marker_is_already_current() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    let engine = SqliteEngine::connect(&url)?;

    SchemaLifecycle::new(engine.clone(), NoopRunner, config.clone())
        .run()
        .await?;

    let mut second = SchemaLifecycle::new(engine, NoopRunner, config);
    let outcome = second.run().await?;

    assert_eq!(
        outcome,
        LifecycleOutcome::AlreadyCurrent(LATEST_SCHEMA_VERSION)
    );

    Ok(())
}

#[tokio::test]
async fn marker_hands_an_existing_database_to_the_runner() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    let engine = SqliteEngine::connect(&url)?;

    SchemaLifecycle::new(engine.clone(), NoopRunner, config.clone())
        .run()
        .await?;
    std::fs::write(&config.marker_path, "1")?;

    let runner = FakeRunner::new();
    let mut lifecycle = SchemaLifecycle::new(engine, runner.clone(), config.clone());
    let outcome = lifecycle.run().await?;

    assert_eq!(outcome, LifecycleOutcome::Migrated(LATEST_SCHEMA_VERSION));
    assert_eq!(
        runner.calls(),
        vec![(BackendKind::Sqlite, LATEST_SCHEMA_VERSION)]
    );
    assert!(!config.marker_path.exists());

    Ok(())
}

#[tokio::test]
async fn ledger_inserts_stay_idempotent() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    let engine = SqliteEngine::connect(&url)?;

    SchemaLifecycle::new(engine.clone(), NoopRunner, config)
        .run()
        .await?;

    let ledger = VersionLedger::new(&engine);
    ledger.ensure_version_recorded(5).await?;
    ledger.ensure_version_recorded(5).await?;

    let rows: Option<i64> = engine
        .fetch_scalar("SELECT count(*) FROM version_info WHERE version = 5")
        .await?;
    assert_eq!(rows, Some(1));
    assert_eq!(ledger.current_version().await?, LATEST_SCHEMA_VERSION);

    Ok(())
}

#[tokio::test]
async fn patch_skips_ddl_once_the_target_exists() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    let engine = SqliteEngine::connect(&url)?;

    SchemaLifecycle::new(engine.clone(), NoopRunner, config)
        .run()
        .await?;

    let applied = PatchApplier::new(&engine)
        .apply_if_absent(
            &schema::version_table_ddl(BackendKind::Sqlite),
            &ObjectRef::new("version_info"),
        )
        .await?;

    assert!(!applied);

    Ok(())
}

#[tokio::test]
async fn probe_only_matches_the_main_namespace() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let (url, config) = setup(&dir);
    let engine = SqliteEngine::connect(&url)?;

    SchemaLifecycle::new(engine.clone(), NoopRunner, config)
        .run()
        .await?;

    assert!(
        engine
            .object_exists(&ObjectRef::in_namespace("tickets", "main"))
            .await?
    );
    assert!(
        !engine
            .object_exists(&ObjectRef::in_namespace("tickets", "reporting"))
            .await?
    );
    assert!(!engine.object_exists(&ObjectRef::new("no_such_table")).await?);

    Ok(())
}
