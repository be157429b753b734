//! First-time schema creation.
//!
//! Creation against a remote store is the single most failure-prone
//! operation in the lifecycle, so it is the only place with a timed retry:
//! when the creation call fails but the database turns out to exist, the
//! remote service is assumed to still be provisioning and the creation
//! script is re-issued once as a raw batch after a grace wait. Every other
//! failure is fatal, and fatal creation failures drop the partially created
//! database so the next run never mistakes it for an existing schema.

use tracing::{error, warn};

use crate::{
    config::LifecycleConfig,
    engine::Engine,
    error::Result,
    ledger::{VersionLedger, VERSION_TABLE},
    patch::PatchApplier,
    probe::ObjectRef,
    schema,
};

/// Create the schema from scratch and stamp it as current.
///
/// On any unrecovered error the partially created database is dropped
/// before the error surfaces.
pub(crate) async fn run(engine: &dyn Engine, config: &LifecycleConfig) -> Result<i64> {
    match create(engine, config).await {
        Ok(version) => Ok(version),
        Err(err) => {
            error!(error = %err, "schema creation failed, dropping partially created database");
            if let Err(drop_err) = engine.drop_schema().await {
                error!(error = %drop_err, "failed to drop partially created database");
            }
            Err(err)
        }
    }
}

async fn create(engine: &dyn Engine, config: &LifecycleConfig) -> Result<i64> {
    if config.recreate && engine.schema_exists().await? {
        warn!("forced recreation requested, dropping existing database");
        engine.drop_schema().await?;
    }

    if let Err(err) = engine.create_schema(config.creation_timeout).await {
        // A remote service tends to time out while table creation is still
        // completing on its side.
        if !engine.schema_exists().await? {
            return Err(err);
        }

        warn!(
            error = %err,
            grace = ?config.retry_grace,
            "creation failed but database exists, re-issuing creation script once"
        );
        tokio::time::sleep(config.retry_grace).await;
        engine.execute(&engine.creation_script()).await?;
    }

    let kind = engine.kind();
    let patches = PatchApplier::new(engine);

    patches
        .apply_if_absent(&schema::version_table_ddl(kind), &ObjectRef::new(VERSION_TABLE))
        .await?;
    patches
        .apply_if_absent_with_prereq(
            &schema::tickets_last_payment_idx_ddl(kind),
            &ObjectRef::new(schema::IDX_TICKETS_LAST_PAYMENT_DATE),
            &ObjectRef::new("tickets"),
        )
        .await?;
    patches
        .apply_if_absent_with_prereq(
            &schema::entity_state_values_entity_idx_ddl(kind),
            &ObjectRef::new(schema::IDX_ENTITY_STATE_VALUES_ENTITY_ID),
            &ObjectRef::new("entity_state_values"),
        )
        .await?;

    // A schema created from the current model has implicitly passed through
    // every version.
    VersionLedger::new(engine)
        .ensure_versions_recorded_up_to(config.schema_version)
        .await?;

    Ok(config.schema_version)
}
