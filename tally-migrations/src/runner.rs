use async_trait::async_trait;
use tracing::info;

use tally_schema::{BackendKind, MigrationRunner, Result, SchemaError};

#[cfg(feature = "sqlite")]
use sqlx_migrator::{Migrate, Plan};

/// [`MigrationRunner`] backed by the compiled migration set in this crate,
/// for the compact local engine.
///
/// Step selection and ordering belong to `sqlx_migrator`: it tracks applied
/// migrations in its own table and applies only what is pending, each step
/// in its own transaction.
#[cfg(feature = "sqlite")]
#[derive(Clone)]
pub struct SqliteMigrationRunner {
    pool: sqlx::SqlitePool,
}

#[cfg(feature = "sqlite")]
impl SqliteMigrationRunner {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl MigrationRunner for SqliteMigrationRunner {
    async fn run(&self, kind: BackendKind, from_version: i64) -> Result<()> {
        if kind != BackendKind::Sqlite {
            return Err(SchemaError::BackendMismatch {
                requested: kind.as_str().to_owned(),
                actual: BackendKind::Sqlite.as_str().to_owned(),
            });
        }

        info!(from_version, "applying pending migrations");

        let migrator = crate::new::<sqlx::Sqlite>().map_err(anyhow::Error::from)?;
        let mut conn = self.pool.acquire().await?;
        migrator
            .run(&mut *conn, &Plan::apply_all())
            .await
            .map_err(anyhow::Error::from)?;

        Ok(())
    }
}

/// [`MigrationRunner`] backed by the compiled migration set in this crate,
/// for the full relational server.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct PgMigrationRunner {
    pool: sqlx::PgPool,
}

#[cfg(feature = "postgres")]
impl PgMigrationRunner {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[cfg(feature = "postgres")]
#[async_trait]
impl MigrationRunner for PgMigrationRunner {
    async fn run(&self, kind: BackendKind, from_version: i64) -> Result<()> {
        use sqlx_migrator::{Migrate, Plan};

        if kind != BackendKind::Postgres {
            return Err(SchemaError::BackendMismatch {
                requested: kind.as_str().to_owned(),
                actual: BackendKind::Postgres.as_str().to_owned(),
            });
        }

        info!(from_version, "applying pending migrations");

        let migrator = crate::new::<sqlx::Postgres>().map_err(anyhow::Error::from)?;
        let mut conn = self.pool.acquire().await?;
        migrator
            .run(&mut *conn, &Plan::apply_all())
            .await
            .map_err(anyhow::Error::from)?;

        Ok(())
    }
}
