use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::{
    migrate::MigrateDatabase,
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool, Postgres,
};

use crate::{
    backend::BackendKind,
    engine::Engine,
    error::{Result, SchemaError},
    probe::ObjectRef,
    schema,
};

/// Engine for the full relational backend, a PostgreSQL server.
///
/// Creation against a remote server is the failure-prone path of the whole
/// lifecycle; the extended timeout and the raw-script retry in the creation
/// orchestrator exist for this engine.
#[derive(Clone)]
pub struct PgEngine {
    url: String,
    pool: Arc<RwLock<PgPool>>,
}

impl PgEngine {
    pub fn connect(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let pool = Self::lazy_pool(&url)?;

        Ok(Self {
            url,
            pool: Arc::new(RwLock::new(pool)),
        })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.read().clone()
    }

    fn lazy_pool(url: &str) -> Result<PgPool> {
        let options = PgConnectOptions::from_str(url)?;

        Ok(PgPoolOptions::new().connect_lazy_with(options))
    }
}

#[async_trait]
impl Engine for PgEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::Postgres
    }

    async fn schema_exists(&self) -> Result<bool> {
        Ok(Postgres::database_exists(&self.url).await?)
    }

    async fn create_schema(&self, timeout: Duration) -> Result<()> {
        let create = async {
            Postgres::create_database(&self.url).await?;
            self.execute(&self.creation_script()).await
        };

        tokio::time::timeout(timeout, create)
            .await
            .map_err(|_| SchemaError::CreationTimeout(timeout))?
    }

    fn creation_script(&self) -> String {
        schema::creation_script(BackendKind::Postgres)
    }

    async fn drop_schema(&self) -> Result<()> {
        // Connections held on the target database block the drop.
        let pool = self.pool();
        pool.close().await;
        Postgres::drop_database(&self.url).await?;

        *self.pool.write() = Self::lazy_pool(&self.url)?;

        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        sqlx::raw_sql(sql).execute(&self.pool()).await?;

        Ok(())
    }

    async fn fetch_scalar(&self, sql: &str) -> Result<Option<i64>> {
        Ok(sqlx::query_scalar(sql).fetch_optional(&self.pool()).await?)
    }

    async fn object_exists(&self, object: &ObjectRef) -> Result<bool> {
        // pg_class covers tables and indexes alike, unlike
        // information_schema.tables.
        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM pg_class c \
             JOIN pg_namespace n ON n.oid = c.relnamespace \
             WHERE lower(c.relname) = lower($1) \
             AND ($2 = '' OR lower(n.nspname) = lower($2))",
        )
        .bind(&object.name)
        .bind(object.namespace.as_deref().unwrap_or(""))
        .fetch_one(&self.pool())
        .await?;

        Ok(count > 0)
    }
}
