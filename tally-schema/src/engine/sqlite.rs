use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqlitePool,
};

use crate::{
    backend::BackendKind,
    engine::Engine,
    error::{Result, SchemaError},
    probe::ObjectRef,
    schema,
};

/// Engine for the compact local backend, a SQLite database file.
///
/// The pool is lazy so an engine can be built before the database file
/// exists; `drop_schema` swaps in a fresh pool so a forced recreate can keep
/// using the same engine.
#[derive(Clone)]
pub struct SqliteEngine {
    url: String,
    pool: Arc<RwLock<SqlitePool>>,
}

impl SqliteEngine {
    pub fn connect(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let pool = Self::lazy_pool(&url)?;

        Ok(Self {
            url,
            pool: Arc::new(RwLock::new(pool)),
        })
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.read().clone()
    }

    fn lazy_pool(url: &str) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(false);

        Ok(SqlitePoolOptions::new().connect_lazy_with(options))
    }
}

#[async_trait]
impl Engine for SqliteEngine {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    async fn schema_exists(&self) -> Result<bool> {
        Ok(Sqlite::database_exists(&self.url).await?)
    }

    async fn create_schema(&self, timeout: Duration) -> Result<()> {
        let create = async {
            Sqlite::create_database(&self.url).await?;
            self.execute(&self.creation_script()).await
        };

        tokio::time::timeout(timeout, create)
            .await
            .map_err(|_| SchemaError::CreationTimeout(timeout))?
    }

    fn creation_script(&self) -> String {
        schema::creation_script(BackendKind::Sqlite)
    }

    async fn drop_schema(&self) -> Result<()> {
        let pool = self.pool();
        pool.close().await;
        Sqlite::drop_database(&self.url).await?;

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
        // SQLite has a single catalog; any namespace other than `main` can
        // never match.
        if let Some(ns) = &object.namespace {
            if !ns.eq_ignore_ascii_case("main") {
                return Ok(false);
            }
        }

        let count: i64 =
            sqlx::query_scalar("SELECT count(*) FROM sqlite_master WHERE lower(name) = lower($1)")
                .bind(&object.name)
                .fetch_one(&self.pool())
                .await?;

        Ok(count > 0)
    }
}
