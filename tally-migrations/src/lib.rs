//! Versioned database migrations for the Tally point of sale suite.
//!
//! This crate is the compiled migration set consumed by the schema
//! lifecycle in `tally-schema`: every structural delta an existing,
//! outdated database must pass through, supporting SQLite and PostgreSQL
//! through feature flags.
//!
//! # Features
//!
//! - **`sqlite`** - Enables SQLite database support (default)
//! - **`postgres`** - Enables PostgreSQL database support
//!
//! # Usage
//!
//! The main entry point is the [`new`] function, which creates a
//! [`Migrator`] instance configured with all Tally migrations.
//!
//! ```rust,ignore
//! use sqlx_migrator::{Migrate, Plan};
//!
//! // Acquire a database connection
//! let mut conn = pool.acquire().await?;
//!
//! // Create the migrator for your database type
//! let migrator = tally_migrations::new::<sqlx::Sqlite>()?;
//!
//! // Run all pending migrations
//! migrator.run(&mut *conn, &Plan::apply_all()).await?;
//! ```
//!
//! During startup the same set is normally driven through the lifecycle's
//! runner boundary instead:
//!
//! ```rust,ignore
//! use tally_migrations::SqliteMigrationRunner;
//! use tally_schema::{ConfigBuilder, SchemaLifecycle, SqliteEngine};
//!
//! let engine = SqliteEngine::connect("sqlite://tally.db")?;
//! let runner = SqliteMigrationRunner::new(engine.pool());
//! let outcome = SchemaLifecycle::new(engine, runner, ConfigBuilder::new().build())
//!     .run()
//!     .await?;
//! ```
//!
//! # Migrations
//!
//! - [`M0001`] - Creates the `order_states` table and its ticket index
//! - [`M0002`] - Adds the ticket note column and the payment type index

#![forbid(unsafe_code)]

use sea_query::Iden;
use sqlx_migrator::{Info, Migrator};

mod m0001;
mod m0002;
mod runner;

pub use m0001::M0001;
pub use m0002::M0002;
pub use runner::*;

/// Column identifiers for the `order_states` table, introduced by
/// [`M0001`].
#[derive(Iden, Clone, Copy)]
pub enum OrderStates {
    Table,
    Id,
    TicketId,
    StateName,
    State,
    Date,
}

/// Creates a new [`Migrator`] instance with all Tally migrations
/// registered.
///
/// # Errors
///
/// Returns an error if migration registration fails.
pub fn new<DB: sqlx::Database>() -> Result<Migrator<DB>, sqlx_migrator::Error>
where
    M0001: sqlx_migrator::Migration<DB>,
    M0002: sqlx_migrator::Migration<DB>,
{
    let mut migrator = Migrator::default();
    migrator.add_migration(Box::new(M0001))?;
    migrator.add_migration(Box::new(M0002))?;

    Ok(migrator)
}
