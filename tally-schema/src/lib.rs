//! Schema lifecycle management for the Tally point of sale suite.
//!
//! On every process start the lifecycle decides whether the target database
//! is absent (needs creation), present but stale (needs migration) or
//! current (ready), and carries the transition out safely and idempotently,
//! including against remote database services with aggressive timeouts.
//!
//! ```rust,ignore
//! use tally_schema::{ConfigBuilder, SchemaLifecycle, SqliteEngine};
//! use tally_migrations::SqliteMigrationRunner;
//!
//! let engine = SqliteEngine::connect("sqlite://tally.db")?;
//! let runner = SqliteMigrationRunner::new(engine.pool());
//! let mut lifecycle = SchemaLifecycle::new(engine, runner, ConfigBuilder::new().build());
//!
//! let outcome = lifecycle.run().await?;
//! println!("schema at version {}", outcome.version());
//! ```

#![forbid(unsafe_code)]

mod backend;
mod config;
mod create;
mod engine;
mod error;
mod ledger;
mod lifecycle;
mod migrate;
mod patch;
mod probe;
mod runner;
mod state;

pub mod schema;

pub use backend::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use ledger::*;
pub use lifecycle::*;
pub use patch::*;
pub use probe::*;
pub use runner::*;
pub use state::*;
