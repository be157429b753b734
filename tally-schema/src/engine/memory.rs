use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    backend::BackendKind,
    engine::Engine,
    error::{Result, SchemaError},
    probe::ObjectRef,
    schema,
};

/// In-memory scripted engine.
///
/// Stands in for the mapping layer in tests: it records every executed
/// statement, tracks created objects by parsing `CREATE TABLE`/`CREATE
/// INDEX` statements, answers scalar queries from a scripted queue and can
/// inject failures into creation and statement execution.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    kind: Option<BackendKind>,
    schema: bool,
    objects: HashSet<String>,
    executed: Vec<String>,
    scalars: VecDeque<Option<i64>>,
    create_calls: u32,
    create_failures: u32,
    schema_survives_failed_create: bool,
    execute_failures: Vec<String>,
    drops: u32,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(self, kind: BackendKind) -> Self {
        self.state.write().kind = Some(kind);
        self
    }

    /// Start with an already existing schema.
    pub fn with_schema(self) -> Self {
        self.state.write().schema = true;
        self
    }

    /// Start with a named object already present in the catalog.
    pub fn with_object(self, name: impl Into<String>) -> Self {
        self.state.write().objects.insert(name.into().to_lowercase());
        self
    }

    /// Fail the next `n` calls to `create_schema`, leaving no schema behind.
    pub fn fail_create(self, n: u32) -> Self {
        self.state.write().create_failures = n;
        self
    }

    /// Make failed `create_schema` calls leave the schema present anyway,
    /// like a remote service that keeps provisioning after the client
    /// timeout fires.
    pub fn schema_survives_failed_create(self) -> Self {
        self.state.write().schema_survives_failed_create = true;
        self
    }

    /// Fail every `execute` whose statement contains `needle`.
    pub fn fail_execute_containing(self, needle: impl Into<String>) -> Self {
        self.state.write().execute_failures.push(needle.into());
        self
    }

    /// Queue the answer for the next scalar query.
    pub fn push_scalar(&self, value: Option<i64>) {
        self.state.write().scalars.push_back(value);
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.read().executed.clone()
    }

    pub fn executed_matching(&self, needle: &str) -> usize {
        self.state
            .read()
            .executed
            .iter()
            .filter(|sql| sql.contains(needle))
            .count()
    }

    pub fn create_calls(&self) -> u32 {
        self.state.read().create_calls
    }

    pub fn drop_count(&self) -> u32 {
        self.state.read().drops
    }

    pub fn has_object(&self, name: &str) -> bool {
        self.state.read().objects.contains(&name.to_lowercase())
    }

    fn register_objects(state: &mut State, sql: &str) {
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            let rest = ["CREATE TABLE", "CREATE UNIQUE INDEX", "CREATE INDEX"]
                .iter()
                .find_map(|prefix| trimmed.strip_prefix(prefix));

            if let Some(rest) = rest {
                let rest = rest.trim_start().trim_start_matches("IF NOT EXISTS");
                if let Some(name) = rest.split_whitespace().next() {
                    state
                        .objects
                        .insert(name.trim_matches('"').to_lowercase());
                }
            }
        }
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    fn kind(&self) -> BackendKind {
        self.state.read().kind.unwrap_or(BackendKind::Sqlite)
    }

    async fn schema_exists(&self) -> Result<bool> {
        Ok(self.state.read().schema)
    }

    async fn create_schema(&self, timeout: Duration) -> Result<()> {
        let script = self.creation_script();
        let mut state = self.state.write();
        state.create_calls += 1;

        if state.create_failures > 0 {
            state.create_failures -= 1;
            if state.schema_survives_failed_create {
                state.schema = true;
            }
            return Err(SchemaError::CreationTimeout(timeout));
        }

        state.schema = true;
        Self::register_objects(&mut state, &script);

        Ok(())
    }

    fn creation_script(&self) -> String {
        schema::creation_script(self.kind())
    }

    async fn drop_schema(&self) -> Result<()> {
        let mut state = self.state.write();
        state.drops += 1;
        state.schema = false;
        state.objects.clear();

        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        let mut state = self.state.write();

        if let Some(needle) = state
            .execute_failures
            .iter()
            .find(|needle| sql.contains(needle.as_str()))
        {
            return Err(anyhow::anyhow!("injected failure on `{needle}`").into());
        }

        state.executed.push(sql.to_owned());
        Self::register_objects(&mut state, sql);

        Ok(())
    }

    async fn fetch_scalar(&self, _sql: &str) -> Result<Option<i64>> {
        Ok(self.state.write().scalars.pop_front().flatten())
    }

    async fn object_exists(&self, object: &ObjectRef) -> Result<bool> {
        Ok(self
            .state
            .read()
            .objects
            .contains(&object.name.to_lowercase()))
    }
}
