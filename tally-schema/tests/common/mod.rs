use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tally_schema::{BackendKind, MigrationRunner, Result};

/// Runner double that records every invocation instead of applying steps.
#[derive(Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<(BackendKind, i64)>>>,
    fail: bool,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(BackendKind, i64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MigrationRunner for FakeRunner {
    async fn run(&self, kind: BackendKind, from_version: i64) -> Result<()> {
        if self.fail {
            return Err(anyhow::anyhow!("injected runner failure").into());
        }

        self.calls.lock().unwrap().push((kind, from_version));

        Ok(())
    }
}
