use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// The kind of storage backend a lifecycle run targets.
///
/// Resolved once from the connection url when the engine is built, never
/// re-derived by string inspection at call sites. Migrations may be
/// backend-specific, so the kind is part of the migration runner contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Compact local engine, file based.
    Sqlite,
    /// Full relational server, possibly remote.
    Postgres,
}

impl BackendKind {
    /// Resolves the backend kind from a connection url scheme.
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else {
            Err(SchemaError::UnsupportedBackend(url.to_owned()))
        }
    }

    /// The backend kind string handed to the migration runner.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_scheme_once() {
        assert_eq!(
            BackendKind::from_url("sqlite://tally.db").unwrap(),
            BackendKind::Sqlite
        );
        assert_eq!(
            BackendKind::from_url("postgres://localhost/tally").unwrap(),
            BackendKind::Postgres
        );
        assert_eq!(
            BackendKind::from_url("postgresql://localhost/tally").unwrap(),
            BackendKind::Postgres
        );
        assert!(matches!(
            BackendKind::from_url("mysql://localhost/tally"),
            Err(SchemaError::UnsupportedBackend(_))
        ));
    }
}
