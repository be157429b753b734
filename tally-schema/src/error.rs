use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unsupported backend in connection url `{0}`")]
    UnsupportedBackend(String),

    #[error("schema creation timed out after {0:?}")]
    CreationTimeout(Duration),

    #[error("migration runner requested for `{requested}` but runner targets `{actual}`")]
    BackendMismatch { requested: String, actual: String },

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("sqlx `{0}`")]
    Sqlx(#[from] sqlx::Error),

    #[error("io `{0}`")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
