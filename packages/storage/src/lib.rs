// ABOUTME: Data layer and persistence for OpsDesk
// ABOUTME: Storage errors, SQLite pool setup, embedded migrations, and column helpers

pub mod db;
pub mod id_sets;

use opsdesk_core::{IdSet, ValidationError};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use db::{connect, connect_in_memory, run_migrations, DatabaseOptions, MIGRATOR};
pub use id_sets::IdSetColumn;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Validation error: {0}")]
    Validation(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StorageError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err.to_string())
    }
}

/// Decode a JSON array column into an `IdSet`
pub fn decode_id_set(raw: &str) -> StorageResult<IdSet> {
    IdSet::from_json_column(raw).map_err(StorageError::Json)
}

/// Decode an arbitrary JSON column
pub fn decode_json<T: DeserializeOwned>(raw: &str) -> StorageResult<T> {
    serde_json::from_str(raw).map_err(StorageError::Json)
}
