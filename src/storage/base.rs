use crate::models::VacancyId;
use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationError(String),
    #[error("Serialization failed: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        StorageError::OperationError(error.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        StorageError::SerializationError(error.to_string())
    }
}

/// Durable record of which vacancies a board runner has already handled.
#[async_trait]
pub trait VacancyStore: Send + Sync {
    /// Ids handled by earlier runs. A missing store is created empty.
    async fn load_seen(&self) -> Result<BTreeSet<VacancyId>, StorageError>;

    /// Replaces the stored set. Readers never observe a partially written file.
    async fn save_seen(&self, ids: &BTreeSet<VacancyId>) -> Result<(), StorageError>;

    /// Appends human-readable rows, one per delivered vacancy.
    async fn append_log(&self, lines: &[String]) -> Result<(), StorageError>;
}
