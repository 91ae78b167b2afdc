use crate::core::retry::RetryCategory;
use crate::storage::base::StorageError;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("{board} reported a stale client version")]
    StaleVersion { board: String },

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: Url, status: u16 },

    #[error("Maximum retries reached on {board} (category: {category}, attempts: {attempts})")]
    MaxRetriesReached {
        category: RetryCategory,
        board: String,
        attempts: usize,
    },

    #[error("Settings file not found: {}", .0.display())]
    MissingSettings(PathBuf),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("No parser settings found for {0}")]
    MissingParserSettings(String),
}

impl ScoutError {
    /// Configuration problems are never retried; everything else is treated as temporary.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScoutError::MissingSettings(_)
                | ScoutError::InvalidSettings(_)
                | ScoutError::MissingParserSettings(_)
        )
    }
}

pub type ScoutResult<T> = Result<T, ScoutError>;
