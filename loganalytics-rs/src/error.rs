//! Error types for loganalytics-rs

use thiserror::Error;

use crate::ingestion::IngestionError;

/// Result type alias for publishing operations
pub type Result<T> = std::result::Result<T, LogAnalyticsError>;

/// Publishing error types
#[derive(Error, Debug)]
pub enum LogAnalyticsError {
    /// Missing or unreadable configuration
    #[error("{0}")]
    Configuration(String),

    /// An upload could not be completed, including obtaining its token
    #[error("Upload failed: {0}")]
    Upload(#[from] IngestionError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LogAnalyticsError {
    /// The error raised when one of the seven connection settings is empty
    pub fn missing_settings() -> Self {
        LogAnalyticsError::Configuration(
            "Invalid configuration. One or more required settings are missing.".to_string(),
        )
    }
}
