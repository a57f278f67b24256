//! Error types for verdiff

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VerdiffError>;

#[derive(Debug, Error)]
pub enum VerdiffError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("{side} text has {lines} lines, exceeding the configured limit of {limit}")]
    InputTooLarge {
        side: &'static str,
        lines: usize,
        limit: usize,
    },

    #[error("Version {version} not found for source '{source_name}'")]
    VersionNotFound { source_name: String, version: u64 },

    #[error("Version {version} of '{source_name}' has no {artifact}")]
    MissingArtifact {
        source_name: String,
        version: u64,
        artifact: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerdiffError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_schema<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSchema(msg.into())
    }
}
