//! Tab error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Tab has no id")]
    MissingIdentifier,

    #[error("Duplicate tab id: {0}")]
    DuplicateId(String),

    #[error("Tab index {index} out of range for {len} tabs")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
