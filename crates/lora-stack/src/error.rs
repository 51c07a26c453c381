//! Engine error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::row::RowId;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("malformed node payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("node payload has {0} header widgets, expected at most one")]
    DuplicateHeader(usize),

    #[error("row {0} not found")]
    RowNotFound(RowId),

    #[error("invalid bundle entry '{selection}': {reason}")]
    InvalidEntry { selection: String, reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, StackError>;
