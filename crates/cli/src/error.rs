//! Error types for wpadctl

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Unknown device family: {0} (see `wpadctl families`)")]
    UnknownFamily(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File already exists: {0} (use --force to overwrite)")]
    AlreadyExists(String),

    #[error("Session failed: {0}")]
    SessionFailed(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnknownFamily(_) => 2,
            CliError::InvalidInput(_) | CliError::JsonError(_) => 3,
            CliError::AlreadyExists(_) => 4,
            CliError::SessionFailed(_) => 5,
        }
    }
}
