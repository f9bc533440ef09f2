use thiserror::Error;

use crate::store::StoreError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },
    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),
    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    pub fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        ServiceError::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}
