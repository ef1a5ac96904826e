//! Application layer error types

use thiserror::Error;

/// Application layer errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Core(#[from] crate::core::Error),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApplicationError {
    /// True when the spec document itself must be fixed
    pub fn is_spec_error(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_spec_error())
    }
}

/// Validation errors for requests
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid API name: {0}")]
    InvalidApiName(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
