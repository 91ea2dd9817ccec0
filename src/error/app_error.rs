use crate::config::error::ConfigError;
use thiserror::Error;

/// Application-wide error type for startup and runtime wiring failures.
///
/// Delivery failures never surface through this type: providers report them
/// as a [`crate::services::notifications::Outcome`] instead.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Message bus connection or subscription error
    #[error("Message bus error: {operation}")]
    Bus {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Metrics pipeline error
    #[error("Metrics error: {message}")]
    Metrics { message: String },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Wraps a message bus failure with the operation that caused it
    pub fn bus(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Bus {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::ValidationError { field, message } => AppError::Validation {
                field,
                reason: message,
            },
            other => AppError::Configuration {
                key: "settings".to_string(),
                source: anyhow::Error::new(other),
            },
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
