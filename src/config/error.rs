//! Configuration Error Types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to read configuration file '{file_path}': {error}")]
    FileReadError { file_path: String, error: String },

    #[error("Invalid TOML syntax in '{file_path}': {error}")]
    InvalidToml { file_path: String, error: String },

    #[error("Environment variable '{variable}' rejected: {context}")]
    EnvironmentVariableError { variable: String, context: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl ConfigurationError {
    pub fn file_read_error(file_path: impl Into<String>, error: std::io::Error) -> Self {
        Self::FileReadError {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }

    pub fn invalid_toml(file_path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::InvalidToml {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }

    pub fn env_var_error(variable: impl Into<String>, context: impl Into<String>) -> Self {
        Self::EnvironmentVariableError {
            variable: variable.into(),
            context: context.into(),
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
