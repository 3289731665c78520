use error_common::{codes, ClassifiedError, ErrorCategory};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Configuration parsing failed: {0}")]
    ParseError(#[from] Box<figment::Error>),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::ParseError(Box::new(err))
    }
}

impl ClassifiedError for ConfigError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::System
    }

    fn code(&self) -> &'static str {
        codes::system::CONFIGURATION
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
