use error_common::{codes, ClassifiedError, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

impl ClassifiedError for LoggerError {
    fn category(&self) -> ErrorCategory {
        ErrorCategory::System
    }

    fn code(&self) -> &'static str {
        codes::system::LOGGING
    }
}

pub type Result<T> = std::result::Result<T, LoggerError>;
