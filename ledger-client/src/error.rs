use error_common::{codes, ClassifiedError, ErrorCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("Ledger rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Ledger request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed ledger response: {0}")]
    Decode(String),

    #[error("HTTP client configuration error: {0}")]
    Client(String),
}

impl LedgerError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        LedgerError::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LedgerError::Timeout
        } else if err.is_decode() {
            LedgerError::Decode(err.to_string())
        } else if err.is_builder() {
            LedgerError::Client(err.to_string())
        } else {
            LedgerError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Decode(err.to_string())
    }
}

impl ClassifiedError for LedgerError {
    fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::NotFound { .. } => ErrorCategory::NotFound,
            LedgerError::Rejected { .. } => ErrorCategory::RemoteRejection,
            LedgerError::Timeout => ErrorCategory::Timeout,
            LedgerError::Network(_) | LedgerError::Decode(_) | LedgerError::Client(_) => {
                ErrorCategory::System
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound { .. } => codes::remote::NOT_FOUND,
            LedgerError::Rejected { .. } => codes::remote::REJECTED,
            LedgerError::Timeout => codes::remote::TIMEOUT,
            LedgerError::Network(_) | LedgerError::Client(_) => codes::remote::UNAVAILABLE,
            LedgerError::Decode(_) => codes::remote::MALFORMED_RESPONSE,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
