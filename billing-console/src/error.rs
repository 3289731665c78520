use error_common::{codes, ClassifiedError, ErrorCategory};
use ledger_client::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
        code: &'static str,
    },

    #[error("{0}")]
    RemoteRejection(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Ledger request timed out")]
    Timeout,

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("A {0} submission is already in progress")]
    InFlight(&'static str),

    #[error("Result discarded: customer context changed")]
    StaleContext,

    #[error("No valid subscription or bill item")]
    NoBillableItems,

    #[error("Entry cannot be deleted: {0}")]
    DeletionNotPermitted(String),

    #[error("Cancelled by operator")]
    Cancelled,
}

impl ConsoleError {
    pub fn invalid_amount(field: &'static str, message: impl Into<String>) -> Self {
        ConsoleError::Validation {
            field,
            message: message.into(),
            code: codes::validation::INVALID_AMOUNT,
        }
    }

    pub fn required(field: &'static str) -> Self {
        ConsoleError::Validation {
            field,
            message: "is required".to_string(),
            code: codes::validation::MISSING_REQUIRED_FIELD,
        }
    }

    pub fn invalid_format(field: &'static str, message: impl Into<String>) -> Self {
        ConsoleError::Validation {
            field,
            message: message.into(),
            code: codes::validation::INVALID_FORMAT,
        }
    }

    pub fn invalid_period(field: &'static str, message: impl Into<String>) -> Self {
        ConsoleError::Validation {
            field,
            message: message.into(),
            code: codes::validation::INVALID_PERIOD,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::Validation { .. })
    }
}

impl From<LedgerError> for ConsoleError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { .. } => ConsoleError::NotFound(err.to_string()),
            LedgerError::Rejected { message, .. } => ConsoleError::RemoteRejection(message),
            LedgerError::Timeout => ConsoleError::Timeout,
            LedgerError::Network(msg) | LedgerError::Decode(msg) | LedgerError::Client(msg) => {
                ConsoleError::Unavailable(msg)
            }
        }
    }
}

impl ClassifiedError for ConsoleError {
    fn category(&self) -> ErrorCategory {
        match self {
            ConsoleError::Validation { .. } => ErrorCategory::Validation,
            ConsoleError::RemoteRejection(_) => ErrorCategory::RemoteRejection,
            ConsoleError::NotFound(_) => ErrorCategory::NotFound,
            ConsoleError::Timeout => ErrorCategory::Timeout,
            ConsoleError::Unavailable(_) => ErrorCategory::System,
            ConsoleError::StaleContext => ErrorCategory::Discarded,
            ConsoleError::InvalidState(_)
            | ConsoleError::InFlight(_)
            | ConsoleError::NoBillableItems
            | ConsoleError::DeletionNotPermitted(_)
            | ConsoleError::Cancelled => ErrorCategory::Workflow,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ConsoleError::Validation { code, .. } => *code,
            ConsoleError::RemoteRejection(_) => codes::remote::REJECTED,
            ConsoleError::NotFound(_) => codes::remote::NOT_FOUND,
            ConsoleError::Timeout => codes::remote::TIMEOUT,
            ConsoleError::Unavailable(_) => codes::remote::UNAVAILABLE,
            ConsoleError::InvalidState(_) => codes::workflow::INVALID_STATE,
            ConsoleError::InFlight(_) => codes::workflow::SUBMISSION_IN_FLIGHT,
            ConsoleError::StaleContext => codes::workflow::STALE_CONTEXT,
            ConsoleError::NoBillableItems => codes::workflow::NO_BILLABLE_ITEMS,
            ConsoleError::DeletionNotPermitted(_) => codes::workflow::DELETION_NOT_PERMITTED,
            ConsoleError::Cancelled => codes::workflow::CANCELLED,
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            ConsoleError::Validation { field, .. } => Some(*field),
            _ => None,
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
