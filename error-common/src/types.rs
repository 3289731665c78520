use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad class of a failure, shared by every crate in the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing or malformed operator input, caught before any network call
    Validation,
    /// Non-success response from the ledger or catalog service
    RemoteRejection,
    /// Detail fetch for an invoice or payment that no longer exists
    NotFound,
    /// Remote call did not resolve within the configured bound
    Timeout,
    /// Operation not allowed in the current form or draft state
    Workflow,
    /// Result belonged to a customer context the operator already left
    Discarded,
    /// Configuration, logging or transport failures
    System,
}

/// Where an error is shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Next to the offending input field
    InlineField,
    /// As a message the operator can dismiss
    DismissibleMessage,
    /// Not shown at all; only logged
    Silent,
}

impl ErrorCategory {
    pub fn surface(self) -> Surface {
        match self {
            ErrorCategory::Validation => Surface::InlineField,
            ErrorCategory::Discarded => Surface::Silent,
            ErrorCategory::RemoteRejection
            | ErrorCategory::NotFound
            | ErrorCategory::Timeout
            | ErrorCategory::Workflow
            | ErrorCategory::System => Surface::DismissibleMessage,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::RemoteRejection => "remote_rejection",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Workflow => "workflow",
            ErrorCategory::Discarded => "discarded",
            ErrorCategory::System => "system",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every crate-level error enum so callers can route
/// failures without matching on concrete variants.
pub trait ClassifiedError: std::error::Error {
    fn category(&self) -> ErrorCategory;

    /// Stable code from [`crate::codes`]
    fn code(&self) -> &'static str;

    /// Input field the error refers to, for inline surfacing
    fn field(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_inline() {
        assert_eq!(ErrorCategory::Validation.surface(), Surface::InlineField);
    }

    #[test]
    fn test_remote_failures_are_dismissible() {
        for category in [
            ErrorCategory::RemoteRejection,
            ErrorCategory::NotFound,
            ErrorCategory::Timeout,
        ] {
            assert_eq!(category.surface(), Surface::DismissibleMessage);
        }
    }

    #[test]
    fn test_discarded_results_stay_silent() {
        assert_eq!(ErrorCategory::Discarded.surface(), Surface::Silent);
        assert_eq!(ErrorCategory::Discarded.to_string(), "discarded");
    }
}
