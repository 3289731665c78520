// Error reporting utilities
// Every surfaced failure goes through here so logs carry code and category

use crate::context::ErrorContext;
use crate::types::{ClassifiedError, ErrorCategory};

/// Log a classified error at a level matching its category.
///
/// Validation failures are expected operator mistakes and log at `debug`;
/// discarded results log at `warn`; everything else is an `error`.
pub fn report_error<E: ClassifiedError + ?Sized>(context: &ErrorContext, error: &E) {
    let category = error.category();
    let code = error.code();
    match category {
        ErrorCategory::Validation => tracing::debug!(
            error_code = code,
            error_category = %category,
            field = error.field().unwrap_or(""),
            context = %context,
            "Input rejected: {}",
            error
        ),
        ErrorCategory::Discarded => tracing::warn!(
            error_code = code,
            error_category = %category,
            context = %context,
            "Result discarded: {}",
            error
        ),
        _ => tracing::error!(
            error_code = code,
            error_category = %category,
            context = %context,
            "Operation failed: {}",
            error
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;
    use thiserror::Error;

    #[derive(Error, Debug)]
    enum SampleError {
        #[error("price: must be greater than zero")]
        Price,
        #[error("ledger refused the request")]
        Refused,
        #[error("customer changed")]
        Stale,
    }

    impl ClassifiedError for SampleError {
        fn category(&self) -> ErrorCategory {
            match self {
                SampleError::Price => ErrorCategory::Validation,
                SampleError::Refused => ErrorCategory::RemoteRejection,
                SampleError::Stale => ErrorCategory::Discarded,
            }
        }

        fn code(&self) -> &'static str {
            match self {
                SampleError::Price => codes::validation::INVALID_AMOUNT,
                SampleError::Refused => codes::remote::REJECTED,
                SampleError::Stale => codes::workflow::STALE_CONTEXT,
            }
        }

        fn field(&self) -> Option<&str> {
            matches!(self, SampleError::Price).then_some("price")
        }
    }

    #[test]
    fn test_thiserror_enum_classifies() {
        assert_eq!(SampleError::Price.field(), Some("price"));
        assert_eq!(SampleError::Refused.field(), None);
        assert_eq!(SampleError::Refused.code(), "REMOTE_2001");
        assert_eq!(SampleError::Stale.category().to_string(), "discarded");
    }

    #[test]
    fn test_report_every_category() {
        let context = ErrorContext::for_operation("submit_add_on").with_customer("c-17");
        for error in [SampleError::Price, SampleError::Refused, SampleError::Stale] {
            report_error(&context, &error);
        }
        let boxed: Box<dyn ClassifiedError> = Box::new(SampleError::Refused);
        report_error(&context, boxed.as_ref());
    }
}
