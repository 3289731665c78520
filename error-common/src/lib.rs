//! Common error handling utilities for NetLedger Console
//!
//! Every crate in the workspace keeps its own `thiserror` enum and
//! implements [`ClassifiedError`] on it, so the console can decide how a
//! failure is surfaced without knowing which crate produced it.
//!
//! # Error Categories
//!
//! - **Validation**: missing or invalid input, shown inline, no call made
//! - **RemoteRejection**: non-success reply from the ledger or catalog
//! - **NotFound**: detail fetch for a deleted invoice or payment
//! - **Timeout**: remote call exceeded its bound
//! - **Workflow**: action not allowed in the current state
//! - **Discarded**: result arrived for a customer the operator already left
//! - **System**: configuration and infrastructure failures
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, ClassifiedError, ErrorCategory, ErrorContext, report_error};
//!
//! #[derive(Debug)]
//! struct EmptyName;
//!
//! impl std::fmt::Display for EmptyName {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str("item name is required")
//!     }
//! }
//!
//! impl std::error::Error for EmptyName {}
//!
//! impl ClassifiedError for EmptyName {
//!     fn category(&self) -> ErrorCategory { ErrorCategory::Validation }
//!     fn code(&self) -> &'static str { codes::validation::MISSING_REQUIRED_FIELD }
//!     fn field(&self) -> Option<&str> { Some("item_name") }
//! }
//!
//! report_error(&ErrorContext::for_operation("add_on"), &EmptyName);
//! ```

pub mod types;
pub mod context;
pub mod codes;
pub mod reporting;

pub use types::*;
pub use context::*;
pub use reporting::*;
