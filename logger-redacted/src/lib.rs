//! Logging for the operator console with customer PII redaction
//!
//! Operators work with subscriber phone numbers and e-mail addresses all
//! day; none of them should reach a log file in clear text. Call sites pass
//! such values through [`redact`] before attaching them to a `tracing`
//! field:
//!
//! ```rust
//! use logger_redacted::redact;
//!
//! let phone = "9876543210";
//! tracing::info!(phone = %redact(phone), "Customer opened");
//! ```
//!
//! # Configuration
//!
//! ```yaml
//! logging:
//!   level: "info,ledger_client=debug"
//!   json: false
//!   redact_pii: true
//! ```

pub mod redactor;
pub mod config;
pub mod error;

pub use redactor::*;
pub use config::*;
pub use error::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static REDACTION_ENABLED: AtomicBool = AtomicBool::new(true);
static REDACTOR: OnceLock<PiiRedactor> = OnceLock::new();

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `config.level` when set.
pub fn init(config: &LoggerConfig) -> Result<()> {
    REDACTION_ENABLED.store(config.redact_pii, Ordering::Relaxed);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggerError::InvalidFilter {
            directive: config.level.clone(),
            reason: e.to_string(),
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true),
            )
            .try_init()
    };

    installed.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}

/// Redact a value for logging using the process-wide policy.
pub fn redact(text: &str) -> String {
    if !REDACTION_ENABLED.load(Ordering::Relaxed) {
        return text.to_string();
    }
    REDACTOR.get_or_init(PiiRedactor::default).redact(text)
}
