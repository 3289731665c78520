// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
    pub redact_pii: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            redact_pii: true,
        }
    }
}
