use logger_redacted::LoggerConfig;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;
use validator::Validate;

/// Complete console configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ConsoleConfig {
    #[validate(nested)]
    pub ledger: LedgerSettings,
    #[validate(nested)]
    pub catalog: CatalogSettings,
    #[validate(nested)]
    pub billing: BillingSettings,
    pub logging: LoggerConfig,
}

/// Remote ledger endpoint
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct LedgerSettings {
    #[validate(url)]
    pub base_url: String,
    pub auth_token: Option<SecretString>,
    /// Upper bound for every remote round trip
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

/// Plan catalog endpoint; shares the ledger URL when unset
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CatalogSettings {
    #[validate(url)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct BillingSettings {
    /// Renewal period used when the operator does not pick one
    #[validate(range(min = 1, max = 36))]
    pub default_period_months: u32,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            default_period_months: 1,
        }
    }
}

impl ConsoleConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.ledger.timeout_secs)
    }

    pub fn catalog_url(&self) -> &str {
        self.catalog
            .base_url
            .as_deref()
            .unwrap_or(&self.ledger.base_url)
    }
}
