use crate::error::{ConfigError, Result};
use crate::settings::ConsoleConfig;
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use std::path::Path;
use validator::Validate;

/// Environment variable prefix; `__` separates nested keys
/// (`NETLEDGER_LEDGER__BASE_URL` → `ledger.base_url`).
pub const ENV_PREFIX: &str = "NETLEDGER_";

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "netledger.yaml";

/// Layered configuration loader.
///
/// Sources merge in the order they are added; later sources win. Fields
/// absent from every source fall back to their serde defaults.
pub struct ConfigEngine {
    figment: Figment,
}

impl ConfigEngine {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
        }
    }

    /// Merge a YAML file. Missing files are skipped.
    pub fn add_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.figment = self.figment.merge(Yaml::file(path.as_ref()));
        self
    }

    /// Merge a YAML file that must exist.
    pub fn add_required_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Ok(self.add_file(path))
    }

    pub fn add_env(mut self) -> Self {
        self.figment = self.figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        self
    }

    /// Extract and validate the merged configuration.
    pub fn load(self) -> Result<ConsoleConfig> {
        let config: ConsoleConfig = self.figment.extract()?;
        config.validate()?;
        tracing::debug!(
            ledger_url = %config.ledger.base_url,
            catalog_url = %config.catalog_url(),
            timeout_secs = config.ledger.timeout_secs,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Standard source stack: an explicit file (which must exist) or
    /// `netledger.yaml` if present, then the environment.
    pub fn from_default_sources(path: Option<&Path>) -> Result<ConsoleConfig> {
        let engine = match path {
            Some(path) => Self::new().add_required_file(path)?,
            None => Self::new().add_file(DEFAULT_CONFIG_FILE),
        };
        engine.add_env().load()
    }
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use secrecy::ExposeSecret;

    fn jailed(err: ConfigError) -> figment::Error {
        figment::Error::from(err.to_string())
    }

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = ConfigEngine::new().load().map_err(jailed)?;
            assert_eq!(config.ledger.base_url, "http://localhost:8080/api/v1");
            assert_eq!(config.ledger.timeout_secs, 30);
            assert_eq!(config.billing.default_period_months, 1);
            assert_eq!(config.catalog_url(), config.ledger.base_url);
            assert!(config.ledger.auth_token.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
ledger:
  base_url: "https://ledger.example.net/api"
  timeout_secs: 10
catalog:
  base_url: "https://catalog.example.net"
billing:
  default_period_months: 3
"#,
            )?;
            jail.set_env("NETLEDGER_LEDGER__TIMEOUT_SECS", "45");
            jail.set_env("NETLEDGER_LEDGER__AUTH_TOKEN", "s3cret");

            let config = ConfigEngine::from_default_sources(None).map_err(jailed)?;
            assert_eq!(config.ledger.base_url, "https://ledger.example.net/api");
            assert_eq!(config.ledger.timeout_secs, 45);
            assert_eq!(config.catalog_url(), "https://catalog.example.net");
            assert_eq!(config.billing.default_period_months, 3);
            let token = config.ledger.auth_token.as_ref().map(|t| t.expose_secret().clone());
            assert_eq!(token.as_deref(), Some("s3cret"));
            Ok(())
        });
    }

    #[test]
    fn test_out_of_range_timeout_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("NETLEDGER_LEDGER__TIMEOUT_SECS", "0");
            let result = ConfigEngine::new().add_env().load();
            assert!(matches!(result, Err(ConfigError::ValidationError(_))));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_url_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("NETLEDGER_LEDGER__BASE_URL", "not a url");
            let result = ConfigEngine::new().add_env().load();
            assert!(matches!(result, Err(ConfigError::ValidationError(_))));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let result = ConfigEngine::from_default_sources(Some(&missing));
        assert!(matches!(result, Err(ConfigError::FileNotFound(p)) if p == missing));
    }
}
