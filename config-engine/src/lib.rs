//! Configuration management for NetLedger Console
//!
//! Configuration is layered, lowest precedence first:
//!
//! - **Defaults**: every field has a serde default
//! - **YAML file**: `netledger.yaml` in the working directory, or an
//!   explicit path
//! - **Environment**: `NETLEDGER_` prefixed variables, `__` between levels
//!
//! The merged result is validated before it is handed out.
//!
//! # Example
//!
//! ```yaml
//! ledger:
//!   base_url: "https://billing.example.net/api/v1"
//!   timeout_secs: 20
//! catalog:
//!   base_url: "https://catalog.example.net/api/v1"
//! billing:
//!   default_period_months: 1
//! logging:
//!   level: "info"
//!   json: true
//! ```
//!
//! ```bash
//! NETLEDGER_LEDGER__AUTH_TOKEN=... netledger summary <customer-id>
//! ```

pub mod engine;
pub mod settings;
pub mod error;

pub use engine::*;
pub use settings::*;
pub use error::*;
