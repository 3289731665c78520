//! Ledger bindings for NetLedger Console
//!
//! Provides the collaborator contracts the console talks to:
//! - `LedgerService` for balances, history and every mutation
//! - `CatalogService` for the active plan catalog
//! - `CustomerDirectory` for customer records
//!
//! `HttpLedgerClient` speaks to the remote REST ledger; `InMemoryLedger`
//! reproduces its bookkeeping in-process for offline work and tests.

pub mod error;
pub mod http;
pub mod memory;
pub mod models;
pub mod requests;
pub mod service;

pub use error::*;
pub use http::HttpLedgerClient;
pub use memory::InMemoryLedger;
pub use models::*;
pub use requests::*;
pub use service::*;
