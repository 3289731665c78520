//! Operator command line for NetLedger Console
//!
//! Drives a [`billing_console::CustomerWorkspace`] from the terminal, one
//! command per invocation:
//!
//! ```bash
//! netledger summary <customer-id>
//! netledger history <customer-id>
//! netledger pay <customer-id> 1000 --discount 200 --method UPI
//! netledger adjust <customer-id> -150 --reason "waiver"
//! netledger add-on <customer-id> "Router" 1500
//! netledger renew <customer-id> --plan F100 --additional 100 --action collect
//! netledger delete <customer-id>
//! netledger show <customer-id> 0
//! ```
//!
//! `--offline <fixture.yaml>` swaps the HTTP ledger for an in-process one
//! seeded from a YAML file. Its state lives only as long as the command.

pub mod cli;
pub mod commands;
pub mod fixture;
pub mod render;

pub use cli::*;
pub use commands::*;
pub use fixture::*;
