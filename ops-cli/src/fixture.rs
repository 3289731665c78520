//! YAML fixture for `--offline` runs

use anyhow::{Context, Result};
use ledger_client::{Customer, InMemoryLedger, Plan};
use serde::Deserialize;
use std::path::Path;

/// Customers and catalog plans loaded into an in-process ledger.
///
/// ```yaml
/// customers:
///   - id: 5f0c6b1e-8f5d-4f43-9a55-0d7e4f1c2b3a
///     name: Asha Rao
///     phone: "9876543210"
///     balance: "250"
///     subscriptions: []
/// plans:
///   - id: 0b6f3c1e-2a4d-4f8e-9c1b-7d5e6f7a8b9c
///     name: Fiber 100
///     code: F100
///     monthlyPrice: "500"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OfflineFixture {
    pub customers: Vec<Customer>,
    pub plans: Vec<Plan>,
}

impl OfflineFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading offline fixture {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing offline fixture {}", path.display()))
    }

    pub fn into_ledger(self) -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        for customer in self.customers {
            ledger.insert_customer(customer);
        }
        for plan in self.plans {
            ledger.insert_plan(plan);
        }
        ledger
    }
}
