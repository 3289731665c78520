use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Error context information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    pub customer_id: Option<String>,
    pub operation: Option<String>,
    pub additional: BTreeMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_operation<S: Into<String>>(operation: S) -> Self {
        Self::new().with_operation(operation)
    }

    pub fn with_customer<S: ToString>(mut self, customer_id: S) -> Self {
        self.customer_id = Some(customer_id.to_string());
        self
    }

    pub fn with_operation<S: Into<String>>(mut self, operation: S) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn add_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(op) = &self.operation {
            parts.push(format!("operation={op}"));
        }
        if let Some(customer) = &self.customer_id {
            parts.push(format!("customer={customer}"));
        }
        for (key, value) in &self.additional {
            parts.push(format!("{key}={value}"));
        }
        f.write_str(&parts.join(" "))
    }
}
