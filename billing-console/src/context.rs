//! Which customer the operator is looking at.
//!
//! Every remote call captures a [`ContextToken`] before it starts; a result
//! whose token is no longer current belongs to a customer the operator
//! already left and is dropped.

use crate::error::{ConsoleError, ConsoleResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextToken {
    generation: u64,
    customer_id: Uuid,
}

impl ContextToken {
    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }
}

#[derive(Debug, Default)]
struct ContextInner {
    generation: AtomicU64,
    customer: Mutex<Option<Uuid>>,
}

/// Shared handle; clones observe the same context
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<ContextInner>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a customer, invalidating every outstanding token
    pub fn switch_to(&self, customer_id: Uuid) -> ContextToken {
        let mut customer = self.inner.customer.lock();
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *customer = Some(customer_id);
        ContextToken {
            generation,
            customer_id,
        }
    }

    /// Navigate away without opening another customer
    pub fn leave(&self) {
        let mut customer = self.inner.customer.lock();
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        *customer = None;
    }

    pub fn current(&self) -> Option<ContextToken> {
        let customer = self.inner.customer.lock();
        customer.map(|customer_id| ContextToken {
            generation: self.inner.generation.load(Ordering::Acquire),
            customer_id,
        })
    }

    pub fn is_current(&self, token: &ContextToken) -> bool {
        self.inner.generation.load(Ordering::Acquire) == token.generation
    }

    pub fn ensure_current(&self, token: &ContextToken) -> ConsoleResult<()> {
        if self.is_current(token) {
            Ok(())
        } else {
            Err(ConsoleError::StaleContext)
        }
    }
}
