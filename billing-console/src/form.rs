//! Single-flight submission guard shared by every form

use crate::error::{ConsoleError, ConsoleResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
}

/// Independently submitted forms of the customer screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Payment,
    Adjustment,
    AddOn,
    BillDraft,
    Delete,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Payment => "payment",
            FormKind::Adjustment => "adjustment",
            FormKind::AddOn => "add-on",
            FormKind::BillDraft => "bill draft",
            FormKind::Delete => "delete",
        }
    }
}

/// Allows at most one submission of a form at a time
#[derive(Debug, Clone)]
pub struct SingleFlight {
    name: &'static str,
    busy: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the slot; fails with `InFlight` while another submission runs
    pub fn try_begin(&self) -> ConsoleResult<FlightGuard> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(ConsoleError::InFlight(self.name));
        }
        Ok(FlightGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn phase(&self) -> FormPhase {
        if self.busy.load(Ordering::Acquire) {
            FormPhase::Submitting
        } else {
            FormPhase::Editing
        }
    }
}

/// Releases the slot when dropped, including when the call is abandoned
#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
