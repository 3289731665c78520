//! Ledger history view and the rule for which entry may be deleted.

use chrono::{DateTime, Utc};
use ledger_client::{Transaction, TransactionKind};
use uuid::Uuid;

/// Remote operation that removes an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionRoute {
    Payment(Uuid),
    Transaction(Uuid),
}

/// Detail record behind a history row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTarget {
    Invoice(Uuid),
    Payment(Uuid),
}

/// Ledger entries, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionHistory {
    entries: Vec<Transaction>,
}

impl TransactionHistory {
    /// Sorts by transaction date descending whatever order the service used
    pub fn new(mut entries: Vec<Transaction>) -> Self {
        entries.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
        Self { entries }
    }

    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&Transaction> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position_of(&self, transaction_id: Uuid) -> Option<usize> {
        self.entries.iter().position(|t| t.id == transaction_id)
    }

    /// Date of the newest subscription invoice, if any
    pub fn latest_subscription_invoice_date(&self) -> Option<DateTime<Utc>> {
        self.entries
            .iter()
            .filter(|t| t.is_subscription_invoice())
            .map(|t| t.transaction_date)
            .max()
    }

    /// Only the newest entry can go, never a subscription invoice, and never
    /// anything older than the newest subscription invoice.
    pub fn is_deletable(&self, position: usize) -> bool {
        if position != 0 {
            return false;
        }
        let Some(entry) = self.entries.get(position) else {
            return false;
        };
        if entry.is_subscription_invoice() {
            return false;
        }
        match self.latest_subscription_invoice_date() {
            Some(latest) => entry.transaction_date >= latest,
            None => true,
        }
    }

    pub fn deletable_entry(&self) -> Option<&Transaction> {
        if self.is_deletable(0) {
            self.entries.first()
        } else {
            None
        }
    }

    pub fn deletion_route(entry: &Transaction) -> DeletionRoute {
        match (entry.kind, entry.payment_id()) {
            (TransactionKind::Payment, Some(payment_id)) => DeletionRoute::Payment(payment_id),
            _ => DeletionRoute::Transaction(entry.id),
        }
    }

    pub fn preview_target(&self, position: usize) -> Option<PreviewTarget> {
        let entry = self.entries.get(position)?;
        match entry.kind {
            TransactionKind::Payment => entry.payment_id().map(PreviewTarget::Payment),
            TransactionKind::Invoice
            | TransactionKind::AddOnBill
            | TransactionKind::BalanceAdjustment => entry.invoice_id().map(PreviewTarget::Invoice),
        }
    }

    /// Entries whose stored balance does not follow from their direction
    pub fn balance_discrepancies(&self) -> Vec<&Transaction> {
        self.entries.iter().filter(|t| !t.is_balanced()).collect()
    }
}
