//! Submission payloads sent to the remote ledger

use crate::models::{BillDraftItem, Direction, PaymentMethod};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub invoice_id: Option<Uuid>,
    pub amount: Decimal,
    pub discount: Decimal,
    pub method: PaymentMethod,
    pub collected_at: DateTime<Utc>,
    pub comments: Option<String>,
}

impl NewPayment {
    /// Amount the ledger credits: `amount − discount`
    pub fn total_payable(&self) -> Decimal {
        self.amount - self.discount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBalanceAdjustment {
    pub new_balance: Decimal,
    /// Absolute size of the change
    pub amount: Decimal,
    pub direction: Direction,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddOnBill {
    pub item_name: String,
    pub price: Decimal,
}

/// Bill draft handed to the ledger for invoicing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriptionInvoice {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub items: Vec<BillDraftItem>,
    pub subtotal: Decimal,
    pub additional_amount: Decimal,
    /// Customer balance when the draft was staged
    pub prev_balance: Decimal,
    pub amount_total: Decimal,
    /// Plan ids billed by this invoice
    pub subscriptions: Vec<Uuid>,
}

impl NewSubscriptionInvoice {
    /// What this invoice adds to the balance on its own
    pub fn new_charges(&self) -> Decimal {
        self.amount_total - self.prev_balance
    }
}
