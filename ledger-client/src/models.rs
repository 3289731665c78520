use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Subscriber account as returned by the customer directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    /// Amount currently owed, always ledger-derived
    pub balance: Decimal,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    /// Single-plan field kept by older accounts that predate multi-plan subscriptions
    #[serde(default)]
    pub legacy_subscription: Option<LegacySubscription>,
}

impl Customer {
    /// Active subscriptions that carry a positive agreed price
    pub fn billable_subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active && s.price > Decimal::ZERO)
    }
}

/// Plan attached to a customer at an agreed monthly price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub price: Decimal,
    pub billing_type: BillingType,
    /// Months covered by one renewal
    #[serde(default = "default_cycle_months")]
    pub cycle_months: u32,
    pub status: SubscriptionStatus,
}

fn default_cycle_months() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacySubscription {
    pub plan_name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingType {
    Prepaid,
    Postpaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Suspended,
    Cancelled,
}

/// Catalog plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub monthly_price: Decimal,
    pub code: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceKind {
    Subscription,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    InternetService,
    FixedBill,
    AddOn,
    Adjustment,
}

/// Invoice line as stored by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub item_type: ItemType,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
    #[serde(default)]
    pub period_end: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    pub amount_total: Decimal,
    #[serde(default)]
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub invoice_kind: InvoiceKind,
    pub created_at: DateTime<Utc>,
}

/// Ways a field collector can take money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "CASH")]
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "BHIM")]
    Bhim,
    #[serde(rename = "PhonePe")]
    PhonePe,
    #[serde(rename = "CARD")]
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Upi,
        PaymentMethod::Bhim,
        PaymentMethod::PhonePe,
        PaymentMethod::Card,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Bhim => "BHIM",
            PaymentMethod::PhonePe => "PhonePe",
            PaymentMethod::Card => "CARD",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown payment method '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    #[serde(default)]
    pub invoice_id: Option<Uuid>,
    pub amount: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub method: PaymentMethod,
    pub collected_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub collected_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Invoice,
    Payment,
    BalanceAdjustment,
    AddOnBill,
}

/// Debit increases the owed balance, credit decreases it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Direction of a signed balance change; zero counts as a debit.
    pub fn of_delta(delta: Decimal) -> Self {
        if delta.is_sign_negative() && !delta.is_zero() {
            Direction::Credit
        } else {
            Direction::Debit
        }
    }

    pub fn apply(self, balance_before: Decimal, amount: Decimal) -> Decimal {
        match self {
            Direction::Debit => balance_before + amount,
            Direction::Credit => balance_before - amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    Invoice,
    Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReference {
    #[serde(rename = "type")]
    pub ref_type: ReferenceType,
    pub id: Uuid,
}

/// One balance-affecting ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub transaction_date: DateTime<Utc>,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub direction: Direction,
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<TransactionReference>,
    #[serde(default)]
    pub description: String,
    /// Kind of the referenced invoice, present on INVOICE entries
    #[serde(default)]
    pub invoice_kind: Option<InvoiceKind>,
}

impl Transaction {
    pub fn expected_balance_after(&self) -> Decimal {
        self.direction.apply(self.balance_before, self.amount)
    }

    pub fn is_balanced(&self) -> bool {
        self.balance_after == self.expected_balance_after()
    }

    pub fn is_subscription_invoice(&self) -> bool {
        self.kind == TransactionKind::Invoice && self.invoice_kind == Some(InvoiceKind::Subscription)
    }

    pub fn invoice_id(&self) -> Option<Uuid> {
        self.reference
            .filter(|r| r.ref_type == ReferenceType::Invoice)
            .map(|r| r.id)
    }

    pub fn payment_id(&self) -> Option<Uuid> {
        self.reference
            .filter(|r| r.ref_type == ReferenceType::Payment)
            .map(|r| r.id)
    }
}

/// Balance, last bill and last payment in one read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub balance: Decimal,
    #[serde(default)]
    pub last_bill: Option<Invoice>,
    #[serde(default)]
    pub last_payment: Option<Payment>,
}

/// Staged invoice line; `total_amount` is always `unit_price × quantity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDraftItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub item_type: ItemType,
    pub editable: bool,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
}

impl BillDraftItem {
    pub fn new(name: impl Into<String>, unit_price: Decimal, item_type: ItemType, plan_id: Option<Uuid>) -> Self {
        Self {
            name: name.into(),
            quantity: Decimal::ONE,
            unit_price,
            total_amount: unit_price,
            item_type,
            editable: true,
            plan_id,
        }
    }

    pub fn recompute(&mut self) {
        self.total_amount = self.unit_price * self.quantity;
    }
}

impl From<&BillDraftItem> for InvoiceItem {
    fn from(item: &BillDraftItem) -> Self {
        InvoiceItem {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_amount: item.total_amount,
            item_type: item.item_type,
            plan_id: item.plan_id,
        }
    }
}
