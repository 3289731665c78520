//! In-process ledger with the remote service's bookkeeping rules.
//!
//! Keeps one balance chain per customer, recomputes downstream balances on
//! delete and mirrors the invoice side effects of payments, add-ons and
//! adjustments. Backs the offline CLI mode and the workspace tests.

use crate::error::{LedgerError, LedgerResult};
use crate::models::*;
use crate::requests::{NewAddOnBill, NewBalanceAdjustment, NewPayment, NewSubscriptionInvoice};
use crate::service::{CatalogService, CustomerDirectory, LedgerService};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

const UNPROCESSABLE: u16 = 422;

/// Record plus the customer that owns it
#[derive(Debug, Clone)]
struct Owned<T> {
    customer_id: Uuid,
    record: T,
}

/// In-memory ledger for offline use and tests
#[derive(Clone)]
pub struct InMemoryLedger {
    customers: Arc<DashMap<Uuid, Customer>>,
    /// Per-customer entries in the order they were written
    entries: Arc<DashMap<Uuid, Vec<Transaction>>>,
    invoices: Arc<DashMap<Uuid, Owned<Invoice>>>,
    payments: Arc<DashMap<Uuid, Owned<Payment>>>,
    plans: Arc<RwLock<Vec<Plan>>>,
    clock: Arc<Mutex<DateTime<Utc>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            customers: Arc::new(DashMap::new()),
            entries: Arc::new(DashMap::new()),
            invoices: Arc::new(DashMap::new()),
            payments: Arc::new(DashMap::new()),
            plans: Arc::new(RwLock::new(Vec::new())),
            clock: Arc::new(Mutex::new(DateTime::<Utc>::MIN_UTC)),
        }
    }

    /// Register a customer; its `balance` becomes the opening balance
    pub fn insert_customer(&self, customer: Customer) {
        self.entries.entry(customer.id).or_default();
        self.customers.insert(customer.id, customer);
    }

    /// Append a plan to the catalog, keeping insertion order
    pub fn insert_plan(&self, plan: Plan) {
        self.plans.write().push(plan);
    }

    pub fn customer_balance(&self, customer_id: Uuid) -> Option<Decimal> {
        self.customers.get(&customer_id).map(|c| c.balance)
    }

    /// Strictly increasing timestamps so history order is unambiguous
    fn tick(&self) -> DateTime<Utc> {
        let mut last = self.clock.lock();
        let next = std::cmp::max(Utc::now(), *last + Duration::milliseconds(1));
        *last = next;
        next
    }

    fn require_customer(&self, customer_id: Uuid) -> LedgerResult<Decimal> {
        self.customer_balance(customer_id)
            .ok_or_else(|| LedgerError::not_found("customer", customer_id))
    }

    fn reject(message: impl Into<String>) -> LedgerError {
        LedgerError::Rejected {
            status: UNPROCESSABLE,
            message: message.into(),
        }
    }

    /// Write one entry at the end of the customer's chain
    fn append(
        &self,
        customer_id: Uuid,
        kind: TransactionKind,
        delta: Decimal,
        reference: Option<TransactionReference>,
        description: String,
        invoice_kind: Option<InvoiceKind>,
    ) -> LedgerResult<Transaction> {
        let balance_before = self.require_customer(customer_id)?;
        let direction = Direction::of_delta(delta);
        let txn = Transaction {
            id: Uuid::new_v4(),
            kind,
            transaction_date: self.tick(),
            balance_before,
            balance_after: balance_before + delta,
            direction,
            amount: delta.abs(),
            reference,
            description,
            invoice_kind,
        };

        self.entries
            .entry(customer_id)
            .or_default()
            .push(txn.clone());
        self.set_balance(customer_id, txn.balance_after);
        Ok(txn)
    }

    fn set_balance(&self, customer_id: Uuid, balance: Decimal) {
        if let Some(mut customer) = self.customers.get_mut(&customer_id) {
            customer.balance = balance;
        }
    }

    fn store_invoice(&self, customer_id: Uuid, invoice: Invoice) {
        self.invoices.insert(
            invoice.id,
            Owned {
                customer_id,
                record: invoice,
            },
        );
    }

    fn other_invoice(&self, item: InvoiceItem, amount: Decimal) -> Invoice {
        let status = if amount <= Decimal::ZERO {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Unpaid
        };
        Invoice {
            id: Uuid::new_v4(),
            period_start: None,
            period_end: None,
            items: vec![item],
            subtotal: amount,
            tax_amount: Decimal::ZERO,
            amount_total: amount,
            total_paid: Decimal::ZERO,
            balance: amount,
            status,
            due_date: None,
            invoice_kind: InvoiceKind::Other,
            created_at: self.tick(),
        }
    }

    /// Apply a paid amount to an invoice, negative to reverse it
    fn settle_invoice(&self, invoice_id: Uuid, paid: Decimal) {
        if let Some(mut stored) = self.invoices.get_mut(&invoice_id) {
            let invoice = &mut stored.record;
            invoice.total_paid += paid;
            invoice.balance = invoice.amount_total - invoice.total_paid;
            invoice.status = if invoice.balance <= Decimal::ZERO {
                InvoiceStatus::Paid
            } else if invoice.total_paid > Decimal::ZERO {
                InvoiceStatus::PartiallyPaid
            } else {
                InvoiceStatus::Unpaid
            };
        }
    }

    fn owner_of_entry(&self, transaction_id: Uuid) -> Option<Uuid> {
        self.entries
            .iter()
            .find(|chain| chain.value().iter().any(|t| t.id == transaction_id))
            .map(|chain| *chain.key())
    }

    /// Remove an entry and recompute every later balance in the chain
    fn remove_entry(&self, customer_id: Uuid, transaction_id: Uuid) -> LedgerResult<Transaction> {
        let (removed, closing) = {
            let mut chain = self
                .entries
                .get_mut(&customer_id)
                .ok_or_else(|| LedgerError::not_found("transaction", transaction_id))?;
            let index = chain
                .iter()
                .position(|t| t.id == transaction_id)
                .ok_or_else(|| LedgerError::not_found("transaction", transaction_id))?;

            let removed = chain.remove(index);
            let mut running = removed.balance_before;
            for txn in chain.iter_mut().skip(index) {
                txn.balance_before = running;
                txn.balance_after = txn.expected_balance_after();
                running = txn.balance_after;
            }
            (removed, running)
        };

        self.set_balance(customer_id, closing);
        Ok(removed)
    }

    fn cascade(&self, removed: &Transaction) {
        if let Some(invoice_id) = removed.invoice_id() {
            self.invoices.remove(&invoice_id);
        }
        if let Some(payment_id) = removed.payment_id() {
            if let Some((_, payment)) = self.payments.remove(&payment_id) {
                if let Some(invoice_id) = payment.record.invoice_id {
                    let paid = payment.record.amount - payment.record.discount;
                    self.settle_invoice(invoice_id, -paid);
                }
            }
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerService for InMemoryLedger {
    async fn balance_summary(&self, customer_id: Uuid) -> LedgerResult<BalanceSummary> {
        let balance = self.require_customer(customer_id)?;

        // last bill is the newest subscription invoice; add-ons carry no period
        let last_bill = self
            .invoices
            .iter()
            .filter(|i| i.customer_id == customer_id && i.record.invoice_kind == InvoiceKind::Subscription)
            .max_by_key(|i| i.record.created_at)
            .map(|i| i.record.clone());

        let last_payment = self
            .payments
            .iter()
            .filter(|p| p.customer_id == customer_id)
            .max_by_key(|p| p.record.collected_at)
            .map(|p| p.record.clone());

        Ok(BalanceSummary {
            balance,
            last_bill,
            last_payment,
        })
    }

    async fn transaction_history(&self, customer_id: Uuid) -> LedgerResult<Vec<Transaction>> {
        self.require_customer(customer_id)?;
        Ok(self
            .entries
            .get(&customer_id)
            .map(|chain| chain.clone())
            .unwrap_or_default())
    }

    async fn create_payment(&self, customer_id: Uuid, payment: NewPayment) -> LedgerResult<Payment> {
        let balance_before = self.require_customer(customer_id)?;
        if payment.amount <= Decimal::ZERO {
            return Err(Self::reject("Payment amount must be greater than zero"));
        }
        if let Some(invoice_id) = payment.invoice_id {
            let owned = self
                .invoices
                .get(&invoice_id)
                .map(|i| i.customer_id == customer_id)
                .unwrap_or(false);
            if !owned {
                return Err(LedgerError::not_found("invoice", invoice_id));
            }
        }

        let record = Payment {
            id: Uuid::new_v4(),
            invoice_id: payment.invoice_id,
            amount: payment.amount,
            discount: payment.discount,
            method: payment.method,
            collected_at: payment.collected_at,
            comments: payment.comments.clone(),
            collected_by: None,
        };
        let paid = payment.total_payable();
        // Overpayment is not carried as credit; the balance stops at zero
        let credited = if paid > Decimal::ZERO {
            paid.min(balance_before.max(Decimal::ZERO))
        } else {
            paid
        };

        if let Some(invoice_id) = record.invoice_id {
            self.settle_invoice(invoice_id, paid);
        }
        self.payments.insert(
            record.id,
            Owned {
                customer_id,
                record: record.clone(),
            },
        );
        self.append(
            customer_id,
            TransactionKind::Payment,
            -credited,
            Some(TransactionReference {
                ref_type: ReferenceType::Payment,
                id: record.id,
            }),
            format!("Payment via {}", record.method),
            None,
        )?;

        tracing::debug!(%customer_id, payment_id = %record.id, "Recorded payment");
        Ok(record)
    }

    async fn create_balance_adjustment(
        &self,
        customer_id: Uuid,
        adjustment: NewBalanceAdjustment,
    ) -> LedgerResult<Transaction> {
        self.require_customer(customer_id)?;
        if adjustment.amount.is_sign_negative() && !adjustment.amount.is_zero() {
            return Err(Self::reject("Adjustment amount must not be negative"));
        }

        let delta = match adjustment.direction {
            Direction::Debit => adjustment.amount,
            Direction::Credit => -adjustment.amount,
        };
        let reason = adjustment
            .reason
            .clone()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Balance adjustment".to_string());

        let item = InvoiceItem {
            name: reason.clone(),
            quantity: Decimal::ONE,
            unit_price: delta,
            total_amount: delta,
            item_type: ItemType::Adjustment,
            plan_id: None,
        };
        let invoice = self.other_invoice(item, delta);
        let invoice_id = invoice.id;
        self.store_invoice(customer_id, invoice);

        self.append(
            customer_id,
            TransactionKind::BalanceAdjustment,
            delta,
            Some(TransactionReference {
                ref_type: ReferenceType::Invoice,
                id: invoice_id,
            }),
            reason,
            Some(InvoiceKind::Other),
        )
    }

    async fn create_add_on_bill(&self, customer_id: Uuid, add_on: NewAddOnBill) -> LedgerResult<Invoice> {
        self.require_customer(customer_id)?;
        if add_on.item_name.trim().is_empty() {
            return Err(Self::reject("Item name is required"));
        }
        if add_on.price <= Decimal::ZERO {
            return Err(Self::reject("Add-on price must be greater than zero"));
        }

        let item = InvoiceItem {
            name: add_on.item_name.clone(),
            quantity: Decimal::ONE,
            unit_price: add_on.price,
            total_amount: add_on.price,
            item_type: ItemType::AddOn,
            plan_id: None,
        };
        let invoice = self.other_invoice(item, add_on.price);
        self.store_invoice(customer_id, invoice.clone());

        self.append(
            customer_id,
            TransactionKind::AddOnBill,
            add_on.price,
            Some(TransactionReference {
                ref_type: ReferenceType::Invoice,
                id: invoice.id,
            }),
            format!("Add-on: {}", add_on.item_name),
            Some(InvoiceKind::Other),
        )?;
        Ok(invoice)
    }

    async fn create_subscription_invoice(
        &self,
        customer_id: Uuid,
        draft: NewSubscriptionInvoice,
    ) -> LedgerResult<Invoice> {
        self.require_customer(customer_id)?;
        if draft.items.is_empty() {
            return Err(Self::reject("Invoice must contain at least one item"));
        }
        if draft.period_start > draft.period_end {
            return Err(Self::reject("Period start must not be after period end"));
        }

        let invoice = Invoice {
            id: Uuid::new_v4(),
            period_start: Some(draft.period_start),
            period_end: Some(draft.period_end),
            items: draft.items.iter().map(InvoiceItem::from).collect(),
            subtotal: draft.subtotal,
            tax_amount: Decimal::ZERO,
            amount_total: draft.amount_total,
            total_paid: Decimal::ZERO,
            balance: draft.amount_total,
            status: InvoiceStatus::Unpaid,
            due_date: Some(draft.period_start),
            invoice_kind: InvoiceKind::Subscription,
            created_at: self.tick(),
        };
        self.store_invoice(customer_id, invoice.clone());

        self.append(
            customer_id,
            TransactionKind::Invoice,
            draft.new_charges(),
            Some(TransactionReference {
                ref_type: ReferenceType::Invoice,
                id: invoice.id,
            }),
            format!("Invoice {} to {}", draft.period_start, draft.period_end),
            Some(InvoiceKind::Subscription),
        )?;
        Ok(invoice)
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> LedgerResult<Invoice> {
        self.invoices
            .get(&invoice_id)
            .map(|i| i.record.clone())
            .ok_or_else(|| LedgerError::not_found("invoice", invoice_id))
    }

    async fn get_payment(&self, payment_id: Uuid) -> LedgerResult<Payment> {
        self.payments
            .get(&payment_id)
            .map(|p| p.record.clone())
            .ok_or_else(|| LedgerError::not_found("payment", payment_id))
    }

    async fn delete_transaction(&self, transaction_id: Uuid) -> LedgerResult<()> {
        let customer_id = self
            .owner_of_entry(transaction_id)
            .ok_or_else(|| LedgerError::not_found("transaction", transaction_id))?;
        let removed = self.remove_entry(customer_id, transaction_id)?;
        self.cascade(&removed);
        tracing::debug!(%customer_id, %transaction_id, "Deleted ledger entry");
        Ok(())
    }

    async fn delete_payment(&self, payment_id: Uuid) -> LedgerResult<()> {
        let customer_id = self
            .payments
            .get(&payment_id)
            .map(|p| p.customer_id)
            .ok_or_else(|| LedgerError::not_found("payment", payment_id))?;

        let entry_id = self.entries.get(&customer_id).and_then(|chain| {
            chain
                .iter()
                .find(|t| t.payment_id() == Some(payment_id))
                .map(|t| t.id)
        });

        match entry_id {
            Some(transaction_id) => {
                let removed = self.remove_entry(customer_id, transaction_id)?;
                self.cascade(&removed);
            }
            None => {
                self.payments.remove(&payment_id);
            }
        }
        tracing::debug!(%customer_id, %payment_id, "Deleted payment");
        Ok(())
    }
}

#[async_trait]
impl CatalogService for InMemoryLedger {
    async fn list_active_plans(&self) -> LedgerResult<Vec<Plan>> {
        Ok(self.plans.read().iter().filter(|p| p.active).cloned().collect())
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryLedger {
    async fn get_customer(&self, customer_id: Uuid) -> LedgerResult<Customer> {
        self.customers
            .get(&customer_id)
            .map(|c| c.clone())
            .ok_or_else(|| LedgerError::not_found("customer", customer_id))
    }
}
