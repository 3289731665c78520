//! Read model of one customer's ledger plus the actions it enables.

use crate::error::ConsoleResult;
use crate::history::TransactionHistory;
use crate::renewal::{RenewalDateCalculator, RenewalPeriod};
use chrono::NaiveDate;
use ledger_client::{BalanceSummary, Customer, Invoice, Payment, Transaction};
use rust_decimal::Decimal;

/// Which ledger actions the operator may start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGate {
    pub collect_payment: bool,
    pub renew: bool,
    pub renew_from_last_invoice: bool,
    pub adjust_balance: bool,
    pub add_on_bill: bool,
    pub delete_latest: bool,
}

/// Read model built from one reload; replaced wholesale on the next
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerProjection {
    customer: Customer,
    summary: BalanceSummary,
    history: TransactionHistory,
    default_period_months: u32,
}

impl LedgerProjection {
    pub fn new(customer: Customer, summary: BalanceSummary, entries: Vec<Transaction>) -> Self {
        Self {
            customer,
            summary,
            history: TransactionHistory::new(entries),
            default_period_months: 1,
        }
    }

    /// Period length used when the customer has no active subscription
    pub fn with_default_period(mut self, months: u32) -> Self {
        self.default_period_months = months.max(1);
        self
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Balance as reported by the ledger summary
    pub fn balance(&self) -> Decimal {
        self.summary.balance
    }

    pub fn last_bill(&self) -> Option<&Invoice> {
        self.summary.last_bill.as_ref()
    }

    pub fn last_payment(&self) -> Option<&Payment> {
        self.summary.last_payment.as_ref()
    }

    pub fn history(&self) -> &TransactionHistory {
        &self.history
    }

    pub fn deletable_entry(&self) -> Option<&Transaction> {
        self.history.deletable_entry()
    }

    pub fn last_period_end(&self) -> Option<NaiveDate> {
        self.last_bill().and_then(|bill| bill.period_end)
    }

    pub fn actions(&self) -> ActionGate {
        ActionGate {
            collect_payment: self.balance() > Decimal::ZERO,
            renew: true,
            renew_from_last_invoice: self.last_period_end().is_some(),
            adjust_balance: true,
            add_on_bill: true,
            delete_latest: self.history.deletable_entry().is_some(),
        }
    }

    /// Months per renewal from the first billable subscription
    pub fn cycle_months(&self) -> u32 {
        self.customer
            .billable_subscriptions()
            .next()
            .map(|sub| sub.cycle_months.max(1))
            .unwrap_or(self.default_period_months)
    }

    pub fn renewal_suggestion(&self, today: NaiveDate) -> ConsoleResult<RenewalPeriod> {
        RenewalDateCalculator::suggest(self.last_period_end(), today, self.cycle_months())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledger_client::{BillingType, InvoiceKind, InvoiceStatus, Subscription, SubscriptionStatus};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn customer(balance: Decimal) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Meena".to_string(),
            phone: "90000 11111".to_string(),
            balance,
            area: None,
            subscriptions: Vec::new(),
            legacy_subscription: None,
        }
    }

    fn bill(period_end: Option<NaiveDate>) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            period_start: None,
            period_end,
            items: Vec::new(),
            subtotal: dec!(499),
            tax_amount: Decimal::ZERO,
            amount_total: dec!(499),
            total_paid: Decimal::ZERO,
            balance: dec!(499),
            status: InvoiceStatus::Unpaid,
            due_date: None,
            invoice_kind: InvoiceKind::Subscription,
            created_at: Utc::now(),
        }
    }

    fn summary(balance: Decimal, last_bill: Option<Invoice>) -> BalanceSummary {
        BalanceSummary {
            balance,
            last_bill,
            last_payment: None,
        }
    }

    #[test]
    fn test_gate_for_settled_customer() {
        let projection = LedgerProjection::new(customer(Decimal::ZERO), summary(Decimal::ZERO, None), Vec::new());
        let gate = projection.actions();
        assert!(!gate.collect_payment);
        assert!(gate.renew);
        assert!(!gate.renew_from_last_invoice);
        assert!(gate.adjust_balance);
        assert!(gate.add_on_bill);
        assert!(!gate.delete_latest);
    }

    #[test]
    fn test_gate_with_outstanding_bill() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let projection = LedgerProjection::new(
            customer(dec!(499)),
            summary(dec!(499), Some(bill(Some(end)))),
            Vec::new(),
        );
        let gate = projection.actions();
        assert!(gate.collect_payment);
        assert!(gate.renew_from_last_invoice);
        assert_eq!(projection.last_period_end(), Some(end));
    }

    #[test]
    fn test_renewal_uses_subscription_cycle() {
        let mut c = customer(Decimal::ZERO);
        c.subscriptions.push(Subscription {
            plan_id: Uuid::new_v4(),
            plan_name: "Fiber quarterly".to_string(),
            price: dec!(1299),
            billing_type: BillingType::Prepaid,
            cycle_months: 3,
            status: SubscriptionStatus::Active,
        });
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let projection = LedgerProjection::new(c, summary(Decimal::ZERO, Some(bill(Some(end)))), Vec::new());

        let period = projection
            .renewal_suggestion(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .unwrap();
        assert_eq!(period.from, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(period.to, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn test_renewal_without_history_starts_today() {
        let projection = LedgerProjection::new(customer(Decimal::ZERO), summary(Decimal::ZERO, None), Vec::new())
            .with_default_period(2);
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let period = projection.renewal_suggestion(today).unwrap();
        assert_eq!(period.from, today);
        assert_eq!(period.to, NaiveDate::from_ymd_opt(2024, 7, 9).unwrap());
    }
}
