use crate::error::LedgerResult;
use crate::models::{BalanceSummary, Customer, Invoice, Payment, Plan, Transaction};
use crate::requests::{NewAddOnBill, NewBalanceAdjustment, NewPayment, NewSubscriptionInvoice};
use async_trait::async_trait;
use uuid::Uuid;

/// Remote customer ledger.
///
/// The ledger owns every balance computation; implementations only carry
/// requests and replies.
#[async_trait]
pub trait LedgerService: Send + Sync {
    /// Current balance with last bill and last payment
    async fn balance_summary(&self, customer_id: Uuid) -> LedgerResult<BalanceSummary>;

    /// Every ledger entry for the customer, in whatever order the service returns
    async fn transaction_history(&self, customer_id: Uuid) -> LedgerResult<Vec<Transaction>>;

    async fn create_payment(&self, customer_id: Uuid, payment: NewPayment) -> LedgerResult<Payment>;

    async fn create_balance_adjustment(
        &self,
        customer_id: Uuid,
        adjustment: NewBalanceAdjustment,
    ) -> LedgerResult<Transaction>;

    /// Creates an OTHER invoice plus its ADD_ON_BILL debit
    async fn create_add_on_bill(&self, customer_id: Uuid, add_on: NewAddOnBill) -> LedgerResult<Invoice>;

    async fn create_subscription_invoice(
        &self,
        customer_id: Uuid,
        draft: NewSubscriptionInvoice,
    ) -> LedgerResult<Invoice>;

    async fn get_invoice(&self, invoice_id: Uuid) -> LedgerResult<Invoice>;

    async fn get_payment(&self, payment_id: Uuid) -> LedgerResult<Payment>;

    /// Irreversible; downstream balances are recomputed by the service
    async fn delete_transaction(&self, transaction_id: Uuid) -> LedgerResult<()>;

    async fn delete_payment(&self, payment_id: Uuid) -> LedgerResult<()>;
}

/// Plan catalog
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_active_plans(&self) -> LedgerResult<Vec<Plan>>;
}

/// Customer records
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn get_customer(&self, customer_id: Uuid) -> LedgerResult<Customer>;
}
