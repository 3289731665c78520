//! Composition root for one customer screen.
//!
//! Owns the four form state machines, the cached catalog and the current
//! [`LedgerProjection`]. Every remote call is bounded by the configured
//! timeout and checked against the session context before its result is
//! applied. Every successful mutation is followed by a full reload.

use crate::adjustment::AdjustmentForm;
use crate::addon::AddOnForm;
use crate::context::{ContextToken, SessionContext};
use crate::draft::{BillDraftBuilder, DraftTab, PostSubmit, SubmitAction};
use crate::error::{ConsoleError, ConsoleResult};
use crate::form::{FormKind, FormPhase, SingleFlight};
use crate::history::{DeletionRoute, PreviewTarget, TransactionHistory};
use crate::payment::{PaymentForm, PaymentPreview};
use crate::plans::PlanSelection;
use crate::projection::LedgerProjection;
use crate::renewal::{RenewalDateCalculator, RenewalPeriod};
use crate::section::Section;
use chrono::NaiveDate;
use config_engine::ConsoleConfig;
use error_common::{report_error, ErrorContext};
use ledger_client::{
    CatalogService, CustomerDirectory, Invoice, LedgerResult, LedgerService, Payment, Plan, Transaction,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceSettings {
    pub request_timeout: Duration,
    pub default_period_months: u32,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            default_period_months: 1,
        }
    }
}

impl WorkspaceSettings {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            default_period_months: config.billing.default_period_months,
        }
    }
}

/// Read-only detail view opened from history or after "Generate & View"
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Invoice(Invoice),
    Payment(Payment),
}

/// Operator confirmation for irreversible deletes
pub trait DeleteConfirmation: Send + Sync {
    fn confirm(&self, entry: &Transaction) -> bool;
}

impl<F> DeleteConfirmation for F
where
    F: Fn(&Transaction) -> bool + Send + Sync,
{
    fn confirm(&self, entry: &Transaction) -> bool {
        self(entry)
    }
}

#[derive(Debug, Default)]
struct WorkspaceState {
    section: Section,
    projection: Option<LedgerProjection>,
    catalog: Vec<Plan>,
    selection: PlanSelection,
    payment: PaymentForm,
    adjustment: AdjustmentForm,
    add_on: AddOnForm,
    draft: BillDraftBuilder,
    preview: Option<Preview>,
}

struct Flights {
    payment: SingleFlight,
    adjustment: SingleFlight,
    add_on: SingleFlight,
    draft: SingleFlight,
    delete: SingleFlight,
}

impl Flights {
    fn new() -> Self {
        Self {
            payment: SingleFlight::new(FormKind::Payment.as_str()),
            adjustment: SingleFlight::new(FormKind::Adjustment.as_str()),
            add_on: SingleFlight::new(FormKind::AddOn.as_str()),
            draft: SingleFlight::new(FormKind::BillDraft.as_str()),
            delete: SingleFlight::new(FormKind::Delete.as_str()),
        }
    }

    fn get(&self, kind: FormKind) -> &SingleFlight {
        match kind {
            FormKind::Payment => &self.payment,
            FormKind::Adjustment => &self.adjustment,
            FormKind::AddOn => &self.add_on,
            FormKind::BillDraft => &self.draft,
            FormKind::Delete => &self.delete,
        }
    }
}

/// Puts the draft back to `Staged` unless the submission completed
struct DraftRevert<'a> {
    state: &'a Mutex<WorkspaceState>,
    armed: bool,
}

impl<'a> DraftRevert<'a> {
    fn new(state: &'a Mutex<WorkspaceState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for DraftRevert<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().draft.submit_failed();
        }
    }
}

pub struct CustomerWorkspace {
    ledger: Arc<dyn LedgerService>,
    catalog: Arc<dyn CatalogService>,
    directory: Arc<dyn CustomerDirectory>,
    context: SessionContext,
    settings: WorkspaceSettings,
    state: Mutex<WorkspaceState>,
    flights: Flights,
}

impl CustomerWorkspace {
    pub fn new(
        ledger: Arc<dyn LedgerService>,
        catalog: Arc<dyn CatalogService>,
        directory: Arc<dyn CustomerDirectory>,
    ) -> Self {
        Self {
            ledger,
            catalog,
            directory,
            context: SessionContext::new(),
            settings: WorkspaceSettings::default(),
            state: Mutex::new(WorkspaceState::default()),
            flights: Flights::new(),
        }
    }

    pub fn with_settings(mut self, settings: WorkspaceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Share navigation with another holder of the same context
    pub fn with_context(mut self, context: SessionContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn settings(&self) -> WorkspaceSettings {
        self.settings
    }

    fn token(&self) -> ConsoleResult<ContextToken> {
        self.context
            .current()
            .ok_or_else(|| ConsoleError::InvalidState("no customer is open".to_string()))
    }

    fn fail(&self, operation: &'static str, err: ConsoleError) -> ConsoleError {
        let mut context = ErrorContext::for_operation(operation);
        if let Some(token) = self.context.current() {
            context = context.with_customer(token.customer_id());
        }
        report_error(&context, &err);
        err
    }

    /// Run a remote call under the timeout and drop its result if the
    /// operator switched customers meanwhile
    async fn bounded<T, F>(&self, token: Option<&ContextToken>, operation: &'static str, call: F) -> ConsoleResult<T>
    where
        F: Future<Output = LedgerResult<T>> + Send,
    {
        let outcome = tokio::time::timeout(self.settings.request_timeout, call).await;

        if let Some(token) = token {
            if !self.context.is_current(token) {
                tracing::warn!(
                    operation,
                    customer_id = %token.customer_id(),
                    "Discarding result for a customer that is no longer open"
                );
                return Err(ConsoleError::StaleContext);
            }
        }

        let result = match outcome {
            Ok(result) => result.map_err(ConsoleError::from),
            Err(_) => Err(ConsoleError::Timeout),
        };
        result.map_err(|err| self.fail(operation, err))
    }

    fn with_projection<R>(&self, f: impl FnOnce(&LedgerProjection) -> R) -> ConsoleResult<R> {
        let state = self.state.lock();
        state
            .projection
            .as_ref()
            .map(f)
            .ok_or_else(|| ConsoleError::InvalidState("ledger not loaded".to_string()))
    }

    fn current_balance(&self) -> ConsoleResult<Decimal> {
        self.with_projection(LedgerProjection::balance)
    }

    /// Switch to a customer and load their ledger
    pub async fn open_customer(&self, customer_id: Uuid) -> ConsoleResult<LedgerProjection> {
        let token = self.context.switch_to(customer_id);
        {
            let mut state = self.state.lock();
            let catalog = std::mem::take(&mut state.catalog);
            *state = WorkspaceState {
                catalog,
                ..WorkspaceState::default()
            };
        }
        let projection = self.reload_for(&token).await?;
        tracing::info!(
            %customer_id,
            phone = %logger_redacted::redact(&projection.customer().phone),
            balance = %projection.balance(),
            "Opened customer ledger"
        );
        Ok(projection)
    }

    /// Navigate away; late results for the old customer are discarded
    pub fn leave_customer(&self) {
        self.context.leave();
        let mut state = self.state.lock();
        let catalog = std::mem::take(&mut state.catalog);
        *state = WorkspaceState {
            catalog,
            ..WorkspaceState::default()
        };
    }

    /// Standard reload: customer, summary and history, replaced together
    pub async fn reload(&self) -> ConsoleResult<LedgerProjection> {
        let token = self.token()?;
        self.reload_for(&token).await
    }

    async fn reload_for(&self, token: &ContextToken) -> ConsoleResult<LedgerProjection> {
        let customer_id = token.customer_id();
        let fetch = async {
            tokio::try_join!(
                self.directory.get_customer(customer_id),
                self.ledger.balance_summary(customer_id),
                self.ledger.transaction_history(customer_id),
            )
        };
        let (customer, summary, entries) = self.bounded(Some(token), "reload", fetch).await?;

        let projection = LedgerProjection::new(customer, summary, entries)
            .with_default_period(self.settings.default_period_months);

        for entry in projection.history().balance_discrepancies() {
            tracing::warn!(
                %customer_id,
                transaction_id = %entry.id,
                balance_before = %entry.balance_before,
                balance_after = %entry.balance_after,
                expected = %entry.expected_balance_after(),
                "Ledger entry balance does not match its direction"
            );
        }

        {
            let mut state = self.state.lock();
            self.context.ensure_current(token)?;
            state.projection = Some(projection.clone());
        }

        tracing::debug!(
            %customer_id,
            entries = projection.history().len(),
            balance = %projection.balance(),
            "Ledger reloaded"
        );
        Ok(projection)
    }

    pub async fn load_catalog(&self) -> ConsoleResult<Vec<Plan>> {
        let plans = self
            .bounded(None, "load_catalog", self.catalog.list_active_plans())
            .await?;
        let mut state = self.state.lock();
        state.selection.retain_catalog(&plans);
        state.catalog = plans.clone();
        tracing::debug!(plans = plans.len(), "Plan catalog loaded");
        Ok(plans)
    }

    pub fn select_section(&self, section: Section) {
        self.state.lock().section = section;
        tracing::debug!(%section, "Section selected");
    }

    pub fn section(&self) -> Section {
        self.state.lock().section
    }

    pub fn projection(&self) -> Option<LedgerProjection> {
        self.state.lock().projection.clone()
    }

    pub fn catalog(&self) -> Vec<Plan> {
        self.state.lock().catalog.clone()
    }

    pub fn preview(&self) -> Option<Preview> {
        self.state.lock().preview.clone()
    }

    pub fn close_preview(&self) {
        self.state.lock().preview = None;
    }

    pub fn phase(&self, form: FormKind) -> FormPhase {
        self.flights.get(form).phase()
    }

    pub fn payment_form(&self) -> PaymentForm {
        self.state.lock().payment.clone()
    }

    pub fn update_payment_form(&self, edit: impl FnOnce(&mut PaymentForm)) {
        edit(&mut self.state.lock().payment);
    }

    pub fn payment_preview(&self) -> ConsoleResult<PaymentPreview> {
        let balance = self.current_balance()?;
        self.state.lock().payment.preview(balance)
    }

    pub fn adjustment_form(&self) -> AdjustmentForm {
        self.state.lock().adjustment.clone()
    }

    pub fn update_adjustment_form(&self, edit: impl FnOnce(&mut AdjustmentForm)) {
        edit(&mut self.state.lock().adjustment);
    }

    pub fn adjustment_delta(&self) -> ConsoleResult<Decimal> {
        let balance = self.current_balance()?;
        self.state.lock().adjustment.delta(balance)
    }

    pub fn add_on_form(&self) -> AddOnForm {
        self.state.lock().add_on.clone()
    }

    pub fn update_add_on_form(&self, edit: impl FnOnce(&mut AddOnForm)) {
        edit(&mut self.state.lock().add_on);
    }

    pub fn add_on_projection(&self) -> ConsoleResult<Decimal> {
        let balance = self.current_balance()?;
        self.state.lock().add_on.projected_balance(balance)
    }

    pub fn toggle_plan(&self, plan_id: Uuid) -> bool {
        self.state.lock().selection.toggle(plan_id)
    }

    /// Selected plans in catalog order
    pub fn selected_plans(&self) -> Vec<Plan> {
        let state = self.state.lock();
        state
            .selection
            .ordered(&state.catalog)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn draft(&self) -> BillDraftBuilder {
        self.state.lock().draft.clone()
    }

    pub fn update_draft<R>(&self, edit: impl FnOnce(&mut BillDraftBuilder) -> ConsoleResult<R>) -> ConsoleResult<R> {
        edit(&mut self.state.lock().draft).map_err(|err| self.fail("edit_bill_draft", err))
    }

    pub fn open_bill_draft(&self, tab: DraftTab) -> ConsoleResult<()> {
        self.update_draft(|draft| draft.open(tab))
    }

    /// Stage the draft for an explicit period
    pub fn stage_bill_draft(&self, period: RenewalPeriod) -> ConsoleResult<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let result = match state.projection.as_ref() {
            Some(projection) => {
                state
                    .draft
                    .stage(period, &state.selection, &state.catalog, projection.customer())
            }
            None => Err(ConsoleError::InvalidState("ledger not loaded".to_string())),
        };
        drop(guard);
        result.map_err(|err| self.fail("stage_bill_draft", err))
    }

    /// Work out the renewal period and stage the draft for it.
    ///
    /// `months` falls back to the customer's subscription cycle.
    pub fn stage_renewal(
        &self,
        today: NaiveDate,
        from_last_invoice: bool,
        months: Option<u32>,
    ) -> ConsoleResult<RenewalPeriod> {
        let (last_end, cycle) = self.with_projection(|p| (p.last_period_end(), p.cycle_months()))?;
        let months = months.unwrap_or(cycle);

        let period = if from_last_invoice {
            RenewalDateCalculator::from_last_invoice(last_end, months)?.ok_or_else(|| {
                ConsoleError::InvalidState("customer has no invoiced period to continue".to_string())
            })
        } else {
            RenewalDateCalculator::from_today(today, months)
        }
        .map_err(|err| self.fail("stage_renewal", err))?;

        self.stage_bill_draft(period)?;
        Ok(period)
    }

    pub async fn submit_payment(&self) -> ConsoleResult<Payment> {
        let _flight = self.flights.payment.try_begin()?;
        let token = self.token()?;
        let request = self
            .state
            .lock()
            .payment
            .to_request()
            .map_err(|err| self.fail("submit_payment", err))?;

        if request.discount > request.amount {
            tracing::warn!(
                amount = %request.amount,
                discount = %request.discount,
                "Discount exceeds amount; payment will raise the balance"
            );
        }

        let customer_id = token.customer_id();
        let payment = self
            .bounded(Some(&token), "submit_payment", self.ledger.create_payment(customer_id, request))
            .await?;
        tracing::info!(
            %customer_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            discount = %payment.discount,
            method = %payment.method,
            "Payment recorded"
        );

        self.state.lock().payment.reset();
        self.reload_for(&token).await?;
        Ok(payment)
    }

    pub async fn submit_adjustment(&self) -> ConsoleResult<Transaction> {
        let _flight = self.flights.adjustment.try_begin()?;
        let token = self.token()?;
        let request = self
            .current_balance()
            .and_then(|balance| self.state.lock().adjustment.to_request(balance))
            .map_err(|err| self.fail("submit_adjustment", err))?;

        let customer_id = token.customer_id();
        let entry = self
            .bounded(
                Some(&token),
                "submit_adjustment",
                self.ledger.create_balance_adjustment(customer_id, request),
            )
            .await?;
        tracing::info!(
            %customer_id,
            transaction_id = %entry.id,
            amount = %entry.amount,
            direction = ?entry.direction,
            "Balance adjusted"
        );

        self.state.lock().adjustment.reset();
        self.reload_for(&token).await?;
        Ok(entry)
    }

    pub async fn submit_add_on(&self) -> ConsoleResult<Invoice> {
        let _flight = self.flights.add_on.try_begin()?;
        let token = self.token()?;
        let request = self
            .state
            .lock()
            .add_on
            .to_request()
            .map_err(|err| self.fail("submit_add_on", err))?;

        let customer_id = token.customer_id();
        let invoice = self
            .bounded(Some(&token), "submit_add_on", self.ledger.create_add_on_bill(customer_id, request))
            .await?;
        tracing::info!(%customer_id, invoice_id = %invoice.id, amount = %invoice.amount_total, "Add-on billed");

        self.state.lock().add_on.reset();
        self.reload_for(&token).await?;
        Ok(invoice)
    }

    /// Create the invoice, then navigate according to `action`.
    ///
    /// The invoice stays created even if the follow-up reload fails.
    pub async fn submit_bill_draft(&self, action: SubmitAction) -> ConsoleResult<Invoice> {
        let _flight = self.flights.draft.try_begin()?;
        let token = self.token()?;
        let payload = self
            .state
            .lock()
            .draft
            .begin_submit()
            .map_err(|err| self.fail("submit_bill_draft", err))?;

        let revert = DraftRevert::new(&self.state);
        let customer_id = token.customer_id();
        let invoice = self
            .bounded(
                Some(&token),
                "submit_bill_draft",
                self.ledger.create_subscription_invoice(customer_id, payload),
            )
            .await?;
        revert.disarm();

        {
            let mut state = self.state.lock();
            state.draft.submit_succeeded();
            state.selection.clear();
            match action.after(&invoice) {
                PostSubmit::CollectPayment { invoice_id, amount } => {
                    state.payment.reset();
                    state.payment.prefill_for_invoice(invoice_id, amount);
                    state.section = Section::CollectPayment;
                }
                PostSubmit::Ledger => {}
                PostSubmit::Preview(invoice) => {
                    state.preview = Some(Preview::Invoice(invoice));
                }
            }
        }
        tracing::info!(
            %customer_id,
            invoice_id = %invoice.id,
            amount_total = %invoice.amount_total,
            ?action,
            "Invoice generated"
        );

        self.reload_for(&token).await?;
        Ok(invoice)
    }

    fn deletable(&self, transaction_id: Option<Uuid>) -> ConsoleResult<Transaction> {
        self.with_projection(|projection| {
            let history = projection.history();
            let position = match transaction_id {
                Some(id) => history.position_of(id).ok_or_else(|| {
                    ConsoleError::DeletionNotPermitted("entry is not in the loaded history".to_string())
                })?,
                None => 0,
            };
            if !history.is_deletable(position) {
                return Err(ConsoleError::DeletionNotPermitted(
                    "only the latest entry after the last subscription invoice can be deleted".to_string(),
                ));
            }
            history
                .get(position)
                .cloned()
                .ok_or_else(|| ConsoleError::DeletionNotPermitted("history is empty".to_string()))
        })?
    }

    /// Delete the latest entry if the deletion rule allows it
    pub async fn delete_latest(&self, confirmation: &dyn DeleteConfirmation) -> ConsoleResult<Transaction> {
        self.delete(None, confirmation).await
    }

    /// Delete a specific entry; refused unless it is the deletable one
    pub async fn delete_entry(
        &self,
        transaction_id: Uuid,
        confirmation: &dyn DeleteConfirmation,
    ) -> ConsoleResult<Transaction> {
        self.delete(Some(transaction_id), confirmation).await
    }

    async fn delete(
        &self,
        transaction_id: Option<Uuid>,
        confirmation: &dyn DeleteConfirmation,
    ) -> ConsoleResult<Transaction> {
        let _flight = self.flights.delete.try_begin()?;
        let token = self.token()?;
        let entry = self
            .deletable(transaction_id)
            .map_err(|err| self.fail("delete_entry", err))?;

        if !confirmation.confirm(&entry) {
            tracing::info!(transaction_id = %entry.id, "Deletion cancelled by operator");
            return Err(ConsoleError::Cancelled);
        }

        let call = match TransactionHistory::deletion_route(&entry) {
            DeletionRoute::Payment(payment_id) => self.ledger.delete_payment(payment_id),
            DeletionRoute::Transaction(id) => self.ledger.delete_transaction(id),
        };
        self.bounded(Some(&token), "delete_entry", call).await?;
        tracing::info!(
            customer_id = %token.customer_id(),
            transaction_id = %entry.id,
            kind = ?entry.kind,
            "Ledger entry deleted"
        );

        self.state.lock().preview = None;
        self.reload_for(&token).await?;
        Ok(entry)
    }

    /// Fetch the detail behind a history row; nothing opens on failure
    pub async fn open_preview(&self, position: usize) -> ConsoleResult<Preview> {
        let token = self.token()?;
        let target = self
            .with_projection(|projection| projection.history().preview_target(position))
            .and_then(|target| {
                target.ok_or_else(|| ConsoleError::InvalidState(format!("no detail for history row {position}")))
            })
            .map_err(|err| self.fail("open_preview", err))?;

        let preview = match target {
            PreviewTarget::Invoice(id) => Preview::Invoice(
                self.bounded(Some(&token), "open_preview", self.ledger.get_invoice(id))
                    .await?,
            ),
            PreviewTarget::Payment(id) => Preview::Payment(
                self.bounded(Some(&token), "open_preview", self.ledger.get_payment(id))
                    .await?,
            ),
        };

        self.state.lock().preview = Some(preview.clone());
        Ok(preview)
    }
}
