//! Bill draft state machine.
//!
//! `Closed → Open(tab) → Staged → Submitting → Closed`. A failed submission
//! returns to `Staged` with every edit intact. Staging straight from
//! `Closed` opens the draft implicitly; the tab only records which input
//! panel the operator has in front of them and never changes which source
//! the items come from.

use crate::error::{ConsoleError, ConsoleResult};
use crate::input;
use crate::plans::PlanSelection;
use crate::renewal::RenewalPeriod;
use itertools::Itertools;
use ledger_client::{BillDraftItem, Customer, Invoice, ItemType, NewSubscriptionInvoice, Plan};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const FIXED_BILL_ITEM_NAME: &str = "Fixed Bill Amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTab {
    Plans,
    FixedAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Closed,
    Open(DraftTab),
    Staged,
    Submitting,
}

/// The three generate buttons; they send the same payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    GenerateAndCollect,
    Generate,
    GenerateAndView,
}

/// Where the operator lands after a successful submission
#[derive(Debug, Clone, PartialEq)]
pub enum PostSubmit {
    CollectPayment { invoice_id: Uuid, amount: Decimal },
    Ledger,
    Preview(Invoice),
}

impl SubmitAction {
    pub fn after(self, invoice: &Invoice) -> PostSubmit {
        match self {
            SubmitAction::GenerateAndCollect => PostSubmit::CollectPayment {
                invoice_id: invoice.id,
                amount: invoice.amount_total,
            },
            SubmitAction::Generate => PostSubmit::Ledger,
            SubmitAction::GenerateAndView => PostSubmit::Preview(invoice.clone()),
        }
    }
}

/// Where the staged items came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    SelectedPlans,
    Subscriptions,
    LegacySubscription,
    FixedAmount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillDraftBuilder {
    state: DraftState,
    /// Raw input of the fixed-amount tab
    pub fixed_amount: String,
    items: Vec<BillDraftItem>,
    additional_amount: String,
    prev_balance: Decimal,
    period: Option<RenewalPeriod>,
    edit_mode: bool,
    source: Option<ItemSource>,
}

impl Default for BillDraftBuilder {
    fn default() -> Self {
        Self {
            state: DraftState::Closed,
            fixed_amount: String::new(),
            items: Vec::new(),
            additional_amount: String::new(),
            prev_balance: Decimal::ZERO,
            period: None,
            edit_mode: false,
            source: None,
        }
    }
}

impl BillDraftBuilder {
    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn items(&self) -> &[BillDraftItem] {
        &self.items
    }

    pub fn period(&self) -> Option<RenewalPeriod> {
        self.period
    }

    pub fn prev_balance(&self) -> Decimal {
        self.prev_balance
    }

    pub fn source(&self) -> Option<ItemSource> {
        self.source
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn additional_amount_input(&self) -> &str {
        &self.additional_amount
    }

    /// Open the draft panel on a tab, or switch tabs while open
    pub fn open(&mut self, tab: DraftTab) -> ConsoleResult<()> {
        match self.state {
            DraftState::Closed | DraftState::Open(_) => {
                self.state = DraftState::Open(tab);
                Ok(())
            }
            other => Err(invalid(other, "open")),
        }
    }

    /// Discard the draft; refused while a submission is in flight
    pub fn close(&mut self) -> ConsoleResult<()> {
        if self.state == DraftState::Submitting {
            return Err(invalid(self.state, "close"));
        }
        *self = BillDraftBuilder::default();
        Ok(())
    }

    /// Stage line items for `period` from the first source that yields any.
    ///
    /// Priority: selected plans, active priced subscriptions, the legacy
    /// subscription field, then the fixed amount. Fails and closes the
    /// draft when none applies.
    pub fn stage(
        &mut self,
        period: RenewalPeriod,
        selection: &PlanSelection,
        catalog: &[Plan],
        customer: &Customer,
    ) -> ConsoleResult<()> {
        if matches!(self.state, DraftState::Staged | DraftState::Submitting) {
            return Err(invalid(self.state, "stage"));
        }
        if period.from > period.to {
            self.state = DraftState::Closed;
            return Err(ConsoleError::invalid_period(
                "period_start",
                "must not be after the period end",
            ));
        }

        let staged = match Self::collect_items(selection, catalog, customer, &self.fixed_amount) {
            Ok(Some(staged)) => staged,
            Ok(None) => {
                self.state = DraftState::Closed;
                return Err(ConsoleError::NoBillableItems);
            }
            Err(err) => {
                self.state = DraftState::Closed;
                return Err(err);
            }
        };

        let (source, items) = staged;
        self.items = items;
        self.source = Some(source);
        self.period = Some(period);
        self.prev_balance = customer.balance;
        self.additional_amount.clear();
        self.edit_mode = false;
        self.state = DraftState::Staged;
        Ok(())
    }

    fn collect_items(
        selection: &PlanSelection,
        catalog: &[Plan],
        customer: &Customer,
        fixed_amount: &str,
    ) -> ConsoleResult<Option<(ItemSource, Vec<BillDraftItem>)>> {
        let selected: Vec<BillDraftItem> = selection
            .ordered(catalog)
            .into_iter()
            .map(|plan| {
                BillDraftItem::new(&plan.name, plan.monthly_price, ItemType::InternetService, Some(plan.id))
            })
            .collect();
        if !selected.is_empty() {
            return Ok(Some((ItemSource::SelectedPlans, selected)));
        }

        let subscribed: Vec<BillDraftItem> = customer
            .billable_subscriptions()
            .map(|sub| {
                BillDraftItem::new(&sub.plan_name, sub.price, ItemType::InternetService, Some(sub.plan_id))
            })
            .collect();
        if !subscribed.is_empty() {
            return Ok(Some((ItemSource::Subscriptions, subscribed)));
        }

        if let Some(legacy) = customer
            .legacy_subscription
            .as_ref()
            .filter(|legacy| legacy.price > Decimal::ZERO)
        {
            let item = BillDraftItem::new(&legacy.plan_name, legacy.price, ItemType::InternetService, None);
            return Ok(Some((ItemSource::LegacySubscription, vec![item])));
        }

        if fixed_amount.trim().is_empty() {
            return Ok(None);
        }
        let amount = input::positive_amount("fixed_amount", fixed_amount)?;
        let item = BillDraftItem::new(FIXED_BILL_ITEM_NAME, amount, ItemType::FixedBill, None);
        Ok(Some((ItemSource::FixedAmount, vec![item])))
    }

    /// Global toggle for inline editing of every row
    pub fn set_edit_mode(&mut self, enabled: bool) -> ConsoleResult<()> {
        self.require_staged("toggle edit mode")?;
        self.edit_mode = enabled;
        Ok(())
    }

    fn editable_row(&mut self, index: usize) -> ConsoleResult<&mut BillDraftItem> {
        self.require_staged("edit")?;
        if !self.edit_mode {
            return Err(ConsoleError::InvalidState("edit mode is off".to_string()));
        }
        let item = self
            .items
            .get_mut(index)
            .ok_or_else(|| ConsoleError::InvalidState(format!("no draft row {index}")))?;
        if !item.editable {
            return Err(ConsoleError::InvalidState(format!("row {index} is read-only")));
        }
        Ok(item)
    }

    pub fn rename_item(&mut self, index: usize, name: &str) -> ConsoleResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsoleError::required("name"));
        }
        self.editable_row(index)?.name = name.to_string();
        Ok(())
    }

    pub fn set_quantity(&mut self, index: usize, quantity: Decimal) -> ConsoleResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(ConsoleError::invalid_amount("quantity", "must be greater than zero"));
        }
        let item = self.editable_row(index)?;
        item.quantity = quantity;
        item.recompute();
        Ok(())
    }

    pub fn set_unit_price(&mut self, index: usize, unit_price: Decimal) -> ConsoleResult<()> {
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(ConsoleError::invalid_amount("unit_price", "must not be negative"));
        }
        let item = self.editable_row(index)?;
        item.unit_price = unit_price;
        item.recompute();
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> ConsoleResult<BillDraftItem> {
        self.require_staged("remove a row")?;
        if index >= self.items.len() {
            return Err(ConsoleError::InvalidState(format!("no draft row {index}")));
        }
        Ok(self.items.remove(index))
    }

    /// Raw input; blank is zero, any sign is accepted
    pub fn set_additional_amount(&mut self, raw: &str) -> ConsoleResult<()> {
        self.require_staged("edit the additional amount")?;
        input::optional_amount("additional_amount", raw)?;
        self.additional_amount = raw.trim().to_string();
        Ok(())
    }

    pub fn additional_amount(&self) -> Decimal {
        input::amount_or_zero(&self.additional_amount)
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(|item| item.total_amount).sum()
    }

    /// Items plus additional amount plus the balance carried in
    pub fn grand_total(&self) -> Decimal {
        self.subtotal() + self.additional_amount() + self.prev_balance
    }

    /// Re-derive every row total; totals are stable under repetition
    pub fn recompute(&mut self) {
        self.items.iter_mut().for_each(BillDraftItem::recompute);
    }

    /// Payload for the current draft without changing state
    pub fn payload(&self) -> ConsoleResult<NewSubscriptionInvoice> {
        self.require_staged("submit")?;
        if self.items.is_empty() {
            return Err(ConsoleError::required("items"));
        }
        let period = self
            .period
            .ok_or_else(|| ConsoleError::invalid_period("period_start", "is required"))?;

        let subscriptions = self
            .items
            .iter()
            .filter_map(|item| item.plan_id)
            .unique()
            .collect();

        Ok(NewSubscriptionInvoice {
            period_start: period.from,
            period_end: period.to,
            items: self.items.clone(),
            subtotal: self.subtotal(),
            additional_amount: self.additional_amount(),
            prev_balance: self.prev_balance,
            amount_total: self.grand_total(),
            subscriptions,
        })
    }

    /// `Staged → Submitting`
    pub fn begin_submit(&mut self) -> ConsoleResult<NewSubscriptionInvoice> {
        let payload = self.payload()?;
        self.state = DraftState::Submitting;
        Ok(payload)
    }

    /// `Submitting → Closed`
    pub fn submit_succeeded(&mut self) {
        if self.state == DraftState::Submitting {
            *self = BillDraftBuilder::default();
        }
    }

    /// `Submitting → Staged`; a no-op if the draft was reset meanwhile
    pub fn submit_failed(&mut self) {
        if self.state == DraftState::Submitting {
            self.state = DraftState::Staged;
        }
    }

    fn require_staged(&self, action: &str) -> ConsoleResult<()> {
        if self.state == DraftState::Staged {
            Ok(())
        } else {
            Err(invalid(self.state, action))
        }
    }
}

fn invalid(state: DraftState, action: &str) -> ConsoleError {
    ConsoleError::InvalidState(format!("cannot {action} while draft is {state:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledger_client::{BillingType, LegacySubscription, Subscription, SubscriptionStatus};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn period() -> RenewalPeriod {
        RenewalPeriod {
            from: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
        }
    }

    fn plan(name: &str, price: Decimal) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            name: name.to_string(),
            monthly_price: price,
            code: name.to_uppercase(),
            active: true,
        }
    }

    fn customer(balance: Decimal) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Ravi Kumar".to_string(),
            phone: "98450 00000".to_string(),
            balance,
            area: None,
            subscriptions: Vec::new(),
            legacy_subscription: None,
        }
    }

    fn subscription(name: &str, price: Decimal, status: SubscriptionStatus) -> Subscription {
        Subscription {
            plan_id: Uuid::new_v4(),
            plan_name: name.to_string(),
            price,
            billing_type: BillingType::Prepaid,
            cycle_months: 1,
            status,
        }
    }

    #[test]
    fn test_selected_plans_grand_total() {
        let catalog = vec![plan("A", dec!(499)), plan("B", dec!(199))];
        let mut selection = PlanSelection::default();
        selection.select(catalog[0].id);
        selection.select(catalog[1].id);

        let mut draft = BillDraftBuilder::default();
        draft.open(DraftTab::Plans).unwrap();
        draft.stage(period(), &selection, &catalog, &customer(dec!(120))).unwrap();
        draft.set_additional_amount("50").unwrap();

        assert_eq!(draft.state(), DraftState::Staged);
        assert_eq!(draft.source(), Some(ItemSource::SelectedPlans));
        assert_eq!(draft.subtotal(), dec!(698));
        assert_eq!(draft.grand_total(), dec!(868));

        let payload = draft.payload().unwrap();
        assert_eq!(payload.amount_total, dec!(868));
        assert_eq!(payload.prev_balance, dec!(120));
        assert_eq!(payload.subscriptions, vec![catalog[0].id, catalog[1].id]);
    }

    #[test]
    fn test_subscriptions_used_when_nothing_selected() {
        let mut c = customer(Decimal::ZERO);
        c.subscriptions = vec![
            subscription("Fiber 100", dec!(499), SubscriptionStatus::Active),
            subscription("Old plan", dec!(299), SubscriptionStatus::Cancelled),
            subscription("Free IPTV", Decimal::ZERO, SubscriptionStatus::Active),
        ];

        let mut draft = BillDraftBuilder::default();
        draft.stage(period(), &PlanSelection::default(), &[], &c).unwrap();
        assert_eq!(draft.source(), Some(ItemSource::Subscriptions));
        assert_eq!(draft.items().len(), 1);
        assert_eq!(draft.items()[0].name, "Fiber 100");
        assert_eq!(draft.items()[0].item_type, ItemType::InternetService);
    }

    #[test]
    fn test_legacy_then_fixed_amount() {
        let mut c = customer(Decimal::ZERO);
        c.legacy_subscription = Some(LegacySubscription {
            plan_name: "Cable 50".to_string(),
            price: dec!(350),
        });
        let mut draft = BillDraftBuilder::default();
        draft.fixed_amount = "900".to_string();
        draft.stage(period(), &PlanSelection::default(), &[], &c).unwrap();
        assert_eq!(draft.source(), Some(ItemSource::LegacySubscription));

        let mut fixed = BillDraftBuilder::default();
        fixed.open(DraftTab::FixedAmount).unwrap();
        fixed.fixed_amount = "900".to_string();
        fixed.stage(period(), &PlanSelection::default(), &[], &customer(Decimal::ZERO)).unwrap();
        assert_eq!(fixed.items()[0].name, FIXED_BILL_ITEM_NAME);
        assert_eq!(fixed.items()[0].item_type, ItemType::FixedBill);
        assert_eq!(fixed.grand_total(), dec!(900));
    }

    #[test]
    fn test_nothing_billable_stays_closed() {
        let mut draft = BillDraftBuilder::default();
        draft.open(DraftTab::Plans).unwrap();
        let err = draft
            .stage(period(), &PlanSelection::default(), &[], &customer(Decimal::ZERO))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::NoBillableItems));
        assert_eq!(err.to_string(), "No valid subscription or bill item");
        assert_eq!(draft.state(), DraftState::Closed);
    }

    #[test]
    fn test_inverted_period_rejected() {
        let mut draft = BillDraftBuilder::default();
        draft.fixed_amount = "100".to_string();
        let inverted = RenewalPeriod {
            from: period().to,
            to: period().from,
        };
        let err = draft
            .stage(inverted, &PlanSelection::default(), &[], &customer(Decimal::ZERO))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_stage_from_closed_opens_implicitly() {
        let mut draft = BillDraftBuilder::default();
        assert_eq!(draft.state(), DraftState::Closed);
        draft.fixed_amount = "250".to_string();
        draft.stage(period(), &PlanSelection::default(), &[], &customer(Decimal::ZERO)).unwrap();
        assert_eq!(draft.state(), DraftState::Staged);
        assert_eq!(draft.source(), Some(ItemSource::FixedAmount));

        // The tab never overrides the source priority
        let mut on_fixed_tab = BillDraftBuilder::default();
        on_fixed_tab.open(DraftTab::FixedAmount).unwrap();
        on_fixed_tab.fixed_amount = "250".to_string();
        let mut legacy = customer(Decimal::ZERO);
        legacy.legacy_subscription = Some(LegacySubscription {
            plan_name: "Basic 20".to_string(),
            price: dec!(300),
        });
        on_fixed_tab.stage(period(), &PlanSelection::default(), &[], &legacy).unwrap();
        assert_eq!(on_fixed_tab.source(), Some(ItemSource::LegacySubscription));
    }

    #[test]
    fn test_edits_need_edit_mode_and_recompute() {
        let mut draft = BillDraftBuilder::default();
        draft.fixed_amount = "100".to_string();
        draft.stage(period(), &PlanSelection::default(), &[], &customer(Decimal::ZERO)).unwrap();

        assert!(draft.set_quantity(0, dec!(2)).is_err());
        draft.set_edit_mode(true).unwrap();
        draft.set_quantity(0, dec!(2)).unwrap();
        draft.set_unit_price(0, dec!(150)).unwrap();
        draft.rename_item(0, "Installation").unwrap();
        assert_eq!(draft.items()[0].total_amount, dec!(300));
        assert_eq!(draft.items()[0].name, "Installation");

        assert!(draft.set_quantity(0, Decimal::ZERO).is_err());
        assert!(draft.set_unit_price(0, dec!(-1)).is_err());
        draft.set_unit_price(0, Decimal::ZERO).unwrap();
    }

    #[test]
    fn test_empty_draft_cannot_submit() {
        let mut draft = BillDraftBuilder::default();
        draft.fixed_amount = "100".to_string();
        draft.stage(period(), &PlanSelection::default(), &[], &customer(Decimal::ZERO)).unwrap();
        draft.remove_item(0).unwrap();

        assert!(matches!(
            draft.begin_submit(),
            Err(ConsoleError::Validation { field: "items", .. })
        ));
        assert_eq!(draft.state(), DraftState::Staged);
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut draft = BillDraftBuilder::default();
        draft.fixed_amount = "100".to_string();
        draft.stage(period(), &PlanSelection::default(), &[], &customer(dec!(20))).unwrap();
        draft.set_additional_amount("-5").unwrap();

        draft.begin_submit().unwrap();
        assert_eq!(draft.state(), DraftState::Submitting);
        assert!(draft.close().is_err());

        draft.submit_failed();
        assert_eq!(draft.state(), DraftState::Staged);
        assert_eq!(draft.grand_total(), dec!(115));

        draft.begin_submit().unwrap();
        draft.submit_succeeded();
        assert_eq!(draft.state(), DraftState::Closed);
        assert!(draft.items().is_empty());
    }

    #[test]
    fn test_invalid_additional_amount_keeps_previous() {
        let mut draft = BillDraftBuilder::default();
        draft.fixed_amount = "100".to_string();
        draft.stage(period(), &PlanSelection::default(), &[], &customer(Decimal::ZERO)).unwrap();
        draft.set_additional_amount("25").unwrap();
        assert!(draft.set_additional_amount("abc").is_err());
        assert_eq!(draft.additional_amount(), dec!(25));
    }

    proptest! {
        #[test]
        fn prop_grand_total_is_sum(
            prices in proptest::collection::vec(0i64..100_000, 1..6),
            additional in -10_000i64..10_000,
            balance in 0i64..100_000,
        ) {
            let catalog: Vec<Plan> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| plan(&format!("P{i}"), Decimal::from(*p)))
                .collect();
            let mut selection = PlanSelection::default();
            catalog.iter().for_each(|p| selection.select(p.id));

            let mut draft = BillDraftBuilder::default();
            draft.stage(period(), &selection, &catalog, &customer(Decimal::from(balance))).unwrap();
            draft.set_additional_amount(&additional.to_string()).unwrap();

            let expected = Decimal::from(prices.iter().sum::<i64>())
                + Decimal::from(additional)
                + Decimal::from(balance);
            prop_assert_eq!(draft.grand_total(), expected);
            draft.recompute();
            draft.recompute();
            prop_assert_eq!(draft.grand_total(), expected);
        }
    }
}
