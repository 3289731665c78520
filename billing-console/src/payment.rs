//! Payment collection form and its balance projection

use crate::error::{ConsoleError, ConsoleResult};
use crate::input;
use chrono::{DateTime, Utc};
use ledger_client::{NewPayment, PaymentMethod};
use rust_decimal::Decimal;
use uuid::Uuid;

/// What a payment would do to the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentPreview {
    pub total_payable: Decimal,
    pub projected_balance: Decimal,
    /// Discount larger than the amount raises the balance instead of lowering it
    pub discount_exceeds_amount: bool,
}

pub struct PaymentRecorder;

impl PaymentRecorder {
    pub fn total_payable(amount: Decimal, discount: Decimal) -> Decimal {
        amount - discount
    }

    /// Never below zero, even when the payment overshoots the balance
    pub fn projected_balance(current_balance: Decimal, total_payable: Decimal) -> Decimal {
        (current_balance - total_payable).max(Decimal::ZERO)
    }

    pub fn preview(amount: Decimal, discount: Decimal, current_balance: Decimal) -> PaymentPreview {
        let total_payable = Self::total_payable(amount, discount);
        PaymentPreview {
            total_payable,
            projected_balance: Self::projected_balance(current_balance, total_payable),
            discount_exceeds_amount: discount > amount,
        }
    }
}

/// Operator input for the collect-payment section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentForm {
    pub amount: String,
    pub discount: String,
    pub method: PaymentMethod,
    pub recorded_at: Option<DateTime<Utc>>,
    pub comments: String,
    /// Set by "Generate & Collect"
    pub invoice_id: Option<Uuid>,
}

impl PaymentForm {
    /// Pre-fill after an invoice was generated
    pub fn prefill_for_invoice(&mut self, invoice_id: Uuid, amount_total: Decimal) {
        self.amount = amount_total.normalize().to_string();
        self.invoice_id = Some(invoice_id);
    }

    pub fn reset(&mut self) {
        *self = PaymentForm::default();
    }

    fn amount(&self) -> ConsoleResult<Decimal> {
        input::positive_amount("amount", &self.amount)
    }

    /// Blank or unparseable discount counts as zero; negative is refused
    fn discount(&self) -> ConsoleResult<Decimal> {
        let discount = input::amount_or_zero(&self.discount);
        if discount.is_sign_negative() && !discount.is_zero() {
            return Err(ConsoleError::invalid_amount("discount", "must not be negative"));
        }
        Ok(discount)
    }

    pub fn preview(&self, current_balance: Decimal) -> ConsoleResult<PaymentPreview> {
        Ok(PaymentRecorder::preview(self.amount()?, self.discount()?, current_balance))
    }

    /// Validate and build the ledger payload
    pub fn to_request(&self) -> ConsoleResult<NewPayment> {
        let amount = self.amount()?;
        let discount = self.discount()?;
        let collected_at = self.recorded_at.ok_or_else(|| ConsoleError::required("recorded_at"))?;
        let comments = Some(self.comments.trim().to_string()).filter(|c| !c.is_empty());

        Ok(NewPayment {
            invoice_id: self.invoice_id,
            amount,
            discount,
            method: self.method,
            collected_at,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn form(amount: &str, discount: &str) -> PaymentForm {
        PaymentForm {
            amount: amount.to_string(),
            discount: discount.to_string(),
            recorded_at: Some(Utc::now()),
            ..PaymentForm::default()
        }
    }

    #[test]
    fn test_overpayment_floors_at_zero() {
        let preview = form("1000", "200").preview(dec!(500)).unwrap();
        assert_eq!(preview.total_payable, dec!(800));
        assert_eq!(preview.projected_balance, Decimal::ZERO);
        assert!(!preview.discount_exceeds_amount);
    }

    #[test]
    fn test_amount_is_required_and_positive() {
        assert!(matches!(
            form("", "0").to_request(),
            Err(ConsoleError::Validation { field: "amount", .. })
        ));
        assert!(form("abc", "0").to_request().is_err());
        assert!(form("0", "0").to_request().is_err());
        assert!(form("-10", "0").to_request().is_err());
    }

    #[test]
    fn test_discount_rules() {
        let request = form("100", "oops").to_request().unwrap();
        assert_eq!(request.discount, Decimal::ZERO);

        assert!(matches!(
            form("100", "-1").to_request(),
            Err(ConsoleError::Validation { field: "discount", .. })
        ));
    }

    #[test]
    fn test_discount_above_amount_is_flagged() {
        let preview = form("100", "150").preview(dec!(400)).unwrap();
        assert_eq!(preview.total_payable, dec!(-50));
        assert_eq!(preview.projected_balance, dec!(450));
        assert!(preview.discount_exceeds_amount);
    }

    #[test]
    fn test_recorded_at_required() {
        let mut f = form("100", "");
        f.recorded_at = None;
        assert!(matches!(
            f.to_request(),
            Err(ConsoleError::Validation { field: "recorded_at", .. })
        ));
    }

    #[test]
    fn test_prefill_and_reset() {
        let mut f = PaymentForm::default();
        let invoice_id = Uuid::new_v4();
        f.prefill_for_invoice(invoice_id, dec!(868.00));
        assert_eq!(f.amount, "868");
        assert_eq!(f.invoice_id, Some(invoice_id));

        f.reset();
        assert_eq!(f, PaymentForm::default());
    }

    proptest! {
        #[test]
        fn prop_projection_never_negative(
            amount in 1i64..1_000_000,
            discount in 0i64..1_000_000,
            balance in 0i64..1_000_000,
        ) {
            let preview = PaymentRecorder::preview(
                Decimal::from(amount),
                Decimal::from(discount),
                Decimal::from(balance),
            );
            prop_assert_eq!(preview.total_payable, Decimal::from(amount - discount));
            prop_assert!(preview.projected_balance >= Decimal::ZERO);
            prop_assert_eq!(
                preview.projected_balance,
                (Decimal::from(balance) - preview.total_payable).max(Decimal::ZERO)
            );
        }
    }
}
