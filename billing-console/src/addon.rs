//! One-off add-on bills.

use crate::error::{ConsoleError, ConsoleResult};
use crate::input;
use ledger_client::NewAddOnBill;
use rust_decimal::Decimal;

pub struct AddOnCalculator;

impl AddOnCalculator {
    pub fn projected_balance(current_balance: Decimal, price: Decimal) -> Decimal {
        current_balance + price
    }
}

/// Operator input for the add-on-bill section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOnForm {
    pub item_name: String,
    pub price: String,
}

impl AddOnForm {
    pub fn projected_balance(&self, current_balance: Decimal) -> ConsoleResult<Decimal> {
        let price = input::positive_amount("price", &self.price)?;
        Ok(AddOnCalculator::projected_balance(current_balance, price))
    }

    pub fn to_request(&self) -> ConsoleResult<NewAddOnBill> {
        let item_name = self.item_name.trim();
        if item_name.is_empty() {
            return Err(ConsoleError::required("item_name"));
        }
        Ok(NewAddOnBill {
            item_name: item_name.to_string(),
            price: input::positive_amount("price", &self.price)?,
        })
    }

    pub fn reset(&mut self) {
        *self = AddOnForm::default();
    }
}
