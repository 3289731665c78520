//! Set-the-balance adjustments: signed delta and the ledger payload.

use crate::error::ConsoleResult;
use crate::input;
use ledger_client::{Direction, NewBalanceAdjustment};
use rust_decimal::Decimal;

pub struct AdjustmentCalculator;

impl AdjustmentCalculator {
    /// Signed change; no clamping in either direction
    pub fn delta(current_balance: Decimal, new_balance: Decimal) -> Decimal {
        new_balance - current_balance
    }
}

/// Operator input for the adjust-balance section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentForm {
    pub new_balance: String,
    pub reason: String,
}

impl AdjustmentForm {
    pub fn new_balance(&self) -> ConsoleResult<Decimal> {
        input::required_amount("new_balance", &self.new_balance)
    }

    pub fn delta(&self, current_balance: Decimal) -> ConsoleResult<Decimal> {
        Ok(AdjustmentCalculator::delta(current_balance, self.new_balance()?))
    }

    pub fn to_request(&self, current_balance: Decimal) -> ConsoleResult<NewBalanceAdjustment> {
        let new_balance = self.new_balance()?;
        let delta = AdjustmentCalculator::delta(current_balance, new_balance);
        Ok(NewBalanceAdjustment {
            new_balance,
            amount: delta.abs(),
            direction: Direction::of_delta(delta),
            reason: Some(self.reason.trim().to_string()).filter(|r| !r.is_empty()),
        })
    }

    pub fn reset(&mut self) {
        *self = AdjustmentForm::default();
    }
}
