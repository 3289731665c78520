//! Renewal period arithmetic.
//!
//! Months are added on the calendar and clamp to the last day of the target
//! month, so a period starting on Jan 31 runs to Feb 27 (Feb 28 in a leap
//! year). Every function takes "today" as an argument.

use crate::error::{ConsoleError, ConsoleResult};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive billing period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl fmt::Display for RenewalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

pub struct RenewalDateCalculator;

impl RenewalDateCalculator {
    /// Continue right after the last invoiced period.
    ///
    /// Returns `None` when there is no previous period end.
    pub fn from_last_invoice(
        last_period_end: Option<NaiveDate>,
        period_months: u32,
    ) -> ConsoleResult<Option<RenewalPeriod>> {
        let Some(last_end) = last_period_end else {
            return Ok(None);
        };
        let from = last_end
            .succ_opt()
            .ok_or_else(|| ConsoleError::invalid_period("period_start", "date out of range"))?;
        Self::starting(from, period_months).map(Some)
    }

    /// Start a fresh period today
    pub fn from_today(today: NaiveDate, period_months: u32) -> ConsoleResult<RenewalPeriod> {
        Self::starting(today, period_months)
    }

    /// Continue from the last invoice when there is one, otherwise start today
    pub fn suggest(
        last_period_end: Option<NaiveDate>,
        today: NaiveDate,
        period_months: u32,
    ) -> ConsoleResult<RenewalPeriod> {
        match Self::from_last_invoice(last_period_end, period_months)? {
            Some(period) => Ok(period),
            None => Self::from_today(today, period_months),
        }
    }

    fn starting(from: NaiveDate, period_months: u32) -> ConsoleResult<RenewalPeriod> {
        if period_months == 0 {
            return Err(ConsoleError::invalid_period(
                "period_months",
                "must be at least one month",
            ));
        }
        let to = from
            .checked_add_months(Months::new(period_months))
            .and_then(|end| end.pred_opt())
            .ok_or_else(|| ConsoleError::invalid_period("period_end", "date out of range"))?;
        Ok(RenewalPeriod { from, to })
    }
}
