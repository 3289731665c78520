//! Parsing of operator-entered amounts

use crate::error::{ConsoleError, ConsoleResult};
use rust_decimal::Decimal;
use std::str::FromStr;

fn parse(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Required decimal: blank is a missing field, garbage is a format error
pub fn required_amount(field: &'static str, raw: &str) -> ConsoleResult<Decimal> {
    if raw.trim().is_empty() {
        return Err(ConsoleError::required(field));
    }
    parse(raw).ok_or_else(|| ConsoleError::invalid_format(field, format!("'{}' is not a number", raw.trim())))
}

/// Required decimal that must be strictly positive
pub fn positive_amount(field: &'static str, raw: &str) -> ConsoleResult<Decimal> {
    let value = required_amount(field, raw)?;
    if value <= Decimal::ZERO {
        return Err(ConsoleError::invalid_amount(field, "must be greater than zero"));
    }
    Ok(value)
}

/// Blank means zero; anything else must parse
pub fn optional_amount(field: &'static str, raw: &str) -> ConsoleResult<Decimal> {
    if raw.trim().is_empty() {
        return Ok(Decimal::ZERO);
    }
    required_amount(field, raw)
}

/// Lenient parse: anything unparseable is zero
pub fn amount_or_zero(raw: &str) -> Decimal {
    parse(raw).unwrap_or(Decimal::ZERO)
}
