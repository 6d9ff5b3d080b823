//! Amount validation
//!
//! Every entry point that accepts a monetary amount funnels it through this
//! module, so the non-negativity rule holds no matter who calls the ledger.

use super::error::LedgerError;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Check that an already-typed amount is acceptable for the ledger
///
/// # Errors
///
/// Returns `InvalidAmount` if the amount is negative.
pub fn ensure_valid_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::invalid_amount(
            amount,
            "amount must not be negative",
        ));
    }
    Ok(amount)
}

/// Parse user-supplied text into a ledger amount
///
/// Surrounding whitespace is ignored. Empty input counts as a missing amount.
///
/// # Errors
///
/// Returns `InvalidAmount` if the text is empty, is not a decimal number,
/// or is negative.
pub fn parse_amount(raw: &str) -> Result<Decimal, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid_amount(raw, "amount is missing"));
    }

    let amount = Decimal::from_str(trimmed)
        .map_err(|_| LedgerError::invalid_amount(raw, "amount is not a number"))?;

    ensure_valid_amount(amount)
}

/// Convert a floating-point amount coming from a foreign caller
///
/// # Errors
///
/// Returns `InvalidAmount` for NaN, infinities, values outside the decimal
/// range and negative values.
pub fn amount_from_f64(value: f64) -> Result<Decimal, LedgerError> {
    if !value.is_finite() {
        return Err(LedgerError::invalid_amount(value, "amount must be finite"));
    }

    let amount = Decimal::from_f64(value)
        .ok_or_else(|| LedgerError::invalid_amount(value, "amount is out of range"))?;

    ensure_valid_amount(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("500", Decimal::new(500, 0))]
    #[case("  12.50 ", Decimal::new(1250, 2))]
    #[case("0", Decimal::ZERO)]
    #[case("0.0001", Decimal::new(1, 4))]
    fn test_parse_amount_valid(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount(raw).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::negative("-1")]
    #[case::text("abc")]
    #[case::nan("NaN")]
    #[case::infinity("inf")]
    #[case::two_dots("1.2.3")]
    fn test_parse_amount_invalid(#[case] raw: &str) {
        let result = parse_amount(raw);
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
    }

    #[rstest]
    #[case::nan(f64::NAN)]
    #[case::infinity(f64::INFINITY)]
    #[case::negative_infinity(f64::NEG_INFINITY)]
    #[case::negative(-0.5)]
    fn test_amount_from_f64_invalid(#[case] value: f64) {
        let result = amount_from_f64(value);
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
    }

    #[test]
    fn test_amount_from_f64_valid() {
        assert_eq!(amount_from_f64(150.0).unwrap(), Decimal::new(150, 0));
        assert_eq!(amount_from_f64(0.0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_ensure_valid_amount() {
        assert!(ensure_valid_amount(Decimal::new(1, 0)).is_ok());
        assert!(ensure_valid_amount(Decimal::ZERO).is_ok());
        assert!(ensure_valid_amount(Decimal::new(-1, 2)).is_err());
    }
}
