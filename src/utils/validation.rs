//! Validation utilities

use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate an operation amount and normalize it to scale 2.
///
/// Amounts must be strictly positive and carry at most two decimal places;
/// anything else fails with [`LedgerError::InvalidAmount`] before any
/// storage is touched.
pub fn validate_amount(amount: &BigDecimal) -> LedgerResult<BigDecimal> {
    if *amount <= BigDecimal::from(0) {
        return Err(LedgerError::InvalidAmount(
            "amount must be positive".to_string(),
        ));
    }

    if amount.fractional_digit_count() > 2 {
        return Err(LedgerError::InvalidAmount(format!(
            "amount {} has more than two decimal places",
            amount
        )));
    }

    Ok(amount.with_scale(2))
}

/// Validate an account display name
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.len() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn accepts_positive_amounts_up_to_two_places() {
        assert_eq!(
            validate_amount(&BigDecimal::from(100)).unwrap(),
            BigDecimal::from(100)
        );
        assert_eq!(
            validate_amount(&BigDecimal::from_str("0.01").unwrap()).unwrap(),
            BigDecimal::from_str("0.01").unwrap()
        );
        // normalization pads to scale 2
        assert_eq!(
            validate_amount(&BigDecimal::from_str("2.5").unwrap())
                .unwrap()
                .to_string(),
            "2.50"
        );
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        assert!(matches!(
            validate_amount(&BigDecimal::from(0)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount(&BigDecimal::from(-5)),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_sub_cent_precision() {
        let amount = BigDecimal::from_str("1.001").unwrap();
        assert!(matches!(
            validate_amount(&amount),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn validates_account_names() {
        assert!(validate_account_name("Checking").is_ok());
        assert!(validate_account_name("   ").is_err());
        assert!(validate_account_name(&"x".repeat(101)).is_err());
    }
}
