// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

/// Maior valor de uma coluna `NUMERIC(12, 2)`: 9 999 999 999,99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Valor monetário dentro da faixa gravável.
pub fn amount_in_range(val: &Decimal) -> bool {
    !(val.is_sign_negative() && !val.is_zero()) && *val <= MAX_AMOUNT
}

// Validação customizada para valores monetários
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Le montant ne peut pas etre negatif".into());
        return Err(err);
    }
    if *val > MAX_AMOUNT {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &MAX_AMOUNT.to_string());
        err.message = Some("Le montant est trop eleve".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    validate_not_negative(val).map_err(|mut err| {
        if err.params.contains_key("min") {
            err.message = Some("Le prix ne peut pas etre negatif".into());
        } else {
            err.message = Some("Le prix est trop eleve".into());
        }
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dec;

    #[test]
    fn accepts_zero_and_positive_amounts() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&dec("12.50")).is_ok());
    }

    #[test]
    fn max_amount_matches_column_precision() {
        assert_eq!(MAX_AMOUNT, dec("9999999999.99"));
        assert!(validate_price(&MAX_AMOUNT).is_ok());
        assert!(amount_in_range(&MAX_AMOUNT));
        assert!(!amount_in_range(&dec("-0.01")));
    }

    #[test]
    fn rejects_amounts_beyond_column_precision() {
        let err = validate_price(&dec("10000000000")).unwrap_err();
        assert_eq!(err.message.unwrap(), "Le prix est trop eleve");
        let err = validate_not_negative(&dec("70000000000000000000000000000")).unwrap_err();
        assert_eq!(err.message.unwrap(), "Le montant est trop eleve");
        assert!(!amount_in_range(&dec("10000000000")));
    }

    #[test]
    fn rejects_negative_amounts() {
        let err = validate_price(&dec("-1")).unwrap_err();
        assert_eq!(err.message.unwrap(), "Le prix ne peut pas etre negatif");
    }
}
