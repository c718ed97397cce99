// src/services/margin.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::common::error::AppError;

/// Margem de uma venda e seu percentual sobre o custo total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margin {
    pub amount: Decimal,
    pub percent: Decimal,
}

/// Cálculo único usado por todos os caminhos que criam ou alteram vendas.
///
/// custo = compra + reforma; taxas = plataforma + envio;
/// margem = venda - custo - taxas; percentual = margem / custo * 100
/// (0 quando o custo é zero). Ambos arredondados a 2 casas.
/// Estouro aritmético vira erro de negócio, nunca pânico.
pub fn compute_margin(
    sale_price: Decimal,
    purchase_price: Decimal,
    refurbishment_cost: Decimal,
    platform_fees: Decimal,
    shipping_cost: Decimal,
) -> Result<Margin, AppError> {
    let total_cost = purchase_price.checked_add(refurbishment_cost).ok_or_else(out_of_range)?;
    let total_fees = platform_fees.checked_add(shipping_cost).ok_or_else(out_of_range)?;
    let amount = sale_price
        .checked_sub(total_cost)
        .and_then(|v| v.checked_sub(total_fees))
        .ok_or_else(out_of_range)?;

    let percent = if total_cost > Decimal::ZERO {
        amount
            .checked_div(total_cost)
            .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(out_of_range)?
    } else {
        Decimal::ZERO
    };

    Ok(Margin {
        amount: round2(amount),
        percent: round2(percent),
    })
}

fn out_of_range() -> AppError {
    AppError::business("Montant hors limites")
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dec;
    use rstest::rstest;

    #[test]
    fn computes_margin_over_total_cost() {
        let margin = compute_margin(dec("200"), dec("100"), dec("20"), dec("10"), dec("5")).unwrap();
        assert_eq!(margin.amount, dec("65"));
        assert_eq!(margin.percent, dec("54.17"));
    }

    #[test]
    fn zero_cost_gives_zero_percent() {
        let margin = compute_margin(dec("80"), Decimal::ZERO, Decimal::ZERO, dec("5"), Decimal::ZERO).unwrap();
        assert_eq!(margin.amount, dec("75"));
        assert_eq!(margin.percent, Decimal::ZERO);
    }

    #[rstest]
    #[case("90", "100", "0", "-10", "-10")]
    #[case("150", "100", "50", "0", "0")]
    #[case("250.50", "150", "0", "100.50", "67")]
    fn handles_losses_and_break_even(
        #[case] price: &str,
        #[case] purchase: &str,
        #[case] refurb: &str,
        #[case] amount: &str,
        #[case] percent: &str,
    ) {
        let margin =
            compute_margin(dec(price), dec(purchase), dec(refurb), Decimal::ZERO, Decimal::ZERO).unwrap();
        assert_eq!(margin.amount, dec(amount));
        assert_eq!(margin.percent, dec(percent));
    }

    #[rstest]
    // Divisão estoura: margem enorme sobre custo de um centavo
    #[case("70000000000000000000000000000", "0.01", "0", "0")]
    // Soma das taxas estoura
    #[case("1", "1", "70000000000000000000000000000", "70000000000000000000000000000")]
    fn overflow_is_a_business_error(
        #[case] price: &str,
        #[case] purchase: &str,
        #[case] fees: &str,
        #[case] shipping: &str,
    ) {
        let err = compute_margin(dec(price), dec(purchase), Decimal::ZERO, dec(fees), dec(shipping))
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessRule(_)));
        assert_eq!(err.to_string(), "Montant hors limites");
    }

    #[test]
    fn largest_accepted_amounts_do_not_overflow() {
        let max = crate::common::validation::MAX_AMOUNT;
        let margin = compute_margin(max, dec("0.01"), Decimal::ZERO, max, max).unwrap();
        assert_eq!(margin.amount, -max - dec("0.01"));
    }
}
