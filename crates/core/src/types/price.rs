//! Price arithmetic on decimal amounts.
//!
//! Prices travel as JSON numbers or strings and are held as
//! [`rust_decimal::Decimal`] so cart totals never pick up binary float error.

use rust_decimal::Decimal;

/// Price of a line: unit price times quantity.
///
/// Saturates at `Decimal::MAX` (or `MIN`) instead of overflowing.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price.saturating_mul(Decimal::from(quantity))
}

/// Sum of amounts, saturating like [`line_total`].
#[must_use]
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_is_exact() {
        let price = Decimal::new(1999, 2);
        assert_eq!(line_total(price, 3), Decimal::new(5997, 2));
    }

    #[test]
    fn test_line_total_zero_quantity() {
        assert_eq!(line_total(Decimal::new(10, 0), 0), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_saturates() {
        assert_eq!(line_total(Decimal::MAX, u32::MAX), Decimal::MAX);
        assert_eq!(line_total(Decimal::MIN, 2), Decimal::MIN);
    }

    #[test]
    fn test_sum_amounts_saturates() {
        assert_eq!(sum_amounts([Decimal::MAX, Decimal::ONE]), Decimal::MAX);
        assert_eq!(
            sum_amounts([Decimal::new(150, 2), Decimal::new(250, 2)]),
            Decimal::from(4)
        );
        assert_eq!(sum_amounts([]), Decimal::ZERO);
    }
}
