use rust_decimal::{Decimal, RoundingStrategy};

/// Final money figures for an order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub discount_total: Decimal,
    pub tax: Decimal,
    pub total_price: Decimal,
}

/// Service for calculating order prices and totals
pub struct PriceCalculator;

impl PriceCalculator {
    /// Calculate subtotal for an order line
    pub fn calculate_subtotal(quantity: i32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    /// Calculate the pre-discount order total from line subtotals
    pub fn calculate_total(subtotals: &[Decimal]) -> Decimal {
        subtotals.iter().sum()
    }

    /// Assemble the final money figures
    ///
    /// The payable amount is clamped at zero before tax, tax is applied to
    /// the payable amount, and the single whole-rupee rounding happens here
    /// and nowhere else. Intermediate amounts stay unrounded.
    pub fn assemble_totals(
        subtotal: Decimal,
        discount_total: Decimal,
        tax_percent: Decimal,
    ) -> OrderTotals {
        let payable = (subtotal - discount_total).max(Decimal::ZERO);
        let tax = payable * tax_percent / Decimal::from(100);
        let total_price =
            (payable + tax).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        OrderTotals {
            discount_total,
            tax,
            total_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_subtotal_basic() {
        let subtotal = PriceCalculator::calculate_subtotal(3, dec!(40));
        assert_eq!(subtotal, dec!(120));
    }

    #[test]
    fn test_calculate_subtotal_single_item() {
        let subtotal = PriceCalculator::calculate_subtotal(1, dec!(99.50));
        assert_eq!(subtotal, dec!(99.50));
    }

    #[test]
    fn test_calculate_total_multiple_lines() {
        let subtotals = vec![dec!(120), dec!(250.50), dec!(80)];
        assert_eq!(PriceCalculator::calculate_total(&subtotals), dec!(450.50));
    }

    #[test]
    fn test_calculate_total_empty() {
        let subtotals: Vec<Decimal> = vec![];
        assert_eq!(PriceCalculator::calculate_total(&subtotals), dec!(0));
    }

    #[test]
    fn test_assemble_totals_no_discount() {
        let totals = PriceCalculator::assemble_totals(dec!(1000), dec!(0), dec!(18));
        assert_eq!(totals.tax, dec!(180));
        assert_eq!(totals.total_price, dec!(1180));
    }

    #[test]
    fn test_assemble_totals_with_discount() {
        // 1000 - 150 = 850 payable, 18% tax = 153, total 1003
        let totals = PriceCalculator::assemble_totals(dec!(1000), dec!(150), dec!(18));
        assert_eq!(totals.tax, dec!(153));
        assert_eq!(totals.total_price, dec!(1003));
    }

    #[test]
    fn test_payable_clamped_at_zero() {
        // Discounts exceeding the subtotal never produce a negative total
        let totals = PriceCalculator::assemble_totals(dec!(100), dec!(250), dec!(18));
        assert_eq!(totals.tax, dec!(0));
        assert_eq!(totals.total_price, dec!(0));
    }

    #[test]
    fn test_single_rounding_midpoint_away_from_zero() {
        // 333 - 0 payable, 18% tax = 59.94, total 392.94 rounds to 393
        let totals = PriceCalculator::assemble_totals(dec!(333), dec!(0), dec!(18));
        assert_eq!(totals.total_price, dec!(393));

        // Midpoint rounds away from zero: 212.50 -> 213
        let totals = PriceCalculator::assemble_totals(dec!(212.50), dec!(0), dec!(0));
        assert_eq!(totals.total_price, dec!(213));
    }

    #[test]
    fn test_tax_on_discounted_amount_not_subtotal() {
        let totals = PriceCalculator::assemble_totals(dec!(500), dec!(100), dec!(10));
        // Tax on 400, not 500
        assert_eq!(totals.tax, dec!(40));
        assert_eq!(totals.total_price, dec!(440));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Subtotal = quantity * unit price for all valid inputs
    #[test]
    fn prop_subtotal_calculation_invariant() {
        proptest!(|(
            quantity in 1i32..=1000,
            price_cents in 1u32..=100000u32
        )| {
            let price = Decimal::from(price_cents) / Decimal::from(100);
            let subtotal = PriceCalculator::calculate_subtotal(quantity, price);
            prop_assert_eq!(subtotal, Decimal::from(quantity) * price);
        });
    }

    /// Total = sum of subtotals
    #[test]
    fn prop_total_calculation_invariant() {
        proptest!(|(
            subtotals_cents in prop::collection::vec(1u32..=100000u32, 1..=20)
        )| {
            let subtotals: Vec<Decimal> = subtotals_cents
                .iter()
                .map(|&cents| Decimal::from(cents) / Decimal::from(100))
                .collect();

            let total = PriceCalculator::calculate_total(&subtotals);
            let expected: Decimal = subtotals.iter().sum();
            prop_assert_eq!(total, expected);
        });
    }

    /// Final price is never negative regardless of discount size
    #[test]
    fn prop_final_price_non_negative() {
        proptest!(|(
            subtotal_cents in 0u32..=1000000u32,
            discount_cents in 0u32..=2000000u32,
            tax_percent in 0u32..=40u32
        )| {
            let subtotal = Decimal::from(subtotal_cents) / Decimal::from(100);
            let discount = Decimal::from(discount_cents) / Decimal::from(100);
            let totals = PriceCalculator::assemble_totals(
                subtotal,
                discount,
                Decimal::from(tax_percent),
            );
            prop_assert!(totals.total_price >= Decimal::ZERO);
            prop_assert!(totals.tax >= Decimal::ZERO);
        });
    }

    /// The rounded total carries no fractional part
    #[test]
    fn prop_total_is_whole() {
        proptest!(|(
            subtotal_cents in 0u32..=1000000u32,
            discount_cents in 0u32..=1000000u32,
            tax_percent in 0u32..=40u32
        )| {
            let subtotal = Decimal::from(subtotal_cents) / Decimal::from(100);
            let discount = Decimal::from(discount_cents) / Decimal::from(100);
            let totals = PriceCalculator::assemble_totals(
                subtotal,
                discount,
                Decimal::from(tax_percent),
            );
            prop_assert_eq!(totals.total_price, totals.total_price.trunc());
        });
    }
}
