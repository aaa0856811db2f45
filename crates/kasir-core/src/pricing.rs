//! # Pricing
//!
//! Turns validated cart lines into the amounts a sale records.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  per line:  line_subtotal = quantity × (price − discount)              │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  subtotal  = Σ line_subtotal                                           │
//! │  taxable   = subtotal − discount_amount        (must stay ≥ 0)         │
//! │  tax       = taxable × 11%  (half-up to the sen)                       │
//! │  total     = taxable + tax                                             │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  change    = amount_paid − total               (must stay ≥ 0)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Worked Example
//! ```rust
//! use kasir_core::money::Money;
//! use kasir_core::pricing::{price_line, SaleTotals};
//!
//! let line = price_line(2, Money::from_rupiah(50_000), Money::zero()).unwrap();
//! let totals = SaleTotals::compute(&[line], Money::zero()).unwrap();
//!
//! assert_eq!(totals.subtotal, Money::from_rupiah(100_000));
//! assert_eq!(totals.tax, Money::from_rupiah(11_000));
//! assert_eq!(totals.total, Money::from_rupiah(111_000));
//! assert_eq!(totals.settle(Money::from_rupiah(120_000)).unwrap(), Money::from_rupiah(9_000));
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::PPN_RATE;

// =============================================================================
// Line Pricing
// =============================================================================

/// The priced form of one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub quantity: i64,
    pub price: Money,
    pub discount: Money,
    pub subtotal: Money,
}

/// Amount too large to record: any sum past `i64::MAX` sen.
fn out_of_range(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
    .into()
}

/// `quantity × (price − discount)`.
///
/// Callers guarantee `0 <= discount <= price` (see `CheckoutRequest::validate`).
/// A product that does not fit in i64 sen is a validation error.
#[inline]
pub fn line_subtotal(quantity: i64, price: Money, discount: Money) -> CoreResult<Money> {
    (price - discount)
        .multiply_quantity(quantity)
        .ok_or_else(|| out_of_range("subtotal"))
}

/// Prices a single line.
pub fn price_line(quantity: i64, price: Money, discount: Money) -> CoreResult<PricedLine> {
    Ok(PricedLine {
        quantity,
        price,
        discount,
        subtotal: line_subtotal(quantity, price, discount)?,
    })
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Header amounts of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Sums the lines and applies the sale-level discount and PPN.
    ///
    /// ## Errors
    /// A discount larger than the subtotal is a validation error: the taxable
    /// base, and with it the total, would go negative. So is a subtotal or
    /// total past `i64::MAX` sen.
    pub fn compute(lines: &[PricedLine], discount: Money) -> CoreResult<SaleTotals> {
        let subtotal = lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.subtotal))
            .ok_or_else(|| out_of_range("subtotal"))?;

        let taxable = subtotal.checked_sub_non_negative(discount).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "discount_amount".to_string(),
                min: 0,
                max: subtotal.minor_units(),
            }
        })?;

        let tax = taxable.calculate_tax(PPN_RATE);
        let total = taxable
            .checked_add(tax)
            .ok_or_else(|| out_of_range("total_amount"))?;

        Ok(SaleTotals {
            subtotal,
            discount,
            tax,
            total,
        })
    }

    /// Checks the payment covers the total and returns the change due.
    pub fn settle(&self, amount_paid: Money) -> CoreResult<Money> {
        amount_paid
            .checked_sub_non_negative(self.total)
            .ok_or(CoreError::InsufficientPayment {
                total: self.total,
                paid: amount_paid,
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_applies_per_unit_discount() {
        // 3 × (Rp 10.000 − Rp 1.500) = Rp 25.500
        let sub = line_subtotal(3, Money::from_rupiah(10_000), Money::from_rupiah(1_500)).unwrap();
        assert_eq!(sub, Money::from_rupiah(25_500));
    }

    #[test]
    fn test_totals_with_sale_discount() {
        let lines = [
            price_line(2, Money::from_rupiah(50_000), Money::zero()).unwrap(),
            price_line(1, Money::from_rupiah(20_000), Money::zero()).unwrap(),
        ];
        // subtotal 120.000, discount 20.000 → taxable 100.000, PPN 11.000
        let totals = SaleTotals::compute(&lines, Money::from_rupiah(20_000)).unwrap();
        assert_eq!(totals.subtotal, Money::from_rupiah(120_000));
        assert_eq!(totals.discount, Money::from_rupiah(20_000));
        assert_eq!(totals.tax, Money::from_rupiah(11_000));
        assert_eq!(totals.total, Money::from_rupiah(111_000));
        assert_eq!(totals.total, totals.subtotal - totals.discount + totals.tax);
    }

    #[test]
    fn test_tax_rounds_to_nearest_sen() {
        // Rp 3.333,33 × 11% = Rp 366,6663 → Rp 366,67
        let lines = [price_line(1, Money::from_minor(333_333), Money::zero()).unwrap()];
        let totals = SaleTotals::compute(&lines, Money::zero()).unwrap();
        assert_eq!(totals.tax, Money::from_minor(36_667));
    }

    #[test]
    fn test_discount_above_subtotal_rejected() {
        let lines = [price_line(1, Money::from_rupiah(5_000), Money::zero()).unwrap()];
        let err = SaleTotals::compute(&lines, Money::from_rupiah(5_001)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_discount_equal_to_subtotal_gives_free_sale() {
        let lines = [price_line(1, Money::from_rupiah(5_000), Money::zero()).unwrap()];
        let totals = SaleTotals::compute(&lines, Money::from_rupiah(5_000)).unwrap();
        assert_eq!(totals.total, Money::zero());
        assert_eq!(totals.settle(Money::zero()).unwrap(), Money::zero());
    }

    #[test]
    fn test_settle_exact_and_short() {
        let lines = [price_line(2, Money::from_rupiah(50_000), Money::zero()).unwrap()];
        let totals = SaleTotals::compute(&lines, Money::zero()).unwrap();

        assert_eq!(totals.settle(Money::from_rupiah(111_000)).unwrap(), Money::zero());
        assert!(matches!(
            totals.settle(Money::from_rupiah(100_000)),
            Err(CoreError::InsufficientPayment { .. })
        ));
    }

    #[test]
    fn test_line_overflow_is_rejected() {
        // 4 × (2^62 + 250) sen does not fit in i64
        let err = price_line(4, Money::from_minor((1 << 62) + 250), Money::zero()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "subtotal"
        ));
    }

    #[test]
    fn test_subtotal_overflow_across_lines_is_rejected() {
        let half = Money::from_minor(i64::MAX / 2 + 1);
        let lines = [
            price_line(1, half, Money::zero()).unwrap(),
            price_line(1, half, Money::zero()).unwrap(),
        ];
        let err = SaleTotals::compute(&lines, Money::zero()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_total_overflow_after_tax_is_rejected() {
        // fits as a subtotal, but adding 11% PPN does not
        let lines = [price_line(1, Money::from_minor(i64::MAX - 10), Money::zero()).unwrap()];
        let err = SaleTotals::compute(&lines, Money::zero()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "total_amount"
        ));
    }
}
