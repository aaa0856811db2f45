//! # Money Module
//!
//! Provides the `Money` type for handling Rupiah amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  PPN on Rp 33.333,33 at 11% with f64:                                   │
//! │    3666.6663 → stored as 3666.67, summed over a day → drift             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (sen, 1/100 Rupiah)                  │
//! │    3_333_333 sen × 1100 bps / 10000 = 366_666.63 → 366_667 sen          │
//! │    Rounding happens once, explicitly, in `calculate_tax`                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_rupiah(50_000);      // Rp 50.000,00
//! let line = price.multiply_quantity(2);        // Some(Rp 100.000,00)
//! assert_eq!(line.map(|m| m.minor_units()), Some(10_000_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (sen, 1/100 Rupiah).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `amount_paid - total` may be negative
///   before they are validated
/// - **Transparent**: stored as a plain INTEGER column and serialized as a
///   JSON integer
///
/// ## Where Money Flows
/// ```text
/// Product.selling_price ──► CartLine.price ──► SaleItem.subtotal
///                                                   │
///                     Sale.subtotal ◄───────────────┘
///                          │
///                          ▼
///          (subtotal − discount) × 11% ──► Sale.tax_amount ──► Sale.total_amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (sen).
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let fee = Money::from_minor(150); // Rp 1,50
    /// assert_eq!(fee.minor_units(), 150);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole Rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupiah(111_000).minor_units(), 11_100_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah * 100)
    }

    /// Returns the value in minor units (sen).
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the whole-Rupiah portion (truncated toward zero).
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the sen portion (always 0-99).
    #[inline]
    pub const fn sen_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounding half-up to the nearest sen.
    ///
    /// ## Implementation
    /// Integer math only: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5). Amounts passed here are
    /// taxable bases, which are never negative.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    /// use kasir_core::types::TaxRate;
    ///
    /// let base = Money::from_rupiah(100_000);
    /// let ppn = base.calculate_tax(TaxRate::from_bps(1100));
    /// assert_eq!(ppn, Money::from_rupiah(11_000));
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large bases cannot overflow before the division
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(tax as i64)
    }

    /// Multiplies money by a quantity, `None` if the product leaves the i64 range.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let unit = Money::from_rupiah(3_500);
    /// assert_eq!(unit.multiply_quantity(3), Some(Money::from_rupiah(10_500)));
    /// assert_eq!(Money::from_minor(i64::MAX / 2).multiply_quantity(3), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(value) => Some(Money(value)),
            None => None,
        }
    }

    /// Addition that returns `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtraction that returns `None` instead of going below zero.
    ///
    /// Used where a negative result means the input is inconsistent
    /// (a discount larger than the amount it discounts).
    #[inline]
    pub fn checked_sub_non_negative(self, other: Money) -> Option<Money> {
        let result = self.0.checked_sub(other.0)?;
        (result >= 0).then_some(Money(result))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way an Indonesian receipt does: `Rp 1.234.567,89`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}Rp {},{:02}",
            sign,
            group_thousands(self.rupiah().unsigned_abs()),
            self.sen_part()
        )
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        groups.push(value % 1000);
        value /= 1000;
        if value == 0 {
            break;
        }
    }

    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(group) = groups.pop() {
        out.push('.');
        out.push_str(&format!("{:03}", group));
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
