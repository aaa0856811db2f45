//! # Checkout Request
//!
//! What a cashier submits to close a sale, and the input rules it must pass
//! before any stock is looked at.
//!
//! ## Request Shape
//! ```text
//! {
//!   "items": [
//!     { "productId": "…", "quantity": 2, "price": 5000000, "discount": 0 }
//!   ],
//!   "customerName": "Bu Siti",        (optional)
//!   "paymentMethod": "cash",          (cash | card | transfer | qris)
//!   "amountPaid": 12000000,
//!   "discountAmount": 0               (optional)
//! }
//! ```
//! Monetary values are integer minor units (sen). snake_case keys are
//! accepted too.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::validation::{
    validate_cart_size, validate_customer_name, validate_non_negative_amount, validate_quantity,
};

// =============================================================================
// Cart Line
// =============================================================================

/// One entry in a pending sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    #[serde(alias = "product_id")]
    pub product_id: String,
    pub quantity: i64,
    /// Unit price charged, as shown on the till.
    pub price: Money,
    /// Discount per unit.
    #[serde(default)]
    pub discount: Money,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: i64, price: Money) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
            price,
            discount: Money::zero(),
        }
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// A complete checkout as submitted by the cashier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    #[serde(default, alias = "customer_name")]
    pub customer_name: Option<String>,
    #[serde(alias = "payment_method")]
    pub payment_method: PaymentMethod,
    #[serde(alias = "amount_paid")]
    pub amount_paid: Money,
    /// Sale-level discount, taken off the subtotal before PPN.
    #[serde(default, alias = "discount_amount")]
    pub discount_amount: Money,
}

impl CheckoutRequest {
    /// Checks everything that can be checked without the catalog.
    ///
    /// ## Rules
    /// ```text
    /// items            non-empty, at most 100 lines, distinct products
    /// quantity         1..=999
    /// price, discount  >= 0, discount <= price
    /// amountPaid       >= 0
    /// discountAmount   >= 0
    /// customerName     <= 255 characters
    /// ```
    /// Whether the sale-level discount fits the subtotal is a pricing
    /// question, answered by [`crate::pricing::SaleTotals::compute`].
    pub fn validate(&self) -> CoreResult<()> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_cart_size(self.items.len())?;

        let mut seen = HashSet::with_capacity(self.items.len());
        for line in &self.items {
            if line.product_id.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "product_id".to_string(),
                }
                .into());
            }
            validate_quantity(line.quantity)?;
            validate_non_negative_amount("price", line.price)?;
            validate_non_negative_amount("discount", line.discount)?;
            if line.discount > line.price {
                return Err(ValidationError::OutOfRange {
                    field: "discount".to_string(),
                    min: 0,
                    max: line.price.minor_units(),
                }
                .into());
            }
            if !seen.insert(line.product_id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "product_id".to_string(),
                    value: line.product_id.clone(),
                }
                .into());
            }
        }

        validate_non_negative_amount("amount_paid", self.amount_paid)?;
        validate_non_negative_amount("discount_amount", self.discount_amount)?;
        validate_customer_name(self.customer_name.as_deref())?;

        Ok(())
    }

    /// Customer name with surrounding whitespace removed; blank becomes `None`.
    pub fn normalized_customer_name(&self) -> Option<String> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
