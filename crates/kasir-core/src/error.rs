//! # Error Types
//!
//! ```text
//! ValidationError ──► CoreError ──► kasir_db::CheckoutError ──► ApiError (CLI)
//!   bad input          sale refused    + storage failures          {code, message}
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Why a sale (or a stock removal) was refused before anything was written.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart line names a product id the catalog does not have.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Fewer units on the shelf than the line asks for.
    ///
    /// ```text
    /// cart:  Indomie Goreng × 5
    /// shelf: 3
    ///   └──► InsufficientStock { product: "Indomie Goreng", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product name, as the cashier knows it.
        product: String,
        available: i64,
        requested: i64,
    },

    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment { total: Money, paid: Money },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A field failed its rule. Raised before any lookup or write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Malformed id, invoice number and the like.
    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The same value twice where it must be unique, e.g. one product on
    /// two cart lines.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
