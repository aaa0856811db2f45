//! # Validation Module
//!
//! Field-level rules shared by catalog maintenance and checkout.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request decoding (serde)                                     │
//! │  ├── Types, enum names (paymentMethod must be cash/card/...)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, ranges, required fields                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (code, invoice_number, email)                              │
//! │  ├── CHECK (stock_quantity >= 0)                                       │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_ADJUSTMENT_QUANTITY, MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_STOCK_LEVEL};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest value accepted for names, codes and other short text columns.
pub const MAX_TEXT_LEN: usize = 255;

/// Longest unit label.
pub const MAX_UNIT_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field: non-blank after trimming, at most `max`
/// characters.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_required_text;
///
/// assert!(validate_required_text("name", "Gula Pasir 1kg", 255).is_ok());
/// assert!(validate_required_text("name", "   ", 255).is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_max_len(field, value, max)
}

/// Validates an optional text field's length. Blank is fine.
pub fn validate_optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) => validate_max_len(field, v.trim(), max),
        None => Ok(()),
    }
}

fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 255 characters
///
/// Uniqueness is left to the database's UNIQUE index.
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    validate_required_text("code", code, MAX_TEXT_LEN)
}

/// Validates a product or category name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_TEXT_LEN)
}

/// Validates a unit label ("pcs", "kg").
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    validate_required_text("unit", unit, MAX_UNIT_LEN)
}

/// Validates the optional customer name on a sale.
pub fn validate_customer_name(name: Option<&str>) -> ValidationResult<()> {
    validate_optional_text("customer_name", name, MAX_TEXT_LEN)
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query, or `None` when blank (no filtering).
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    validate_max_len("search", query, MAX_TEXT_LEN)?;

    Ok((!query.is_empty()).then(|| query.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart-line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount that may be zero but never negative
/// (prices, discounts, payments).
///
/// ## Example
/// ```rust
/// use kasir_core::money::Money;
/// use kasir_core::validation::validate_non_negative_amount;
///
/// assert!(validate_non_negative_amount("price", Money::zero()).is_ok());
/// assert!(validate_non_negative_amount("price", Money::from_minor(-1)).is_err());
/// ```
pub fn validate_non_negative_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock count or threshold (zero allowed).
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_LEVEL).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK_LEVEL,
        });
    }

    Ok(())
}

/// Validates the quantity of a restock or write-off.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed MAX_ADJUSTMENT_QUANTITY (100.000)
pub fn validate_adjustment_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ADJUSTMENT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ADJUSTMENT_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of lines in a checkout.
///
/// ## Rules
/// - At least one line
/// - At most MAX_CART_ITEMS (100)
pub fn validate_cart_size(lines: usize) -> ValidationResult<()> {
    if lines > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_uuid;
///
/// assert!(validate_uuid("product_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("product_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
