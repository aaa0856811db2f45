//! # API Error Type
//!
//! What the operator sees when a command fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  ValidationError ─┐                                                     │
//! │  CoreError ───────┤                                                     │
//! │  CheckoutError ───┼──► ApiError { code, message } ──► stderr (JSON)    │
//! │  AdjustmentError ─┤                                                     │
//! │  DbError ─────────┘     infrastructure detail is logged, not shown     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::error;

use crate::config::ConfigError;
use kasir_core::{CoreError, ValidationError};
use kasir_db::{AdjustmentError, CheckoutError, DbError};

/// Error printed when a command fails.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for product Indomie Goreng: 3 available, 5 requested"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced product, sale, user or category does not exist
    NotFound,

    /// Not enough units on hand
    InsufficientStock,

    /// Amount paid is below the sale total
    InsufficientPayment,

    /// Input validation failed, including bad command-line usage
    ValidationError,

    /// The acting user's role lacks the capability
    Forbidden,

    /// Storage failed; nothing was recorded
    DatabaseError,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConstraintViolation { message } => {
                error!("Schema constraint rejected a write: {}", message);
                ApiError::validation("Rejected by a database rule")
            }
            DbError::InUse {
                entity,
                id,
                dependents,
            } => ApiError::validation(format!(
                "{} {} is still in use by {} record(s)",
                entity, id, dependents
            )),
            DbError::Invalid(e) => e.into(),
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for product {}: {} available, {} requested",
                    product, available, requested
                ),
            ),
            CoreError::InsufficientPayment { total, paid } => ApiError::new(
                ErrorCode::InsufficientPayment,
                format!("Insufficient payment: total {}, paid {}", total, paid),
            ),
            CoreError::EmptyCart => ApiError::validation("Cart is empty"),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Rejected(e) => e.into(),
            CheckoutError::Persistence(e) if e.is_infrastructure() => {
                let api: ApiError = e.into();
                ApiError::new(api.code, format!("Sale was not completed: {}", api.message))
            }
            CheckoutError::Persistence(e) => e.into(),
        }
    }
}

impl From<AdjustmentError> for ApiError {
    fn from(err: AdjustmentError) -> Self {
        match err {
            AdjustmentError::Rejected(e) => e.into(),
            AdjustmentError::Persistence(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            ApiError::validation(format!("Invalid JSON: {}", err))
        } else {
            ApiError::internal(err.to_string())
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
