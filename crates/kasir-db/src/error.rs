//! # Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──┬──► CheckoutError::Persistence   (sale transaction)
//!                           ├──► AdjustmentError::Persistence (restock / write-off)
//!                           └──► ApiError                     (kasir CLI)
//! ```
//!
//! Constraint failures are told apart by SQLite's extended result code,
//! so callers can answer "that code is taken" instead of "query failed".

use kasir_core::ValidationError;
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the row: product code, category name, user
    /// email or invoice number.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A row points at a category, product or user that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK or NOT NULL rule in the schema refused the row.
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// The record is still referenced and cannot be removed.
    #[error("{entity} {id} is still in use by {dependents} record(s)")]
    InUse {
        entity: String,
        id: String,
        dependents: i64,
    },

    /// Input rejected before reaching SQL.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fills in the offending value of a UniqueViolation. SQLite only names
    /// the column.
    pub fn with_duplicate_value(self, value: impl Into<String>) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.into(),
            },
            other => other,
        }
    }

    /// True for faults of the storage itself, as opposed to rejected input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::MigrationFailed(_)
                | DbError::QueryFailed(_)
                | DbError::PoolExhausted
                | DbError::Internal(_)
        )
    }
}

/// `products.code, products.name` → `code, name`
fn unique_columns(message: &str) -> String {
    let target = message
        .strip_prefix("UNIQUE constraint failed: ")
        .unwrap_or(message);
    target
        .split(", ")
        .map(|col| col.rsplit('.').next().unwrap_or(col))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::duplicate(unique_columns(&message), "unknown"),
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        DbError::ConstraintViolation { message }
                    }
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
