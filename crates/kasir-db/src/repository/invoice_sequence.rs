//! # Invoice Sequence
//!
//! One counter row per business date. Bumping it is a single upsert, so two
//! sales can never be handed the same value, and because it runs inside the
//! sale transaction a failed sale gives its value back.
//!
//! ```text
//!   invoice_sequences
//!   ┌───────────────┬────────────┐
//!   │ business_date │ last_value │
//!   ├───────────────┼────────────┤
//!   │ 2026-01-16    │        87  │
//!   │ 2026-01-17    │        12  │ ← next sale today gets 13
//!   └───────────────┴────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{DbError, DbResult};
use kasir_core::invoice::BUSINESS_DATE_KEY_FORMAT;

/// Issues the next sequence value for `business_date` on the caller's
/// connection. Also takes SQLite's write lock for the rest of the
/// transaction.
pub async fn next_value(conn: &mut SqliteConnection, business_date: NaiveDate) -> DbResult<u32> {
    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO invoice_sequences (business_date, last_value)
        VALUES (?1, 1)
        ON CONFLICT(business_date) DO UPDATE SET last_value = last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(date_key(business_date))
    .fetch_one(conn)
    .await?;

    u32::try_from(value).map_err(|_| DbError::Internal(format!("invoice sequence overflow: {value}")))
}

/// Last value issued for `business_date`, if any sale was recorded that day.
pub async fn current_value(pool: &SqlitePool, business_date: NaiveDate) -> DbResult<Option<i64>> {
    let value: Option<i64> =
        sqlx::query_scalar("SELECT last_value FROM invoice_sequences WHERE business_date = ?1")
            .bind(date_key(business_date))
            .fetch_optional(pool)
            .await?;

    Ok(value)
}

fn date_key(business_date: NaiveDate) -> String {
    business_date.format(BUSINESS_DATE_KEY_FORMAT).to_string()
}
