//! # Stock Movement Repository
//!
//! The stock ledger. Rows are only ever inserted, always on the same
//! connection (transaction) that changed `products.stock_quantity`, so the
//! ledger and the stock level cannot disagree.
//!
//! ```text
//!   product   type  qty  before  after  reference
//!   ───────── ────  ───  ──────  ─────  ───────────────────
//!   Beras 5kg  in    24      0     24   SJ-0192 (delivery)
//!   Beras 5kg  out    2     24     22   INV-20260117-0001
//!   Beras 5kg  out    1     22     21   (Manual adjustment)
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use crate::repository::generate_id;
use kasir_core::{MovementType, StockMovement, StockMovementView};

macro_rules! movement_view_select {
    () => {
        "SELECT m.id, m.product_id, m.user_id, m.movement_type, m.quantity, \
                m.stock_before, m.stock_after, m.notes, m.reference, m.created_at, \
                p.name AS product_name, u.name AS user_name \
         FROM stock_movements m \
         JOIN products p ON p.id = m.product_id \
         JOIN users u ON u.id = m.user_id "
    };
}

/// Everything needed to write one ledger row; `stock_after` is derived.
#[derive(Debug, Clone, Copy)]
pub struct NewMovement<'a> {
    pub product_id: &'a str,
    pub user_id: &'a str,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub stock_before: i64,
    pub notes: Option<&'a str>,
    pub reference: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Writes a ledger row on the caller's connection.
pub async fn insert_movement(
    conn: &mut SqliteConnection,
    new: NewMovement<'_>,
) -> DbResult<StockMovement> {
    let movement = StockMovement {
        id: generate_id(),
        product_id: new.product_id.to_string(),
        user_id: new.user_id.to_string(),
        movement_type: new.movement_type,
        quantity: new.quantity,
        stock_before: new.stock_before,
        stock_after: new.movement_type.apply(new.stock_before, new.quantity),
        notes: new.notes.map(str::to_string),
        reference: new.reference.map(str::to_string),
        created_at: new.created_at,
    };

    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, user_id, movement_type, quantity,
            stock_before, stock_after, notes, reference, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(&movement.user_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.stock_before)
    .bind(movement.stock_after)
    .bind(&movement.notes)
    .bind(&movement.reference)
    .bind(movement.created_at)
    .execute(conn)
    .await?;

    Ok(movement)
}

/// Read side of the ledger.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Newest-first history of one product.
    pub async fn for_product(&self, product_id: &str, limit: u32) -> DbResult<Vec<StockMovementView>> {
        let rows = sqlx::query_as::<_, StockMovementView>(concat!(
            movement_view_select!(),
            "WHERE m.product_id = ?1 ORDER BY m.created_at DESC, m.rowid DESC LIMIT ?2"
        ))
        .bind(product_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Newest-first movements across all products.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<StockMovementView>> {
        let rows = sqlx::query_as::<_, StockMovementView>(concat!(
            movement_view_select!(),
            "ORDER BY m.created_at DESC, m.rowid DESC LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Movements carrying a reference, e.g. every line of one invoice.
    pub async fn by_reference(&self, reference: &str) -> DbResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, user_id, movement_type, quantity,
                   stock_before, stock_after, notes, reference, created_at
            FROM stock_movements
            WHERE reference = ?1
            ORDER BY rowid
            "#,
        )
        .bind(reference)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Total number of ledger rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_category, seed_product, seed_user, setup};
    use kasir_core::{Money, Role};

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = setup().await;
        let user = seed_user(&db, Role::WarehouseManager).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(1_000), 10).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let written = insert_movement(
            &mut conn,
            NewMovement {
                product_id: &product.id,
                user_id: &user.id,
                movement_type: MovementType::In,
                quantity: 4,
                stock_before: 10,
                notes: Some("Kiriman supplier"),
                reference: Some("SJ-0192"),
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();
        drop(conn);

        assert_eq!(written.stock_after, 14);

        let repo = db.stock_movements();
        let recent = repo.recent(5).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].product_name, product.name);
        assert_eq!(recent[0].user_name, user.name);

        let by_ref = repo.by_reference("SJ-0192").await.unwrap();
        assert_eq!(by_ref.len(), 1);
        assert_eq!(by_ref[0].id, written.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
