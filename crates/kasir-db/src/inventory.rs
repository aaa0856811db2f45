//! # Inventory Adjustments
//!
//! Stock changes that are not sales: deliveries coming in and damaged or
//! expired goods going out. Each one moves the stock level and writes its
//! ledger row in the same transaction.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbError;
use crate::repository::product::{add_stock, fetch_product, reserve_stock};
use crate::repository::stock_movement::{insert_movement, NewMovement};
use kasir_core::validation::{validate_adjustment_quantity, validate_optional_text, MAX_TEXT_LEN};
use kasir_core::{CoreError, MovementType, Product, StockMovement};

/// The product as it stands after an adjustment, and the ledger row written.
#[derive(Debug, Clone, Serialize)]
pub struct StockAdjustment {
    pub product: Product,
    pub movement: StockMovement,
}

/// Why an adjustment was refused. Nothing changed in either case.
#[derive(Debug, thiserror::Error)]
pub enum AdjustmentError {
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl From<sqlx::Error> for AdjustmentError {
    fn from(err: sqlx::Error) -> Self {
        AdjustmentError::Persistence(DbError::from(err))
    }
}

#[derive(Debug, Clone)]
pub struct InventoryService {
    pool: SqlitePool,
}

impl InventoryService {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryService { pool }
    }

    /// Adds `quantity` units, e.g. a supplier delivery.
    pub async fn restock(
        &self,
        product_id: &str,
        quantity: i64,
        user_id: &str,
        notes: Option<&str>,
        reference: Option<&str>,
    ) -> Result<StockAdjustment, AdjustmentError> {
        validate_adjustment_quantity(quantity).map_err(DbError::from)?;
        validate_optional_text("notes", notes, MAX_TEXT_LEN).map_err(DbError::from)?;
        validate_optional_text("reference", reference, MAX_TEXT_LEN).map_err(DbError::from)?;

        debug!(product = %product_id, quantity, "Restocking");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let after = add_stock(&mut tx, product_id, quantity, now)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        let movement = insert_movement(
            &mut tx,
            NewMovement {
                product_id,
                user_id,
                movement_type: MovementType::In,
                quantity,
                stock_before: after - quantity,
                notes,
                reference,
                created_at: now,
            },
        )
        .await?;

        let product = fetch_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        tx.commit().await?;

        info!(product = %product.code, quantity, stock = after, "Stock received");

        Ok(StockAdjustment { product, movement })
    }

    /// Removes `quantity` units, e.g. damaged or expired goods. Refused when
    /// fewer than `quantity` are on hand.
    pub async fn write_off(
        &self,
        product_id: &str,
        quantity: i64,
        user_id: &str,
        notes: Option<&str>,
        reference: Option<&str>,
    ) -> Result<StockAdjustment, AdjustmentError> {
        validate_adjustment_quantity(quantity).map_err(DbError::from)?;
        validate_optional_text("notes", notes, MAX_TEXT_LEN).map_err(DbError::from)?;
        validate_optional_text("reference", reference, MAX_TEXT_LEN).map_err(DbError::from)?;

        debug!(product = %product_id, quantity, "Writing off stock");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let after = match reserve_stock(&mut tx, product_id, quantity, now).await? {
            Some(after) => after,
            None => {
                let product = fetch_product(&mut tx, product_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", product_id))?;
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock_quantity,
                    requested: quantity,
                }
                .into());
            }
        };

        let movement = insert_movement(
            &mut tx,
            NewMovement {
                product_id,
                user_id,
                movement_type: MovementType::Out,
                quantity,
                stock_before: after + quantity,
                notes,
                reference,
                created_at: now,
            },
        )
        .await?;

        let product = fetch_product(&mut tx, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        tx.commit().await?;

        info!(product = %product.code, quantity, stock = after, "Stock written off");

        Ok(StockAdjustment { product, movement })
    }
}
