//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with validation and duplicate-code reporting
//! - Filtered, paginated catalog listing
//! - POS and low-stock listings
//! - Stock reads and conditional stock writes inside a caller's transaction
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, subtract in Rust, write back                          │
//! │     SELECT stock_quantity ...; UPDATE products SET stock_quantity = 7   │
//! │     (two tills read 10, both write 7, one sale vanishes)               │
//! │                                                                         │
//! │  ✅ CORRECT: guarded delta in one statement                            │
//! │     UPDATE products SET stock_quantity = stock_quantity - 3            │
//! │     WHERE id = ? AND stock_quantity >= 3                               │
//! │     RETURNING stock_quantity                                           │
//! │                                                                         │
//! │  No row back → someone else took the stock first.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use crate::repository::stock_movement::{insert_movement, NewMovement};
use kasir_core::catalog::{Page, PageRequest, ProductFilter, ProductInput};
use kasir_core::{CatalogProduct, CatalogStatus, MovementType, Product, MANUAL_ADJUSTMENT_NOTE};

macro_rules! product_columns {
    () => {
        "p.id, p.code, p.name, p.description, p.category_id, \
         p.purchase_price, p.selling_price, p.stock_quantity, p.min_stock_level, \
         p.unit, p.status, p.created_at, p.updated_at"
    };
}

macro_rules! catalog_select {
    () => {
        concat!(
            "SELECT ",
            product_columns!(),
            ", c.name AS category_name, \
             (p.stock_quantity <= p.min_stock_level) AS is_low_stock \
             FROM products p LEFT JOIN categories c ON c.id = p.category_id "
        )
    };
}

/// Shared WHERE clause of the filtered listing and its count.
/// ?1 search pattern, ?2 category id, ?3 status, ?4 low-stock flag.
macro_rules! catalog_filter {
    () => {
        "WHERE (?1 IS NULL OR p.code LIKE ?1 ESCAPE '\\' OR p.name LIKE ?1 ESCAPE '\\') \
         AND (?2 IS NULL OR p.category_id = ?2) \
         AND (?3 IS NULL OR p.status = ?3) \
         AND (?4 = 0 OR p.stock_quantity <= p.min_stock_level) "
    };
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = repo.list(&ProductFilter::default(), PageRequest::default()).await?;
/// let product = repo.get_by_code("BRG-001").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products p WHERE p.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its code (shelf label / barcode).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(concat!(
            "SELECT ",
            product_columns!(),
            " FROM products p WHERE p.code = ?1"
        ))
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::Invalid)` - input failed validation
    /// * `Err(DbError::UniqueViolation)` - code already exists
    /// * `Err(DbError::ForeignKeyViolation)` - unknown category
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        input.validate()?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            category_id: input.category_id.clone(),
            purchase_price: input.purchase_price,
            selling_price: input.selling_price,
            stock_quantity: input.stock_quantity,
            min_stock_level: input.min_stock_level,
            unit: input.unit.trim().to_string(),
            status: input.status,
            created_at: now,
            updated_at: now,
        };

        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, description, category_id,
                purchase_price, selling_price, stock_quantity, min_stock_level,
                unit, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.purchase_price)
        .bind(product.selling_price)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(&product.unit)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&product.code))?;

        Ok(product)
    }

    /// Replaces every editable field of a product.
    ///
    /// When `stock_quantity` changes, a `Manual adjustment` movement
    /// attributed to `acting_user_id` is written in the same transaction.
    pub async fn update(
        &self,
        id: &str,
        input: &ProductInput,
        acting_user_id: &str,
    ) -> DbResult<Product> {
        input.validate()?;

        debug!(id = %id, "Updating product");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        // The UPDATE comes first so the write lock is held before the old
        // stock level is read back for the ledger.
        let before: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                description = ?4,
                category_id = ?5,
                purchase_price = ?6,
                selling_price = ?7,
                min_stock_level = ?8,
                unit = ?9,
                status = ?10,
                updated_at = ?11
            WHERE id = ?1
            RETURNING stock_quantity
            "#,
        )
        .bind(id)
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.category_id)
        .bind(input.purchase_price)
        .bind(input.selling_price)
        .bind(input.min_stock_level)
        .bind(input.unit.trim())
        .bind(input.status)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(input.code.trim()))?;

        let before = before.ok_or_else(|| DbError::not_found("Product", id))?;

        if let Some((movement_type, quantity)) = MovementType::between(before, input.stock_quantity) {
            sqlx::query("UPDATE products SET stock_quantity = ?2 WHERE id = ?1")
                .bind(id)
                .bind(input.stock_quantity)
                .execute(&mut *tx)
                .await?;

            insert_movement(
                &mut tx,
                NewMovement {
                    product_id: id,
                    user_id: acting_user_id,
                    movement_type,
                    quantity,
                    stock_before: before,
                    notes: Some(MANUAL_ADJUSTMENT_NOTE),
                    reference: None,
                    created_at: now,
                },
            )
            .await?;
        }

        let product = fetch_product(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;

        Ok(product)
    }

    /// Soft-deletes a product by marking it inactive.
    ///
    /// Sales and movements keep referencing it, so rows are never removed.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(CatalogStatus::Inactive)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Filtered, paginated catalog listing ordered by name.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> DbResult<Page<CatalogProduct>> {
        let filter = filter.clone().normalized()?;
        let pattern = filter.search_pattern();

        debug!(search = ?filter.search, page = page.page, "Listing products");

        let total: i64 = sqlx::query_scalar(concat!(
            "SELECT COUNT(*) FROM products p ",
            catalog_filter!()
        ))
        .bind(&pattern)
        .bind(&filter.category_id)
        .bind(filter.status)
        .bind(filter.low_stock)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, CatalogProduct>(concat!(
            catalog_select!(),
            catalog_filter!(),
            "ORDER BY p.name, p.code LIMIT ?5 OFFSET ?6"
        ))
        .bind(&pattern)
        .bind(&filter.category_id)
        .bind(filter.status)
        .bind(filter.low_stock)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, page, total))
    }

    /// Products a cashier can ring up: active and in stock, by name.
    pub async fn list_for_pos(&self) -> DbResult<Vec<CatalogProduct>> {
        let products = sqlx::query_as::<_, CatalogProduct>(concat!(
            catalog_select!(),
            "WHERE p.status = 'active' AND p.stock_quantity > 0 ORDER BY p.name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products at or below their threshold, emptiest first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<CatalogProduct>> {
        let products = sqlx::query_as::<_, CatalogProduct>(concat!(
            catalog_select!(),
            "WHERE p.status = 'active' AND p.stock_quantity <= p.min_stock_level \
             ORDER BY p.stock_quantity, p.name LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts active products.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction-scoped operations
// =============================================================================

/// Reads a product on the caller's connection (usually a transaction).
pub async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(concat!(
        "SELECT ",
        product_columns!(),
        " FROM products p WHERE p.id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

/// Takes `quantity` units if at least that many are on hand.
///
/// ## Returns
/// * `Some(stock_after)` - units taken
/// * `None` - product missing or short of stock; nothing changed
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    let after: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?2,
            updated_at = ?3
        WHERE id = ?1 AND stock_quantity >= ?2
        RETURNING stock_quantity
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .fetch_optional(conn)
    .await?;

    Ok(after)
}

/// Adds `quantity` units. `None` when the product does not exist.
pub async fn add_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<Option<i64>> {
    let after: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity + ?2,
            updated_at = ?3
        WHERE id = ?1
        RETURNING stock_quantity
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .fetch_optional(conn)
    .await?;

    Ok(after)
}

// =============================================================================
// Unit Tests
// =============================================================================
