//! # Sale Repository
//!
//! Reads of recorded sales, plus the two inserts the sale processor runs
//! inside its transaction.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleProcessor::process (one transaction)                              │
//! │     ├── insert_sale()  → Sale { status: Completed }                    │
//! │     └── insert_item()  → SaleItem × n (line_no 1..n)                   │
//! │                                                                         │
//! │  Afterwards, read-only:                                                │
//! │     get_by_id() / get_by_invoice() → SaleReceipt                       │
//! │     recent()                       → SaleOverview × n                  │
//! │                                                                         │
//! │  (refunded / partial_refund exist as states; nothing writes them yet)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use kasir_core::{Sale, SaleItem, SaleOverview, SaleReceipt};

macro_rules! sale_columns {
    () => {
        "s.id, s.invoice_number, s.cashier_id, s.customer_name, \
         s.subtotal, s.discount_amount, s.tax_amount, s.total_amount, \
         s.payment_method, s.amount_paid, s.change_amount, s.status, \
         s.business_date, s.created_at, s.updated_at"
    };
}

/// Writes the sale header on the caller's connection.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, invoice_number, cashier_id, customer_name,
            subtotal, discount_amount, tax_amount, total_amount,
            payment_method, amount_paid, change_amount, status,
            business_date, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.invoice_number)
    .bind(&sale.cashier_id)
    .bind(&sale.customer_name)
    .bind(sale.subtotal)
    .bind(sale.discount_amount)
    .bind(sale.tax_amount)
    .bind(sale.total_amount)
    .bind(sale.payment_method)
    .bind(sale.amount_paid)
    .bind(sale.change_amount)
    .bind(sale.status)
    .bind(sale.business_date)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Writes one sale line on the caller's connection.
pub async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, line_no, product_name,
            price, quantity, discount_amount, subtotal, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(item.line_no)
    .bind(&item.product_name)
    .bind(item.price)
    .bind(item.quantity)
    .bind(item.discount_amount)
    .bind(item.subtotal)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Repository for sale lookups.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale and its lines by sale ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleReceipt>> {
        let sale = sqlx::query_as::<_, Sale>(concat!(
            "SELECT ",
            sale_columns!(),
            " FROM sales s WHERE s.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_items(sale).await
    }

    /// Gets a sale and its lines by invoice number.
    pub async fn get_by_invoice(&self, invoice_number: &str) -> DbResult<Option<SaleReceipt>> {
        let sale = sqlx::query_as::<_, Sale>(concat!(
            "SELECT ",
            sale_columns!(),
            " FROM sales s WHERE s.invoice_number = ?1"
        ))
        .bind(invoice_number.trim())
        .fetch_optional(&self.pool)
        .await?;

        self.with_items(sale).await
    }

    async fn with_items(&self, sale: Option<Sale>) -> DbResult<Option<SaleReceipt>> {
        match sale {
            Some(sale) => {
                let items = self.get_items(&sale.id).await?;
                Ok(Some(SaleReceipt { sale, items }))
            }
            None => Ok(None),
        }
    }

    /// Gets the lines of a sale in cart order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, line_no, product_name,
                   price, quantity, discount_amount, subtotal, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Newest-first sales with cashier name and line count.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<SaleOverview>> {
        let sales = sqlx::query_as::<_, SaleOverview>(concat!(
            "SELECT ",
            sale_columns!(),
            ", u.name AS cashier_name, \
               (SELECT COUNT(*) FROM sale_items i WHERE i.sale_id = s.id) AS item_count \
             FROM sales s JOIN users u ON u.id = s.cashier_id \
             ORDER BY s.created_at DESC, s.rowid DESC LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Total number of recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{seed_category, seed_product, seed_user, setup};
    use kasir_core::{CartLine, CheckoutRequest, Money, PaymentMethod, Role};

    #[tokio::test]
    async fn test_lookups_and_recent() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Minuman").await;
        let teh = seed_product(&db, &category.id, "TEH", Money::from_rupiah(4_000), 50).await;
        let air = seed_product(&db, &category.id, "AIR", Money::from_rupiah(3_000), 50).await;

        let first = CheckoutRequest {
            items: vec![
                CartLine::new(&teh.id, 2, Money::from_rupiah(4_000)),
                CartLine::new(&air.id, 1, Money::from_rupiah(3_000)),
            ],
            customer_name: None,
            payment_method: PaymentMethod::Cash,
            amount_paid: Money::from_rupiah(20_000),
            discount_amount: Money::zero(),
        };
        let first = db.checkout().process(&first, &cashier.id).await.unwrap();

        let second = CheckoutRequest {
            items: vec![CartLine::new(&air.id, 1, Money::from_rupiah(3_000))],
            customer_name: None,
            payment_method: PaymentMethod::Transfer,
            amount_paid: Money::from_rupiah(3_330),
            discount_amount: Money::zero(),
        };
        let second = db.checkout().process(&second, &cashier.id).await.unwrap();

        let repo = db.sales();
        let padded = format!("  {}\n", first.sale.invoice_number);
        let found = repo.get_by_invoice(&padded).await.unwrap().unwrap();
        assert_eq!(found.sale.id, first.sale.id);
        let names: Vec<_> = found.items.iter().map(|i| i.product_name.as_str()).collect();
        assert_eq!(names, ["Produk TEH", "Produk AIR"]);

        assert!(repo.get_by_id(&second.sale.id).await.unwrap().is_some());
        assert!(repo.get_by_id("missing").await.unwrap().is_none());

        let recent = repo.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sale.id, second.sale.id);
        assert_eq!(recent[0].item_count, 1);
        assert_eq!(recent[1].item_count, 2);
        assert_eq!(recent[1].cashier_name, "Kasir");
        assert_eq!(repo.recent(1).await.unwrap().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
