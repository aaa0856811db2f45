//! # Sale Transaction Processor
//!
//! Turns a validated cart into a recorded sale in one SQLite transaction:
//! the sale header, its lines, the stock decrements and their ledger rows
//! all commit together or not at all.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutRequest                                                       │
//! │       │ validate()                       → InvalidRequest              │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │       │ invoice_sequences upsert         (first write: takes the lock) │
//! │       │ cashier exists?                  → NotFound                    │
//! │       │ per line: product exists?        → NotFound                    │
//! │       │           stock ≥ quantity?      → InsufficientStock           │
//! │       │ price lines, totals, settle      → InsufficientPayment         │
//! │       │ INSERT sales                                                   │
//! │       │ INSERT sale_items × n                                          │
//! │       │ per line: conditional decrement  → InsufficientStock           │
//! │       │           INSERT stock_movements (out, reference = invoice)    │
//! │       ▼                                                                 │
//! │  COMMIT  → SaleReceipt                                                 │
//! │                                                                         │
//! │  Any error: the transaction is dropped and SQLite rolls it back,       │
//! │  counter bump included.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local, TimeZone, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::DbError;
use crate::repository::generate_id;
use crate::repository::invoice_sequence;
use crate::repository::product::{fetch_product, reserve_stock};
use crate::repository::sale::{insert_item, insert_sale};
use crate::repository::stock_movement::{insert_movement, NewMovement};
use kasir_core::pricing::price_line;
use kasir_core::{
    CheckoutRequest, CoreError, CoreResult, InvoiceNumber, MovementType, Product, Sale, SaleItem,
    SaleReceipt, SaleStatus, SaleTotals, SALE_MOVEMENT_NOTE,
};

// =============================================================================
// Errors
// =============================================================================

/// Why a sale was not recorded. Nothing was persisted in either case.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request broke a business rule.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Storage refused or failed.
    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Persistence(DbError::from(err))
    }
}

/// The failure taxonomy the operator sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutErrorKind {
    NotFound,
    InsufficientStock,
    InsufficientPayment,
    InvalidRequest,
    PersistenceFailure,
}

impl CheckoutError {
    pub fn kind(&self) -> CheckoutErrorKind {
        match self {
            CheckoutError::Rejected(CoreError::ProductNotFound(_)) => CheckoutErrorKind::NotFound,
            CheckoutError::Rejected(CoreError::InsufficientStock { .. }) => {
                CheckoutErrorKind::InsufficientStock
            }
            CheckoutError::Rejected(CoreError::InsufficientPayment { .. }) => {
                CheckoutErrorKind::InsufficientPayment
            }
            CheckoutError::Rejected(CoreError::EmptyCart | CoreError::Validation(_)) => {
                CheckoutErrorKind::InvalidRequest
            }
            CheckoutError::Persistence(DbError::NotFound { .. }) => CheckoutErrorKind::NotFound,
            CheckoutError::Persistence(DbError::Invalid(_)) => CheckoutErrorKind::InvalidRequest,
            CheckoutError::Persistence(_) => CheckoutErrorKind::PersistenceFailure,
        }
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Processor
// =============================================================================

/// Records sales.
///
/// ## Usage
/// ```rust,ignore
/// let receipt = db.checkout().process(&request, &cashier.id).await?;
/// println!("{} {}", receipt.sale.invoice_number, receipt.sale.change_amount);
/// ```
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    pool: SqlitePool,
}

impl SaleProcessor {
    pub fn new(pool: SqlitePool) -> Self {
        SaleProcessor { pool }
    }

    /// Records a sale booked on today's server-local date.
    pub async fn process(
        &self,
        request: &CheckoutRequest,
        cashier_id: &str,
    ) -> CheckoutResult<SaleReceipt> {
        self.process_at(request, cashier_id, Local::now()).await
    }

    /// Records a sale as of `now`; the business date is `now`'s calendar
    /// date in its own timezone.
    pub async fn process_at<Tz: TimeZone>(
        &self,
        request: &CheckoutRequest,
        cashier_id: &str,
        now: DateTime<Tz>,
    ) -> CheckoutResult<SaleReceipt> {
        let business_date = now.date_naive();
        let created_at = now.with_timezone(&Utc);

        let result = self.record(request, cashier_id, business_date, created_at).await;

        match &result {
            Ok(receipt) => info!(
                invoice = %receipt.sale.invoice_number,
                cashier = %cashier_id,
                lines = receipt.items.len(),
                total = %receipt.sale.total_amount,
                "Sale recorded"
            ),
            Err(err) if err.kind() == CheckoutErrorKind::PersistenceFailure => {
                error!(cashier = %cashier_id, error = %err, "Sale failed to persist")
            }
            Err(err) => warn!(
                cashier = %cashier_id,
                kind = ?err.kind(),
                reason = %err,
                "Sale rejected"
            ),
        }

        result
    }

    async fn record(
        &self,
        request: &CheckoutRequest,
        cashier_id: &str,
        business_date: chrono::NaiveDate,
        created_at: DateTime<Utc>,
    ) -> CheckoutResult<SaleReceipt> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let sequence = invoice_sequence::next_value(&mut tx, business_date).await?;
        let invoice_number = InvoiceNumber::new(business_date, sequence).to_string();

        ensure_cashier(&mut tx, cashier_id).await?;

        let mut products: Vec<Product> = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if !product.can_sell(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock_quantity,
                    requested: line.quantity,
                }
                .into());
            }
            products.push(product);
        }

        let priced = request
            .items
            .iter()
            .map(|line| price_line(line.quantity, line.price, line.discount))
            .collect::<CoreResult<Vec<_>>>()?;
        let totals = SaleTotals::compute(&priced, request.discount_amount)?;
        let change = totals.settle(request.amount_paid)?;

        let sale = Sale {
            id: generate_id(),
            invoice_number,
            cashier_id: cashier_id.to_string(),
            customer_name: request.normalized_customer_name(),
            subtotal: totals.subtotal,
            discount_amount: totals.discount,
            tax_amount: totals.tax,
            total_amount: totals.total,
            payment_method: request.payment_method,
            amount_paid: request.amount_paid,
            change_amount: change,
            status: SaleStatus::Completed,
            business_date,
            created_at,
            updated_at: created_at,
        };
        insert_sale(&mut tx, &sale).await?;

        let mut items = Vec::with_capacity(request.items.len());
        for (index, ((line, product), priced)) in
            request.items.iter().zip(&products).zip(&priced).enumerate()
        {
            let item = SaleItem {
                id: generate_id(),
                sale_id: sale.id.clone(),
                product_id: product.id.clone(),
                line_no: index as i64 + 1,
                product_name: product.name.clone(),
                price: line.price,
                quantity: line.quantity,
                discount_amount: line.discount,
                subtotal: priced.subtotal,
                created_at,
            };
            insert_item(&mut tx, &item).await?;
            items.push(item);
        }

        for (line, product) in request.items.iter().zip(&products) {
            let after = reserve_stock(&mut tx, &product.id, line.quantity, created_at)
                .await?
                .ok_or_else(|| CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock_quantity,
                    requested: line.quantity,
                })?;

            insert_movement(
                &mut tx,
                NewMovement {
                    product_id: &product.id,
                    user_id: cashier_id,
                    movement_type: MovementType::Out,
                    quantity: line.quantity,
                    stock_before: after + line.quantity,
                    notes: Some(SALE_MOVEMENT_NOTE),
                    reference: Some(&sale.invoice_number),
                    created_at,
                },
            )
            .await?;
        }

        tx.commit().await?;

        Ok(SaleReceipt { sale, items })
    }
}

async fn ensure_cashier(conn: &mut SqliteConnection, cashier_id: &str) -> CheckoutResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)")
        .bind(cashier_id)
        .fetch_one(conn)
        .await?;

    if !exists {
        return Err(DbError::not_found("User", cashier_id).into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::{seed_category, seed_product, seed_user, setup};
    use chrono::NaiveDate;
    use kasir_core::{CartLine, Money, PaymentMethod, Role};

    fn cash(items: Vec<CartLine>, paid: Money) -> CheckoutRequest {
        CheckoutRequest {
            items,
            customer_name: None,
            payment_method: PaymentMethod::Cash,
            amount_paid: paid,
            discount_amount: Money::zero(),
        }
    }

    fn jan17() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 17, 3, 0, 0).unwrap()
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity
    }

    async fn assert_nothing_recorded(db: &Database) {
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.stock_movements().count().await.unwrap(), 0);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
    }

    #[tokio::test]
    async fn test_successful_sale_totals_and_change() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(50_000), 10).await;

        let request = cash(
            vec![CartLine::new(&product.id, 2, Money::from_rupiah(50_000))],
            Money::from_rupiah(120_000),
        );
        let receipt = db
            .checkout()
            .process_at(&request, &cashier.id, jan17())
            .await
            .unwrap();

        let sale = &receipt.sale;
        assert_eq!(sale.subtotal, Money::from_rupiah(100_000));
        assert_eq!(sale.tax_amount, Money::from_rupiah(11_000));
        assert_eq!(sale.total_amount, Money::from_rupiah(111_000));
        assert_eq!(sale.change_amount, Money::from_rupiah(9_000));
        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.invoice_number, "INV-20260117-0001");
        assert_eq!(sale.business_date, NaiveDate::from_ymd_opt(2026, 1, 17).unwrap());

        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].line_no, 1);
        assert_eq!(receipt.items[0].product_name, "Produk A");
        assert_eq!(receipt.items[0].subtotal, Money::from_rupiah(100_000));

        let stored = db.sales().get_by_invoice("INV-20260117-0001").await.unwrap().unwrap();
        assert_eq!(stored.sale.id, sale.id);
        assert_eq!(stored.sale.total_amount, sale.total_amount);
        assert_eq!(stored.items.len(), 1);
    }

    #[tokio::test]
    async fn test_sale_and_line_discounts() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let a = seed_product(&db, &category.id, "A", Money::from_rupiah(10_000), 10).await;
        let b = seed_product(&db, &category.id, "B", Money::from_rupiah(5_000), 10).await;

        let mut request = cash(
            vec![
                CartLine::new(&a.id, 3, Money::from_rupiah(10_000))
                    .with_discount(Money::from_rupiah(1_000)),
                CartLine::new(&b.id, 2, Money::from_rupiah(5_000)),
            ],
            Money::from_rupiah(50_000),
        );
        request.discount_amount = Money::from_rupiah(2_000);
        request.customer_name = Some("  Bu Tini ".to_string());

        let receipt = db
            .checkout()
            .process_at(&request, &cashier.id, jan17())
            .await
            .unwrap();

        // 3 × 9.000 + 2 × 5.000 = 37.000; (37.000 − 2.000) × 11% = 3.850
        assert_eq!(receipt.sale.subtotal, Money::from_rupiah(37_000));
        assert_eq!(receipt.sale.discount_amount, Money::from_rupiah(2_000));
        assert_eq!(receipt.sale.tax_amount, Money::from_rupiah(3_850));
        assert_eq!(receipt.sale.total_amount, Money::from_rupiah(38_850));
        assert_eq!(receipt.sale.change_amount, Money::from_rupiah(11_150));
        assert_eq!(receipt.sale.customer_name.as_deref(), Some("Bu Tini"));
        assert_eq!(receipt.items[1].line_no, 2);
        assert_eq!(receipt.items[0].discount_amount, Money::from_rupiah(1_000));
    }

    #[tokio::test]
    async fn test_insufficient_payment_persists_nothing() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(50_000), 10).await;

        let request = cash(
            vec![CartLine::new(&product.id, 2, Money::from_rupiah(50_000))],
            Money::from_rupiah(100_000),
        );
        let err = db
            .checkout()
            .process_at(&request, &cashier.id, jan17())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), CheckoutErrorKind::InsufficientPayment);
        assert_nothing_recorded(&db).await;
        assert_eq!(stock_of(&db, &product.id).await, 10);

        let day = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
        assert_eq!(invoice_sequence::current_value(db.pool(), day).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_price_persists_nothing() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(50_000), 10).await;

        // 4 × (2^62 + 250) sen wraps an i64
        let request = cash(
            vec![CartLine::new(&product.id, 4, Money::from_minor((1 << 62) + 250))],
            Money::from_minor(i64::MAX),
        );
        let err = db
            .checkout()
            .process_at(&request, &cashier.id, jan17())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), CheckoutErrorKind::InvalidRequest);
        assert!(err.to_string().contains("subtotal"), "{err}");
        assert_nothing_recorded(&db).await;
        assert_eq!(stock_of(&db, &product.id).await, 10);

        let day = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
        assert_eq!(invoice_sequence::current_value(db.pool(), day).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rejects_whole_cart() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let plenty = seed_product(&db, &category.id, "A", Money::from_rupiah(1_000), 50).await;
        let scarce = seed_product(&db, &category.id, "B", Money::from_rupiah(1_000), 3).await;

        let request = cash(
            vec![
                CartLine::new(&plenty.id, 1, Money::from_rupiah(1_000)),
                CartLine::new(&scarce.id, 5, Money::from_rupiah(1_000)),
            ],
            Money::from_rupiah(100_000),
        );
        let err = db
            .checkout()
            .process_at(&request, &cashier.id, jan17())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), CheckoutErrorKind::InsufficientStock);
        match err {
            CheckoutError::Rejected(CoreError::InsufficientStock {
                product,
                available,
                requested,
            }) => {
                assert_eq!(product, "Produk B");
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_nothing_recorded(&db).await;
        assert_eq!(stock_of(&db, &plenty.id).await, 50);
        assert_eq!(stock_of(&db, &scarce.id).await, 3);
    }

    #[tokio::test]
    async fn test_unknown_product_and_cashier() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(1_000), 5).await;

        let missing = cash(
            vec![CartLine::new("no-such-product", 1, Money::from_rupiah(1_000))],
            Money::from_rupiah(10_000),
        );
        let err = db
            .checkout()
            .process_at(&missing, &cashier.id, jan17())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CheckoutErrorKind::NotFound);
        assert!(matches!(err, CheckoutError::Rejected(CoreError::ProductNotFound(ref id)) if id == "no-such-product"));

        let request = cash(
            vec![CartLine::new(&product.id, 1, Money::from_rupiah(1_000))],
            Money::from_rupiah(10_000),
        );
        let err = db
            .checkout()
            .process_at(&request, "ghost", jan17())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), CheckoutErrorKind::NotFound);

        assert_nothing_recorded(&db).await;
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(1_000), 5).await;
        let processor = db.checkout();

        let empty = cash(vec![], Money::from_rupiah(1_000));
        let err = processor.process_at(&empty, &cashier.id, jan17()).await.unwrap_err();
        assert_eq!(err.kind(), CheckoutErrorKind::InvalidRequest);

        let zero_qty = cash(
            vec![CartLine::new(&product.id, 0, Money::from_rupiah(1_000))],
            Money::from_rupiah(1_000),
        );
        let err = processor.process_at(&zero_qty, &cashier.id, jan17()).await.unwrap_err();
        assert_eq!(err.kind(), CheckoutErrorKind::InvalidRequest);

        let mut big_discount = cash(
            vec![CartLine::new(&product.id, 1, Money::from_rupiah(1_000))],
            Money::from_rupiah(1_000),
        );
        big_discount.discount_amount = Money::from_rupiah(2_000);
        let err = processor.process_at(&big_discount, &cashier.id, jan17()).await.unwrap_err();
        assert_eq!(err.kind(), CheckoutErrorKind::InvalidRequest);

        assert_nothing_recorded(&db).await;
        assert_eq!(stock_of(&db, &product.id).await, 5);
    }

    #[tokio::test]
    async fn test_stock_ledger_matches_sale() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(2_000), 12).await;

        let request = cash(
            vec![CartLine::new(&product.id, 4, Money::from_rupiah(2_000))],
            Money::from_rupiah(10_000),
        );
        let receipt = db
            .checkout()
            .process_at(&request, &cashier.id, jan17())
            .await
            .unwrap();

        assert_eq!(stock_of(&db, &product.id).await, 8);

        let movements = db
            .stock_movements()
            .by_reference(&receipt.sale.invoice_number)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        let movement = &movements[0];
        assert_eq!(movement.movement_type, MovementType::Out);
        assert_eq!(movement.quantity, 4);
        assert_eq!(movement.stock_before, 12);
        assert_eq!(movement.stock_after, 8);
        assert_eq!(movement.user_id, cashier.id);
        assert_eq!(movement.notes.as_deref(), Some(SALE_MOVEMENT_NOTE));
    }

    #[tokio::test]
    async fn test_failed_line_insert_rolls_back_everything() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let first = seed_product(&db, &category.id, "A", Money::from_rupiah(1_000), 10).await;
        let second = seed_product(&db, &category.id, "BOOM", Money::from_rupiah(1_000), 10).await;

        sqlx::query(
            "CREATE TRIGGER fail_second_line BEFORE INSERT ON sale_items \
             WHEN NEW.product_name = 'Produk BOOM' \
             BEGIN SELECT RAISE(ABORT, 'disk full'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let request = cash(
            vec![
                CartLine::new(&first.id, 2, Money::from_rupiah(1_000)),
                CartLine::new(&second.id, 2, Money::from_rupiah(1_000)),
            ],
            Money::from_rupiah(10_000),
        );
        let err = db
            .checkout()
            .process_at(&request, &cashier.id, jan17())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), CheckoutErrorKind::PersistenceFailure);
        assert_nothing_recorded(&db).await;
        assert_eq!(stock_of(&db, &first.id).await, 10);
        assert_eq!(stock_of(&db, &second.id).await, 10);

        let day = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
        assert_eq!(invoice_sequence::current_value(db.pool(), day).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invoice_numbers_follow_business_date() {
        let db = setup().await;
        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(1_000), 10).await;
        let request = cash(
            vec![CartLine::new(&product.id, 1, Money::from_rupiah(1_000))],
            Money::from_rupiah(5_000),
        );
        let processor = db.checkout();

        let a = processor.process_at(&request, &cashier.id, jan17()).await.unwrap();
        let b = processor.process_at(&request, &cashier.id, jan17()).await.unwrap();
        let next_day = Utc.with_ymd_and_hms(2026, 1, 18, 3, 0, 0).unwrap();
        let c = processor.process_at(&request, &cashier.id, next_day).await.unwrap();

        assert_eq!(a.sale.invoice_number, "INV-20260117-0001");
        assert_eq!(b.sale.invoice_number, "INV-20260117-0002");
        assert_eq!(c.sale.invoice_number, "INV-20260118-0001");

        let parsed: InvoiceNumber = b.sale.invoice_number.parse().unwrap();
        assert_eq!(parsed.sequence, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() {
        let path = std::env::temp_dir().join(format!("kasir-{}.db", uuid::Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();

        let cashier = seed_user(&db, Role::Cashier).await;
        let category = seed_category(&db, "Sembako").await;
        let product = seed_product(&db, &category.id, "A", Money::from_rupiah(1_000), 5).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let processor = db.checkout();
            let cashier_id = cashier.id.clone();
            let request = cash(
                vec![CartLine::new(&product.id, 1, Money::from_rupiah(1_000))],
                Money::from_rupiah(5_000),
            );
            handles.push(tokio::spawn(async move {
                processor.process_at(&request, &cashier_id, jan17()).await
            }));
        }

        let mut invoices = Vec::new();
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(receipt) => invoices.push(receipt.sale.invoice_number),
                Err(err) => {
                    assert_eq!(err.kind(), CheckoutErrorKind::InsufficientStock);
                    rejected += 1;
                }
            }
        }

        assert_eq!(invoices.len(), 5);
        assert_eq!(rejected, 5);
        assert_eq!(stock_of(&db, &product.id).await, 0);

        let mut unique = invoices.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), invoices.len());

        let history = db.stock_movements().for_product(&product.id, 100).await.unwrap();
        assert_eq!(history.len(), 5);
        assert!(history.iter().all(|m| m.movement.stock_after >= 0));

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
