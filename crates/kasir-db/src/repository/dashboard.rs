//! # Dashboard Repository
//!
//! Aggregates for the landing screen. The headline numbers are shown to
//! everyone; the three lists are only filled in for users whose
//! capabilities unlock them.
//!
//! ```text
//!   ShopOwner          → stats + movements + low stock + recent sales
//!   WarehouseManager   → stats + movements + low stock
//!   Cashier            → stats + recent sales
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::stock_movement::StockMovementRepository;
use kasir_core::access::{CapabilitySet, DashboardSlice};
use kasir_core::{CatalogProduct, DashboardStats, Money, SaleOverview, StockMovementView};

/// How many rows each dashboard list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    pub stock_movements: u32,
    pub recent_sales: u32,
    pub low_stock: u32,
}

impl Default for DashboardLimits {
    fn default() -> Self {
        DashboardLimits {
            stock_movements: 5,
            recent_sales: 5,
            low_stock: 10,
        }
    }
}

/// Everything one user's dashboard shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_movements: Option<Vec<StockMovementView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_alerts: Option<Vec<CatalogProduct>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_sales: Option<Vec<SaleOverview>>,
}

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Headline numbers, with sales booked on `today` and its month.
    pub async fn stats(&self, today: NaiveDate) -> DbResult<DashboardStats> {
        let total_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;

        let low_stock_products: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products \
             WHERE status = 'active' AND stock_quantity <= min_stock_level",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_categories: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE status = 'active'")
                .fetch_one(&self.pool)
                .await?;

        let (today_sales, today_transactions): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_amount), 0), COUNT(*) FROM sales WHERE business_date = ?1",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        let month_sales: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount), 0) FROM sales WHERE substr(business_date, 1, 7) = ?1",
        )
        .bind(today.format("%Y-%m").to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_products,
            low_stock_products,
            total_categories,
            today_sales: Money::from_minor(today_sales),
            month_sales: Money::from_minor(month_sales),
            today_transactions,
        })
    }

    /// The dashboard as seen by someone holding `capabilities`.
    pub async fn overview(
        &self,
        capabilities: &CapabilitySet,
        today: NaiveDate,
        limits: DashboardLimits,
    ) -> DbResult<Dashboard> {
        let slices = capabilities.dashboard_slices();
        debug!(?slices, %today, "Building dashboard");

        let mut dashboard = Dashboard {
            stats: self.stats(today).await?,
            stock_movements: None,
            low_stock_alerts: None,
            recent_sales: None,
        };

        for slice in slices {
            match slice {
                DashboardSlice::StockMovements => {
                    dashboard.stock_movements = Some(
                        StockMovementRepository::new(self.pool.clone())
                            .recent(limits.stock_movements)
                            .await?,
                    );
                }
                DashboardSlice::LowStockAlerts => {
                    dashboard.low_stock_alerts = Some(
                        ProductRepository::new(self.pool.clone())
                            .low_stock(limits.low_stock)
                            .await?,
                    );
                }
                DashboardSlice::RecentSales => {
                    dashboard.recent_sales = Some(
                        SaleRepository::new(self.pool.clone())
                            .recent(limits.recent_sales)
                            .await?,
                    );
                }
            }
        }

        Ok(dashboard)
    }
}
