//! Role-dependent dashboard.
//!
//! Everyone gets the headline numbers; the lists depend on what the
//! user's role may see.

use serde::Serialize;

use super::pos::SaleSummaryDto;
use super::product::{MovementDto, ProductDto};
use super::{resolve_user, AppContext};
use crate::error::ApiError;
use kasir_core::DashboardStats;
use kasir_db::repository::dashboard::DashboardLimits;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub total_categories: i64,
    pub today_sales: i64,
    pub today_sales_display: String,
    pub month_sales: i64,
    pub month_sales_display: String,
    pub today_transactions: i64,
}

impl From<DashboardStats> for StatsDto {
    fn from(s: DashboardStats) -> Self {
        StatsDto {
            total_products: s.total_products,
            low_stock_products: s.low_stock_products,
            total_categories: s.total_categories,
            today_sales: s.today_sales.minor_units(),
            today_sales_display: s.today_sales.to_string(),
            month_sales: s.month_sales.minor_units(),
            month_sales_display: s.month_sales.to_string(),
            today_transactions: s.today_transactions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub store_name: String,
    pub user: String,
    pub role: String,
    pub capabilities: Vec<String>,
    pub stats: StatsDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_movements: Option<Vec<MovementDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_stock_alerts: Option<Vec<ProductDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_sales: Option<Vec<SaleSummaryDto>>,
}

/// Builds the dashboard `user_key` is allowed to see.
pub async fn dashboard(ctx: &AppContext, user_key: &str) -> Result<DashboardResponse, ApiError> {
    let user = resolve_user(&ctx.db, user_key).await?;
    let capabilities = user.role.capabilities();
    let today = chrono::Local::now().date_naive();

    let limits = DashboardLimits {
        low_stock: ctx.config.low_stock_limit,
        ..Default::default()
    };
    let overview = ctx.db.dashboard().overview(&capabilities, today, limits).await?;

    Ok(DashboardResponse {
        store_name: ctx.config.store_name.clone(),
        user: user.name,
        role: user.role.as_str().to_string(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        stats: overview.stats.into(),
        stock_movements: overview
            .stock_movements
            .map(|rows| rows.into_iter().map(MovementDto::from).collect()),
        low_stock_alerts: overview
            .low_stock_alerts
            .map(|rows| rows.into_iter().map(ProductDto::from).collect()),
        recent_sales: overview
            .recent_sales
            .map(|rows| rows.into_iter().map(SaleSummaryDto::from).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::pos::checkout_request;
    use crate::commands::test_support::shop;
    use crate::error::ErrorCode;
    use kasir_core::{CartLine, CheckoutRequest, Money, PaymentMethod};

    #[tokio::test]
    async fn test_owner_sees_every_list() {
        let shop = shop().await;
        let request = CheckoutRequest {
            items: vec![CartLine::new(&shop.gula.id, 1, Money::from_rupiah(17_000))],
            customer_name: Some("Bu Tini".to_string()),
            payment_method: PaymentMethod::Cash,
            amount_paid: Money::from_rupiah(20_000),
            discount_amount: Money::zero(),
        };
        checkout_request(&shop.ctx, &request, "cashier@umkm.com").await.unwrap();

        let view = dashboard(&shop.ctx, &shop.owner.id).await.unwrap();
        assert_eq!(view.role, "shop_owner");
        assert_eq!(view.stats.total_products, 2);
        assert_eq!(view.stats.today_transactions, 1);
        // Rp 17.000 + PPN 11%
        assert_eq!(view.stats.today_sales, 1_887_000);
        assert_eq!(view.stock_movements.as_ref().map(Vec::len), Some(1));
        assert_eq!(view.low_stock_alerts.as_ref().map(Vec::len), Some(1));
        assert_eq!(view.recent_sales.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_lists_follow_role() {
        let shop = shop().await;

        let cashier = dashboard(&shop.ctx, "cashier@umkm.com").await.unwrap();
        assert!(cashier.stock_movements.is_none());
        assert!(cashier.low_stock_alerts.is_none());
        assert!(cashier.recent_sales.is_some());

        let json = serde_json::to_value(&cashier).unwrap();
        assert!(json.get("stockMovements").is_none());
        assert_eq!(json["storeName"], "Toko UMKM");

        let warehouse = dashboard(&shop.ctx, "warehouse@umkm.com").await.unwrap();
        assert!(warehouse.stock_movements.is_some());
        assert!(warehouse.recent_sales.is_none());
        assert!(warehouse.capabilities.iter().any(|c| c == "inventory.update"));

        let err = dashboard(&shop.ctx, "nobody@umkm.com").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
