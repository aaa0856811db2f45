//! # POS Commands
//!
//! Ringing up a cart and looking sales back up.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kasir checkout cart.json --cashier cashier@umkm.com                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  read cart.json (or stdin) ──► CheckoutRequest (serde)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cashier holds pos.create? ──── no ──► FORBIDDEN                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.checkout().process() ──── rejected ──► {code, message}             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReceiptResponse (JSON)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::io::Read;
use tracing::{debug, info};

use super::{authorize, AppContext};
use crate::error::ApiError;
use kasir_core::{
    CatalogProduct, Capability, CheckoutRequest, SaleItem, SaleOverview, SaleReceipt, User,
};

/// A recorded sale as printed for the customer.
///
/// Money fields are integer sen; the `*Display` fields are formatted rupiah.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub sale_id: String,
    pub invoice_number: String,
    pub store_name: String,
    pub cashier_id: String,
    pub customer_name: Option<String>,
    pub payment_method: String,
    pub status: String,
    pub business_date: String,
    pub timestamp: String,
    pub items: Vec<ReceiptLine>,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub tax_amount: i64,
    pub total_amount: i64,
    pub amount_paid: i64,
    pub change_amount: i64,
    pub total_display: String,
    pub change_display: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub line_no: i64,
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub price: i64,
    pub discount: i64,
    pub subtotal: i64,
}

impl From<SaleItem> for ReceiptLine {
    fn from(i: SaleItem) -> Self {
        ReceiptLine {
            line_no: i.line_no,
            product_id: i.product_id,
            name: i.product_name,
            quantity: i.quantity,
            price: i.price.minor_units(),
            discount: i.discount_amount.minor_units(),
            subtotal: i.subtotal.minor_units(),
        }
    }
}

impl ReceiptResponse {
    fn new(receipt: SaleReceipt, store_name: &str) -> Self {
        let SaleReceipt { sale, items } = receipt;
        ReceiptResponse {
            sale_id: sale.id,
            invoice_number: sale.invoice_number,
            store_name: store_name.to_string(),
            cashier_id: sale.cashier_id,
            customer_name: sale.customer_name,
            payment_method: enum_label(&sale.payment_method),
            status: enum_label(&sale.status),
            business_date: sale.business_date.to_string(),
            timestamp: sale.created_at.to_rfc3339(),
            items: items.into_iter().map(ReceiptLine::from).collect(),
            subtotal: sale.subtotal.minor_units(),
            discount_amount: sale.discount_amount.minor_units(),
            tax_amount: sale.tax_amount.minor_units(),
            total_amount: sale.total_amount.minor_units(),
            amount_paid: sale.amount_paid.minor_units(),
            change_amount: sale.change_amount.minor_units(),
            total_display: sale.total_amount.to_string(),
            change_display: sale.change_amount.to_string(),
        }
    }
}

/// One row of the recent-sales list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummaryDto {
    pub sale_id: String,
    pub invoice_number: String,
    pub cashier_name: String,
    pub customer_name: Option<String>,
    pub item_count: i64,
    pub total_amount: i64,
    pub payment_method: String,
    pub timestamp: String,
}

impl From<SaleOverview> for SaleSummaryDto {
    fn from(o: SaleOverview) -> Self {
        SaleSummaryDto {
            payment_method: enum_label(&o.sale.payment_method),
            timestamp: o.sale.created_at.to_rfc3339(),
            total_amount: o.sale.total_amount.minor_units(),
            sale_id: o.sale.id,
            invoice_number: o.sale.invoice_number,
            customer_name: o.sale.customer_name,
            cashier_name: o.cashier_name,
            item_count: o.item_count,
        }
    }
}

/// A product on the till screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosProductDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category_name: Option<String>,
    pub price: i64,
    pub price_display: String,
    pub stock: i64,
    pub unit: String,
}

impl From<CatalogProduct> for PosProductDto {
    fn from(c: CatalogProduct) -> Self {
        let p = c.product;
        PosProductDto {
            price: p.selling_price.minor_units(),
            price_display: p.selling_price.to_string(),
            id: p.id,
            code: p.code,
            name: p.name,
            category_name: c.category_name,
            stock: p.stock_quantity,
            unit: p.unit,
        }
    }
}

/// The serde name of a unit enum variant, e.g. `"qris"`.
pub(crate) fn enum_label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

/// Records the cart in `path` (`-` for stdin) as a sale by `cashier`.
pub async fn checkout(
    ctx: &AppContext,
    path: &str,
    cashier: &str,
) -> Result<ReceiptResponse, ApiError> {
    let body = read_cart(path)?;
    let request: CheckoutRequest = serde_json::from_str(&body)?;
    checkout_request(ctx, &request, cashier).await
}

pub async fn checkout_request(
    ctx: &AppContext,
    request: &CheckoutRequest,
    cashier: &str,
) -> Result<ReceiptResponse, ApiError> {
    let user: User = authorize(&ctx.db, cashier, Capability::PosCreate).await?;

    debug!(cashier = %user.email, lines = request.items.len(), "checkout command");

    let receipt = ctx.db.checkout().process(request, &user.id).await?;

    info!(
        invoice = %receipt.sale.invoice_number,
        total = %receipt.sale.total_amount,
        "Receipt issued"
    );

    Ok(ReceiptResponse::new(receipt, &ctx.config.store_name))
}

fn read_cart(path: &str) -> Result<String, ApiError> {
    let result = if path == "-" {
        let mut body = String::new();
        std::io::stdin().read_to_string(&mut body).map(|_| body)
    } else {
        std::fs::read_to_string(path)
    };
    result.map_err(|e| ApiError::validation(format!("Cannot read cart {}: {}", path, e)))
}

/// Looks a sale up by invoice number, then by id.
pub async fn get_sale(ctx: &AppContext, key: &str) -> Result<ReceiptResponse, ApiError> {
    let sales = ctx.db.sales();
    let receipt = match sales.get_by_invoice(key).await? {
        Some(receipt) => Some(receipt),
        None => sales.get_by_id(key).await?,
    };
    receipt
        .map(|r| ReceiptResponse::new(r, &ctx.config.store_name))
        .ok_or_else(|| ApiError::not_found("Sale", key))
}

pub async fn recent_sales(ctx: &AppContext, limit: u32) -> Result<Vec<SaleSummaryDto>, ApiError> {
    let sales = ctx.db.sales().recent(limit).await?;
    Ok(sales.into_iter().map(SaleSummaryDto::from).collect())
}

pub async fn pos_catalog(ctx: &AppContext) -> Result<Vec<PosProductDto>, ApiError> {
    let products = ctx.db.products().list_for_pos().await?;
    Ok(products.into_iter().map(PosProductDto::from).collect())
}
