//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │     Product     │   │      Sale       │       │
//! │  │  ─────────────  │◄──│  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name (unique)  │   │  code (business)│   │  invoice_number │       │
//! │  │  status         │   │  stock_quantity │   │  total_amount   │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                     │ 1..n           │
//! │                                 │            ┌────────▼────────┐       │
//! │                                 │            │    SaleItem     │       │
//! │                                 │            │ name/price snap │       │
//! │                                 │            └─────────────────┘       │
//! │                        ┌────────▼────────┐                              │
//! │                        │  StockMovement  │  in/out, before/after,      │
//! │                        │  (audit ledger) │  reference = invoice        │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (code, invoice_number, email) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1100 bps = 11% (PPN)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Catalog Status
// =============================================================================

/// Whether a product or category is offered.
///
/// Inactive records stay in the database so historical sales keep their
/// references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    Active,
    Inactive,
}

impl CatalogStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CatalogStatus::Active => "active",
            CatalogStatus::Inactive => "inactive",
        }
    }
}

impl Default for CatalogStatus {
    fn default() -> Self {
        CatalogStatus::Active
    }
}

impl std::str::FromStr for CatalogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CatalogStatus::Active),
            "inactive" => Ok(CatalogStatus::Inactive),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category (Makanan, Minuman, Sembako, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    /// Unique display name.
    pub name: String,
    pub description: Option<String>,
    pub status: CatalogStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A category with the number of products filed under it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategorySummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[ts(flatten)]
    pub category: Category,
    pub product_count: i64,
}

// =============================================================================
// Product
// =============================================================================

/// A product the shop stocks and sells.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier printed on shelf labels. Unique.
    pub code: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    pub description: Option<String>,

    pub category_id: String,

    /// What the shop pays the supplier per unit.
    pub purchase_price: Money,

    /// Shelf price per unit.
    pub selling_price: Money,

    /// Units on hand. Never negative once a transaction commits.
    pub stock_quantity: i64,

    /// Low-stock threshold.
    pub min_stock_level: i64,

    /// Unit label ("pcs", "kg", "dus").
    pub unit: String,

    pub status: CatalogStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Low stock means at or below the threshold, so a threshold of 10 flags
    /// a shelf holding exactly 10.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == CatalogStatus::Active
    }

    /// Checks if the current stock covers `quantity` units.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }
}

/// A product joined with its category name, as catalog listings show it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogProduct {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[ts(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub is_low_stock: bool,
}

// =============================================================================
// Users and Roles
// =============================================================================

/// The three staff roles of a small shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ShopOwner,
    WarehouseManager,
    Cashier,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::ShopOwner => "shop_owner",
            Role::WarehouseManager => "warehouse_manager",
            Role::Cashier => "cashier",
        }
    }
}

/// A staff member who can act on the system.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    /// Debit/credit card on the bank's EDC terminal.
    Card,
    /// Bank transfer.
    Transfer,
    /// QRIS, the national QR payment standard.
    Qris,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a recorded sale.
///
/// Checkout only ever writes `Completed`; the refund states exist for the
/// records but nothing transitions into them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Refunded,
    PartialRefund,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale transaction.
///
/// Holds `total_amount = subtotal - discount_amount + tax_amount` and
/// `change_amount = amount_paid - total_amount >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub invoice_number: String,
    pub cashier_id: String,
    pub customer_name: Option<String>,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub payment_method: PaymentMethod,
    pub amount_paid: Money,
    pub change_amount: Money,
    pub status: SaleStatus,
    /// Calendar day (server-local) the sale is booked on.
    #[ts(as = "String")]
    pub business_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Position in the cart, starting at 1.
    pub line_no: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price at time of sale (frozen).
    pub price: Money,
    pub quantity: i64,
    /// Discount per unit.
    pub discount_amount: Money,
    /// `quantity × (price − discount_amount)`.
    pub subtotal: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale with its lines, in cart order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// One row of a recent-sales list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleOverview {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[ts(flatten)]
    pub sale: Sale,
    pub cashier_name: String,
    pub item_count: i64,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Direction of a stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
}

impl MovementType {
    /// Stock level after moving `quantity` units from `before`.
    ///
    /// ```rust
    /// use kasir_core::MovementType;
    ///
    /// assert_eq!(MovementType::Out.apply(10, 3), 7);
    /// assert_eq!(MovementType::In.apply(10, 3), 13);
    /// ```
    #[inline]
    pub const fn apply(&self, before: i64, quantity: i64) -> i64 {
        match self {
            MovementType::In => before + quantity,
            MovementType::Out => before - quantity,
        }
    }

    /// The movement that turns `before` into `after`, with its quantity.
    /// `None` when nothing moved.
    pub fn between(before: i64, after: i64) -> Option<(MovementType, i64)> {
        match after.cmp(&before) {
            std::cmp::Ordering::Greater => Some((MovementType::In, after - before)),
            std::cmp::Ordering::Less => Some((MovementType::Out, before - after)),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Audit record of one directional inventory change.
///
/// Holds `stock_after = movement_type.apply(stock_before, quantity)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Who caused the change.
    pub user_id: String,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub notes: Option<String>,
    /// Invoice number for sales, supplier delivery note for restocks.
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A movement joined with the names a dashboard shows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovementView {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    #[ts(flatten)]
    pub movement: StockMovement,
    pub product_name: String,
    pub user_name: String,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub total_categories: i64,
    pub today_sales: Money,
    pub month_sales: Money,
    pub today_transactions: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
