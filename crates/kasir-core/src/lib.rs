//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! Everything a shop needs to decide *what* a sale costs and *who* may see
//! what, expressed as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 kasir CLI / web frontend                        │   │
//! │  │      Catalog ──► Cart ──► Checkout ──► Receipt ──► Dashboard    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  types   │ │  money   │ │ checkout │ │ pricing  │          │   │
//! │  │   │ Product  │ │  Money   │ │ CartLine │ │SaleTotals│          │   │
//! │  │   │  Sale    │ │ TaxRate  │ │ Request  │ │  change  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ invoice  │ │ catalog  │ │  access  │ │validation│          │   │
//! │  │   │INV-..-NN │ │ filters  │ │capability│ │  rules   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │     SQLite, repositories, the atomic sale transaction           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, StockMovement, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`checkout`] - The checkout request and its input rules
//! - [`pricing`] - Line subtotals, PPN, totals and change
//! - [`invoice`] - Invoice number format (`INV-YYYYMMDD-NNNN`)
//! - [`catalog`] - Catalog inputs, filters and pagination
//! - [`access`] - Roles, capabilities and dashboard slices
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::money::Money;
//! use kasir_core::PPN_RATE;
//!
//! let subtotal = Money::from_rupiah(100_000);
//! let tax = subtotal.calculate_tax(PPN_RATE);
//!
//! assert_eq!(tax, Money::from_rupiah(11_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod invoice;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Capability, CapabilitySet, DashboardSlice};
pub use checkout::{CartLine, CheckoutRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::InvoiceNumber;
pub use money::Money;
pub use pricing::{PricedLine, SaleTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Indonesian value-added tax (PPN), 11%.
pub const PPN_RATE: TaxRate = TaxRate::from_bps(1100);

/// Maximum lines allowed in a single checkout.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Catches fat-finger entries (typing 1000 instead of 10) at the till.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum units moved by a single restock or write-off.
pub const MAX_ADJUSTMENT_QUANTITY: i64 = 100_000;

/// Largest stock count or threshold a product can be given directly.
pub const MAX_STOCK_LEVEL: i64 = 1_000_000_000;

/// Low-stock threshold given to products created without one.
pub const DEFAULT_MIN_STOCK_LEVEL: i64 = 10;

/// Unit label given to products created without one.
pub const DEFAULT_UNIT: &str = "pcs";

/// Notes written on the stock movement produced by a sale.
pub const SALE_MOVEMENT_NOTE: &str = "Sale transaction";

/// Notes written on the stock movement produced by editing a product's stock.
pub const MANUAL_ADJUSTMENT_NOTE: &str = "Manual adjustment";
