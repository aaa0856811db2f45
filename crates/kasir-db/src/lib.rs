//! # kasir-db: Database Layer for Kasir POS
//!
//! SQLite persistence for the catalog, sales and stock ledger, plus the one
//! operation that must be all-or-nothing: recording a sale.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  kasir checkout cart.json --cashier <id>                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ SaleProcessor │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ (checkout.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │ Inventory     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Repositories  │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - The atomic sale transaction
//! - [`inventory`] - Restocks and write-offs with their ledger rows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kasir.db")).await?;
//!
//! let receipt = db.checkout().process(&request, &cashier_id).await?;
//! let stats = db.dashboard().stats(today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod inventory;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutError, CheckoutErrorKind, SaleProcessor};
pub use error::{DbError, DbResult};
pub use inventory::{AdjustmentError, InventoryService, StockAdjustment};
pub use pool::{Database, DbConfig, StoreLocation};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock_movement::StockMovementRepository;
pub use repository::user::UserRepository;
