//! # Repository Module
//!
//! Database repository implementations for Kasir POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.products().list(&filter, page)                             │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list / list_for_pos / low_stock                                   │
//! │  ├── get_by_id / get_by_code                                           │
//! │  ├── insert / update / deactivate                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes that must happen together with others take a
//! `&mut SqliteConnection` (a transaction deref) instead of using the pool;
//! see [`product::reserve_stock`], [`sale::insert_sale`] and
//! [`stock_movement::insert_movement`].
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Category CRUD with product counts
//! - [`product::ProductRepository`] - Product CRUD, listings, stock reads
//! - [`sale::SaleRepository`] - Sale lookup and recent sales
//! - [`stock_movement::StockMovementRepository`] - Ledger history
//! - [`user::UserRepository`] - Staff accounts
//! - [`dashboard::DashboardRepository`] - Dashboard counters
//! - [`invoice_sequence`] - Per-day invoice counter

pub mod category;
pub mod dashboard;
pub mod invoice_sequence;
pub mod product;
pub mod sale;
pub mod stock_movement;
pub mod user;

/// Generates a new record ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
