//! # Database Handle
//!
//! Opens the shop's SQLite file and hands out repositories and services that
//! share one connection pool.
//!
//! ```text
//! DbConfig::new("kasir.db")          DbConfig::in_memory()
//!        │  WAL, foreign keys,              │  one connection that never
//!        │  busy timeout                    │  idles out (tests)
//!        └──────────────┬───────────────────┘
//!                       ▼
//!            Database::new(config) ──► embedded migrations
//!                       │
//!      ┌────────────────┼──────────────────┬───────────────┐
//!      ▼                ▼                  ▼               ▼
//!  products()      checkout()         inventory()     dashboard() ...
//! ```
//!
//! Readers never wait on the writer in WAL mode, but writers queue behind
//! each other. A sale takes the write lock with its first statement, so
//! concurrent checkouts wait up to `busy_timeout` for their turn.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::checkout::SaleProcessor;
use crate::error::{DbError, DbResult};
use crate::inventory::InventoryService;
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::dashboard::DashboardRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::stock_movement::StockMovementRepository;
use crate::repository::user::UserRepository;

/// Where the data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private to one pool and gone when it closes.
    Memory,
}

/// How to open the database.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/kasir/toko.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: StoreLocation,
    /// Default 5; always 1 in memory.
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long to wait for a free pooled connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    /// How long a writer waits for SQLite's write lock.
    pub busy_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    /// A database file, created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: StoreLocation::File(path.into()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            busy_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// A throwaway database for tests.
    ///
    /// Each connection to `:memory:` would see its own empty database, so
    /// the pool holds exactly one and never lets it idle out.
    pub fn in_memory() -> Self {
        DbConfig {
            location: StoreLocation::Memory,
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.location {
            StoreLocation::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            StoreLocation::Memory => SqliteConnectOptions::new()
                .in_memory(true)
                .journal_mode(SqliteJournalMode::Memory),
        };

        options
            .synchronous(SqliteSynchronous::Normal)
            // Off by default in SQLite
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
    }

    fn describe(&self) -> String {
        match &self.location {
            StoreLocation::File(path) => path.display().to_string(),
            StoreLocation::Memory => ":memory:".to_string(),
        }
    }
}

/// The shop database.
///
/// Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let target = config.describe();
        info!(database = %target, "Opening database");

        let max_connections = match config.location {
            StoreLocation::Memory if config.max_connections != 1 => {
                warn!(
                    requested = config.max_connections,
                    "In-memory database is limited to one connection"
                );
                1
            }
            _ => config.max_connections,
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(config.min_connections.min(max_connections))
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.idle_timeout.map(|_| Duration::from_secs(30 * 60)))
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(format!("{}: {}", target, e)))?;

        debug!(max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The raw pool, for code that needs its own transaction.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn stock_movements(&self) -> StockMovementRepository {
        StockMovementRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn dashboard(&self) -> DashboardRepository {
        DashboardRepository::new(self.pool.clone())
    }

    /// The sale transaction processor.
    ///
    /// ```rust,ignore
    /// let receipt = db.checkout().process(&request, &cashier_id).await?;
    /// println!("{}", receipt.sale.invoice_number);
    /// ```
    pub fn checkout(&self) -> SaleProcessor {
        SaleProcessor::new(self.pool.clone())
    }

    /// Restocks and write-offs.
    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.pool.clone())
    }

    pub async fn close(&self) {
        debug!("Closing database pool");
        self.pool.close().await;
    }

    /// True when a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    /// `(embedded, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }
}
