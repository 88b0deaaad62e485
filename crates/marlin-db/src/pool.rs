//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers
//! - Writers don't block readers
//! - Better crash recovery

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::customer_price::CustomerPriceRepository;
use crate::repository::export_price::ExportPriceRepository;
use crate::repository::product::ProductRepository;
use crate::repository::rates::{FreightRateRepository, UsdRateRepository};
use crate::repository::variant::{ExportVariantRepository, VariantRepository};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/marlin.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single-office catalogue app)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The database file will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let config = DbConfig::in_memory();
    /// let db = Database::new(config).await?;
    /// // Database is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./marlin.db")).await?;
/// let rate = db.usd_rates().current().await?;
/// let prices = db.export_prices().list(None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        // sqlite://path creates file if not exists
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            // WAL mode: readers don't block writers, writers don't block readers
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: safe from corruption, may lose last
            // transaction on crash
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has foreign keys disabled by default
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations.
    ///
    /// Automatically called by `new()` unless disabled in the config.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    ///
    /// For advanced queries not covered by repositories.
    /// Prefer using repository methods when available.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the local variant repository.
    pub fn variants(&self) -> VariantRepository {
        VariantRepository::new(self.pool.clone())
    }

    /// Returns the export variant repository.
    pub fn export_variants(&self) -> ExportVariantRepository {
        ExportVariantRepository::new(self.pool.clone())
    }

    /// Returns the local customer price repository.
    pub fn customer_prices(&self) -> CustomerPriceRepository {
        CustomerPriceRepository::new(self.pool.clone())
    }

    /// Returns the export customer price repository.
    pub fn export_prices(&self) -> ExportPriceRepository {
        ExportPriceRepository::new(self.pool.clone())
    }

    /// Returns the exchange-rate history repository.
    pub fn usd_rates(&self) -> UsdRateRepository {
        UsdRateRepository::new(self.pool.clone())
    }

    /// Returns the freight tariff history repository (air and sea).
    pub fn freight_rates(&self) -> FreightRateRepository {
        FreightRateRepository::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use chrono::Utc;
    use marlin_core::{CustomerPrice, PriceInputKind, ProductSnapshot, UsdRate};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        let db = Database::new(config).await.unwrap();

        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_migration_status() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        assert!(total >= 1);
    }

    #[tokio::test]
    async fn test_customer_price_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let price = CustomerPrice {
            id: generate_id(),
            customer_id: "cust-1".to_string(),
            variant_id: "var-1".to_string(),
            snapshot: ProductSnapshot {
                common_name: "Yellowfin Tuna".to_string(),
                category: "Fresh Fish".to_string(),
                size_range: "1-2kg".to_string(),
            },
            purchasing_price: dec!(800.00),
            margin: dec!(200.00),
            margin_percentage: dec!(20.00),
            selling_price: dec!(1000.00),
            last_input: Some(PriceInputKind::Margin),
            created_at: now,
            updated_at: now,
        };

        db.customer_prices().insert(&price).await.unwrap();
        let loaded = db
            .customer_prices()
            .get_by_id(&price.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.selling_price, dec!(1000.00));
        assert_eq!(loaded.margin_percentage, dec!(20.00));
        assert_eq!(loaded.last_input, Some(PriceInputKind::Margin));
        assert_eq!(loaded.snapshot.common_name, "Yellowfin Tuna");

        let for_customer = db.customer_prices().list(Some("cust-1")).await.unwrap();
        assert_eq!(for_customer.len(), 1);
        assert!(db.customer_prices().list(Some("other")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_usd_rate_current_is_latest_updated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let older = UsdRate {
            id: generate_id(),
            rate: dec!(300.00),
            effective_date: "2024-05-01".parse().unwrap(),
            updated_at: now,
        };
        let newer = UsdRate {
            id: generate_id(),
            rate: dec!(302.75),
            effective_date: "2024-06-01".parse().unwrap(),
            updated_at: now + chrono::Duration::seconds(5),
        };
        db.usd_rates().insert(&older).await.unwrap();
        db.usd_rates().insert(&newer).await.unwrap();

        let current = db.usd_rates().current().await.unwrap().unwrap();
        assert_eq!(current.rate, dec!(302.75));
        assert_eq!(db.usd_rates().list().await.unwrap().len(), 2);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }
}
