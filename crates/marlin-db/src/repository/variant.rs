//! # Variant Repositories
//!
//! Database operations for local product variants and export variants.
//!
//! Export variants carry the exchange-rate snapshot and the derived
//! ex-factory price; the exchange-rate cascade rewrites both through
//! [`ExportVariantRepository::update`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{parse_decimal, parse_opt_decimal};
use marlin_core::{ExportVariant, ProductVariant};

// =============================================================================
// Local Variants
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    product_id: String,
    size: String,
    unit: String,
    purchasing_price: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VariantRow> for ProductVariant {
    type Error = DbError;

    fn try_from(row: VariantRow) -> DbResult<Self> {
        Ok(ProductVariant {
            purchasing_price: parse_decimal("purchasing_price", &row.purchasing_price)?,
            id: row.id,
            product_id: row.product_id,
            size: row.size,
            unit: row.unit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for local product variants.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    /// Creates a new VariantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    /// Inserts a new variant.
    pub async fn insert(&self, variant: &ProductVariant) -> DbResult<ProductVariant> {
        debug!(product_id = %variant.product_id, size = %variant.size, "Inserting variant");

        sqlx::query(
            r#"
            INSERT INTO product_variants (
                id, product_id, size, unit, purchasing_price,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.size)
        .bind(&variant.unit)
        .bind(variant.purchasing_price.to_string())
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(variant.clone())
    }

    /// Gets a variant by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ProductVariant>> {
        let row = sqlx::query_as::<_, VariantRow>(
            "SELECT * FROM product_variants WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductVariant::try_from).transpose()
    }

    /// Lists variants of one product.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<ProductVariant>> {
        let rows = sqlx::query_as::<_, VariantRow>(
            "SELECT * FROM product_variants WHERE product_id = ?1 ORDER BY size",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProductVariant::try_from).collect()
    }

    /// Updates a variant.
    pub async fn update(&self, variant: &ProductVariant) -> DbResult<()> {
        debug!(id = %variant.id, "Updating variant");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE product_variants SET
                size = ?2, unit = ?3, purchasing_price = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.size)
        .bind(&variant.unit)
        .bind(variant.purchasing_price.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ProductVariant", &variant.id));
        }

        Ok(())
    }
}

// =============================================================================
// Export Variants
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ExportVariantRow {
    id: String,
    product_id: String,
    size: String,
    unit: String,
    purchasing_price: String,
    usd_rate: String,
    packing_cost: String,
    labour_overhead: String,
    profit: String,
    profit_margin: String,
    ex_factory_price: String,
    multiplier: Option<String>,
    divisor: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ExportVariantRow> for ExportVariant {
    type Error = DbError;

    fn try_from(row: ExportVariantRow) -> DbResult<Self> {
        Ok(ExportVariant {
            purchasing_price: parse_decimal("purchasing_price", &row.purchasing_price)?,
            usd_rate: parse_decimal("usd_rate", &row.usd_rate)?,
            packing_cost: parse_decimal("packing_cost", &row.packing_cost)?,
            labour_overhead: parse_decimal("labour_overhead", &row.labour_overhead)?,
            profit: parse_decimal("profit", &row.profit)?,
            profit_margin: parse_decimal("profit_margin", &row.profit_margin)?,
            ex_factory_price: parse_decimal("ex_factory_price", &row.ex_factory_price)?,
            multiplier: parse_opt_decimal("multiplier", row.multiplier.as_deref())?,
            divisor: parse_decimal("divisor", &row.divisor)?,
            id: row.id,
            product_id: row.product_id,
            size: row.size,
            unit: row.unit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for export variants.
#[derive(Debug, Clone)]
pub struct ExportVariantRepository {
    pool: SqlitePool,
}

impl ExportVariantRepository {
    /// Creates a new ExportVariantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExportVariantRepository { pool }
    }

    /// Inserts a new export variant.
    pub async fn insert(&self, variant: &ExportVariant) -> DbResult<ExportVariant> {
        debug!(product_id = %variant.product_id, size = %variant.size, "Inserting export variant");

        sqlx::query(
            r#"
            INSERT INTO export_variants (
                id, product_id, size, unit, purchasing_price,
                usd_rate, packing_cost, labour_overhead,
                profit, profit_margin, ex_factory_price,
                multiplier, divisor, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.size)
        .bind(&variant.unit)
        .bind(variant.purchasing_price.to_string())
        .bind(variant.usd_rate.to_string())
        .bind(variant.packing_cost.to_string())
        .bind(variant.labour_overhead.to_string())
        .bind(variant.profit.to_string())
        .bind(variant.profit_margin.to_string())
        .bind(variant.ex_factory_price.to_string())
        .bind(variant.multiplier.map(|m| m.to_string()))
        .bind(variant.divisor.to_string())
        .bind(variant.created_at)
        .bind(variant.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(variant.clone())
    }

    /// Gets an export variant by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ExportVariant>> {
        let row = sqlx::query_as::<_, ExportVariantRow>(
            "SELECT * FROM export_variants WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ExportVariant::try_from).transpose()
    }

    /// Lists export variants, optionally scoped to one product.
    pub async fn list(&self, product_id: Option<&str>) -> DbResult<Vec<ExportVariant>> {
        let rows = match product_id {
            Some(product_id) => {
                sqlx::query_as::<_, ExportVariantRow>(
                    "SELECT * FROM export_variants WHERE product_id = ?1 ORDER BY size",
                )
                .bind(product_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ExportVariantRow>(
                    "SELECT * FROM export_variants ORDER BY product_id, size",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(ExportVariant::try_from).collect()
    }

    /// Updates an export variant (all cost and derived fields).
    pub async fn update(&self, variant: &ExportVariant) -> DbResult<()> {
        debug!(id = %variant.id, "Updating export variant");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE export_variants SET
                size = ?2, unit = ?3, purchasing_price = ?4,
                usd_rate = ?5, packing_cost = ?6, labour_overhead = ?7,
                profit = ?8, profit_margin = ?9, ex_factory_price = ?10,
                multiplier = ?11, divisor = ?12, updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.size)
        .bind(&variant.unit)
        .bind(variant.purchasing_price.to_string())
        .bind(variant.usd_rate.to_string())
        .bind(variant.packing_cost.to_string())
        .bind(variant.labour_overhead.to_string())
        .bind(variant.profit.to_string())
        .bind(variant.profit_margin.to_string())
        .bind(variant.ex_factory_price.to_string())
        .bind(variant.multiplier.map(|m| m.to_string()))
        .bind(variant.divisor.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExportVariant", &variant.id));
        }

        Ok(())
    }

    /// Counts export variants (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM export_variants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
