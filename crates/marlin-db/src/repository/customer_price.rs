//! # Customer Price Repository
//!
//! Database operations for local customer price records (LKR margin trio).
//!
//! Each row carries the frozen product snapshot plus the three derived
//! margin fields; the `last_input` tag records which field the user edited
//! last so a purchase-cost change can replay the right one.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_decimal;
use marlin_core::{CustomerPrice, PriceInputKind, ProductSnapshot};

#[derive(Debug, sqlx::FromRow)]
struct CustomerPriceRow {
    id: String,
    customer_id: String,
    variant_id: String,
    common_name: String,
    category: String,
    size_range: String,
    purchasing_price: String,
    margin: String,
    margin_percentage: String,
    selling_price: String,
    last_input: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerPriceRow> for CustomerPrice {
    type Error = DbError;

    fn try_from(row: CustomerPriceRow) -> DbResult<Self> {
        let last_input = match row.last_input.as_deref() {
            Some(s) => Some(
                PriceInputKind::parse(s).ok_or_else(|| DbError::decode("last_input", s))?,
            ),
            None => None,
        };

        Ok(CustomerPrice {
            purchasing_price: parse_decimal("purchasing_price", &row.purchasing_price)?,
            margin: parse_decimal("margin", &row.margin)?,
            margin_percentage: parse_decimal("margin_percentage", &row.margin_percentage)?,
            selling_price: parse_decimal("selling_price", &row.selling_price)?,
            last_input,
            id: row.id,
            customer_id: row.customer_id,
            variant_id: row.variant_id,
            snapshot: ProductSnapshot {
                common_name: row.common_name,
                category: row.category,
                size_range: row.size_range,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for local customer price records.
#[derive(Debug, Clone)]
pub struct CustomerPriceRepository {
    pool: SqlitePool,
}

impl CustomerPriceRepository {
    /// Creates a new CustomerPriceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerPriceRepository { pool }
    }

    /// Inserts a new price record.
    pub async fn insert(&self, price: &CustomerPrice) -> DbResult<CustomerPrice> {
        debug!(
            customer_id = %price.customer_id,
            variant_id = %price.variant_id,
            "Inserting customer price"
        );

        sqlx::query(
            r#"
            INSERT INTO customer_prices (
                id, customer_id, variant_id,
                common_name, category, size_range,
                purchasing_price, margin, margin_percentage, selling_price,
                last_input, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&price.id)
        .bind(&price.customer_id)
        .bind(&price.variant_id)
        .bind(&price.snapshot.common_name)
        .bind(&price.snapshot.category)
        .bind(&price.snapshot.size_range)
        .bind(price.purchasing_price.to_string())
        .bind(price.margin.to_string())
        .bind(price.margin_percentage.to_string())
        .bind(price.selling_price.to_string())
        .bind(price.last_input.map(|k| k.as_str()))
        .bind(price.created_at)
        .bind(price.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(price.clone())
    }

    /// Gets a price record by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CustomerPrice>> {
        let row = sqlx::query_as::<_, CustomerPriceRow>(
            "SELECT * FROM customer_prices WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerPrice::try_from).transpose()
    }

    /// Lists price records, optionally scoped to one customer.
    pub async fn list(&self, customer_id: Option<&str>) -> DbResult<Vec<CustomerPrice>> {
        let rows = match customer_id {
            Some(customer_id) => {
                sqlx::query_as::<_, CustomerPriceRow>(
                    r#"
                    SELECT * FROM customer_prices
                    WHERE customer_id = ?1
                    ORDER BY common_name, size_range
                    "#,
                )
                .bind(customer_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, CustomerPriceRow>(
                    "SELECT * FROM customer_prices ORDER BY customer_id, common_name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(CustomerPrice::try_from).collect()
    }

    /// Updates a price record (snapshot and margin trio).
    pub async fn update(&self, price: &CustomerPrice) -> DbResult<()> {
        debug!(id = %price.id, "Updating customer price");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE customer_prices SET
                common_name = ?2, category = ?3, size_range = ?4,
                purchasing_price = ?5, margin = ?6,
                margin_percentage = ?7, selling_price = ?8,
                last_input = ?9, updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&price.id)
        .bind(&price.snapshot.common_name)
        .bind(&price.snapshot.category)
        .bind(&price.snapshot.size_range)
        .bind(price.purchasing_price.to_string())
        .bind(price.margin.to_string())
        .bind(price.margin_percentage.to_string())
        .bind(price.selling_price.to_string())
        .bind(price.last_input.map(|k| k.as_str()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomerPrice", &price.id));
        }

        Ok(())
    }

    /// Deletes a price record.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer price");

        let result = sqlx::query("DELETE FROM customer_prices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CustomerPrice", id));
        }

        Ok(())
    }
}
