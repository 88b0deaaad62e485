//! # Rate History Repositories
//!
//! Database operations for the three append-only rate histories:
//! exchange rates, air freight tariffs, sea freight tariffs.
//!
//! ## Append-Only Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A tariff edit INSERTS a new row; it never rewrites history.           │
//! │                                                                         │
//! │  usd_rates:        "current" = greatest updated_at                     │
//! │  air/sea tariffs:  "current" = resolver over the full history          │
//! │                     (exact location first, else country, latest date)  │
//! │                                                                         │
//! │  Stored CNF values are only revisited when a recalculation batch      │
//! │  explicitly re-derives the dependents.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_decimal;
use marlin_core::{AirFreightRate, SeaFreightRate, TierSet, UsdRate};

// =============================================================================
// Exchange Rates
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UsdRateRow {
    id: String,
    rate: String,
    effective_date: NaiveDate,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UsdRateRow> for UsdRate {
    type Error = DbError;

    fn try_from(row: UsdRateRow) -> DbResult<Self> {
        Ok(UsdRate {
            rate: parse_decimal("rate", &row.rate)?,
            id: row.id,
            effective_date: row.effective_date,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for the exchange-rate history.
#[derive(Debug, Clone)]
pub struct UsdRateRepository {
    pool: SqlitePool,
}

impl UsdRateRepository {
    /// Creates a new UsdRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UsdRateRepository { pool }
    }

    /// Appends a new exchange-rate row.
    pub async fn insert(&self, rate: &UsdRate) -> DbResult<UsdRate> {
        debug!(rate = %rate.rate, "Inserting USD rate");

        sqlx::query(
            r#"
            INSERT INTO usd_rates (id, rate, effective_date, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&rate.id)
        .bind(rate.rate.to_string())
        .bind(rate.effective_date)
        .bind(rate.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(rate.clone())
    }

    /// The authoritative rate: most recently updated entry, if any.
    pub async fn current(&self) -> DbResult<Option<UsdRate>> {
        let row = sqlx::query_as::<_, UsdRateRow>(
            "SELECT * FROM usd_rates ORDER BY updated_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(UsdRate::try_from).transpose()
    }

    /// Full history, most recent first.
    pub async fn list(&self) -> DbResult<Vec<UsdRate>> {
        let rows = sqlx::query_as::<_, UsdRateRow>(
            "SELECT * FROM usd_rates ORDER BY updated_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UsdRate::try_from).collect()
    }
}

// =============================================================================
// Freight Tariffs
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AirFreightRateRow {
    id: String,
    country: String,
    airport_code: Option<String>,
    rate_45kg: String,
    rate_100kg: String,
    rate_300kg: String,
    rate_500kg: String,
    effective_date: NaiveDate,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AirFreightRateRow> for AirFreightRate {
    type Error = DbError;

    fn try_from(row: AirFreightRateRow) -> DbResult<Self> {
        Ok(AirFreightRate {
            rates: TierSet {
                kg45: parse_decimal("rate_45kg", &row.rate_45kg)?,
                kg100: parse_decimal("rate_100kg", &row.rate_100kg)?,
                kg300: parse_decimal("rate_300kg", &row.rate_300kg)?,
                kg500: parse_decimal("rate_500kg", &row.rate_500kg)?,
            },
            id: row.id,
            country: row.country,
            airport_code: row.airport_code,
            effective_date: row.effective_date,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SeaFreightRateRow {
    id: String,
    country: String,
    port_code: String,
    port_name: String,
    rate_20ft: String,
    kilos_20ft: String,
    rate_40ft: String,
    kilos_40ft: String,
    freight_per_kilo_20ft: String,
    freight_per_kilo_40ft: String,
    effective_date: NaiveDate,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SeaFreightRateRow> for SeaFreightRate {
    type Error = DbError;

    fn try_from(row: SeaFreightRateRow) -> DbResult<Self> {
        Ok(SeaFreightRate {
            rate_20ft: parse_decimal("rate_20ft", &row.rate_20ft)?,
            kilos_20ft: parse_decimal("kilos_20ft", &row.kilos_20ft)?,
            rate_40ft: parse_decimal("rate_40ft", &row.rate_40ft)?,
            kilos_40ft: parse_decimal("kilos_40ft", &row.kilos_40ft)?,
            freight_per_kilo_20ft: parse_decimal(
                "freight_per_kilo_20ft",
                &row.freight_per_kilo_20ft,
            )?,
            freight_per_kilo_40ft: parse_decimal(
                "freight_per_kilo_40ft",
                &row.freight_per_kilo_40ft,
            )?,
            id: row.id,
            country: row.country,
            port_code: row.port_code,
            port_name: row.port_name,
            effective_date: row.effective_date,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for air and sea freight tariff histories.
#[derive(Debug, Clone)]
pub struct FreightRateRepository {
    pool: SqlitePool,
}

impl FreightRateRepository {
    /// Creates a new FreightRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FreightRateRepository { pool }
    }

    /// Appends a new air tariff row.
    pub async fn insert_air(&self, rate: &AirFreightRate) -> DbResult<AirFreightRate> {
        debug!(country = %rate.country, airport = ?rate.airport_code, "Inserting air freight rate");

        sqlx::query(
            r#"
            INSERT INTO air_freight_rates (
                id, country, airport_code,
                rate_45kg, rate_100kg, rate_300kg, rate_500kg,
                effective_date, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&rate.id)
        .bind(&rate.country)
        .bind(&rate.airport_code)
        .bind(rate.rates.kg45.to_string())
        .bind(rate.rates.kg100.to_string())
        .bind(rate.rates.kg300.to_string())
        .bind(rate.rates.kg500.to_string())
        .bind(rate.effective_date)
        .bind(rate.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(rate.clone())
    }

    /// Appends a new sea tariff row. Per-kilo fields must be pre-derived
    /// (see [`SeaFreightRate::derive_per_kilo`]).
    pub async fn insert_sea(&self, rate: &SeaFreightRate) -> DbResult<SeaFreightRate> {
        debug!(country = %rate.country, port = %rate.port_code, "Inserting sea freight rate");

        sqlx::query(
            r#"
            INSERT INTO sea_freight_rates (
                id, country, port_code, port_name,
                rate_20ft, kilos_20ft, rate_40ft, kilos_40ft,
                freight_per_kilo_20ft, freight_per_kilo_40ft,
                effective_date, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&rate.id)
        .bind(&rate.country)
        .bind(&rate.port_code)
        .bind(&rate.port_name)
        .bind(rate.rate_20ft.to_string())
        .bind(rate.kilos_20ft.to_string())
        .bind(rate.rate_40ft.to_string())
        .bind(rate.kilos_40ft.to_string())
        .bind(rate.freight_per_kilo_20ft.to_string())
        .bind(rate.freight_per_kilo_40ft.to_string())
        .bind(rate.effective_date)
        .bind(rate.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(rate.clone())
    }

    /// Full air tariff history. Rate selection happens in the resolver,
    /// never in SQL.
    pub async fn list_air(&self) -> DbResult<Vec<AirFreightRate>> {
        let rows = sqlx::query_as::<_, AirFreightRateRow>(
            "SELECT * FROM air_freight_rates ORDER BY country, effective_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AirFreightRate::try_from).collect()
    }

    /// Full sea tariff history.
    pub async fn list_sea(&self) -> DbResult<Vec<SeaFreightRate>> {
        let rows = sqlx::query_as::<_, SeaFreightRateRow>(
            "SELECT * FROM sea_freight_rates ORDER BY country, effective_date DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SeaFreightRate::try_from).collect()
    }

    /// Air tariff history for one country (case-insensitive).
    pub async fn list_air_for_country(&self, country: &str) -> DbResult<Vec<AirFreightRate>> {
        let rows = sqlx::query_as::<_, AirFreightRateRow>(
            r#"
            SELECT * FROM air_freight_rates
            WHERE country = ?1 COLLATE NOCASE
            ORDER BY effective_date DESC
            "#,
        )
        .bind(country)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AirFreightRate::try_from).collect()
    }

    /// Sea tariff history for one country (case-insensitive).
    pub async fn list_sea_for_country(&self, country: &str) -> DbResult<Vec<SeaFreightRate>> {
        let rows = sqlx::query_as::<_, SeaFreightRateRow>(
            r#"
            SELECT * FROM sea_freight_rates
            WHERE country = ?1 COLLATE NOCASE
            ORDER BY effective_date DESC
            "#,
        )
        .bind(country)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SeaFreightRate::try_from).collect()
    }
}
