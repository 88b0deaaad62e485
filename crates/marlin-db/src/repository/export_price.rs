//! # Export Price Repository
//!
//! Database operations for export customer price records (FOB / CNF).
//!
//! The row is deliberately flat: five overhead lines in both currencies,
//! the four-tier air freight and CNF columns, and the sea columns all live
//! on one row so a price list renders without joins. The nested domain
//! shape ([`OverheadCosts`], [`TierSet`]) is reassembled at the boundary.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{parse_decimal, parse_opt_decimal};
use marlin_core::{
    ContainerType, CostLine, ExportCustomerPrice, FreightType, OverheadCosts, ProductSnapshot,
    TierSet,
};

#[derive(Debug, sqlx::FromRow)]
struct ExportPriceRow {
    id: String,
    customer_id: String,
    variant_id: String,
    common_name: String,
    category: String,
    size_range: String,
    ex_factory_price: String,
    usd_rate: String,
    documentation_usd: String,
    documentation_lkr: String,
    transport_usd: String,
    transport_lkr: String,
    loading_usd: String,
    loading_lkr: String,
    airway_usd: String,
    airway_lkr: String,
    forwarding_usd: String,
    forwarding_lkr: String,
    fob_price: String,
    freight_type: String,
    country: String,
    airport_code: Option<String>,
    port_code: Option<String>,
    multiplier: Option<String>,
    divisor: String,
    freight_cost_45kg: String,
    freight_cost_100kg: String,
    freight_cost_300kg: String,
    freight_cost_500kg: String,
    cnf_45kg: String,
    cnf_100kg: String,
    cnf_300kg: String,
    cnf_500kg: String,
    container_type: Option<String>,
    freight_cost_sea: String,
    cnf_sea: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn cost_line(
    usd_col: &str,
    usd: &str,
    lkr_col: &str,
    lkr: &str,
) -> DbResult<CostLine> {
    Ok(CostLine {
        usd: parse_decimal(usd_col, usd)?,
        lkr: parse_decimal(lkr_col, lkr)?,
    })
}

impl TryFrom<ExportPriceRow> for ExportCustomerPrice {
    type Error = DbError;

    fn try_from(row: ExportPriceRow) -> DbResult<Self> {
        let freight_type = FreightType::parse(&row.freight_type)
            .ok_or_else(|| DbError::decode("freight_type", &row.freight_type))?;
        let container_type = match row.container_type.as_deref() {
            Some(s) => Some(
                ContainerType::parse(s).ok_or_else(|| DbError::decode("container_type", s))?,
            ),
            None => None,
        };

        Ok(ExportCustomerPrice {
            ex_factory_price: parse_decimal("ex_factory_price", &row.ex_factory_price)?,
            usd_rate: parse_decimal("usd_rate", &row.usd_rate)?,
            overheads: OverheadCosts {
                documentation: cost_line(
                    "documentation_usd",
                    &row.documentation_usd,
                    "documentation_lkr",
                    &row.documentation_lkr,
                )?,
                transport: cost_line(
                    "transport_usd",
                    &row.transport_usd,
                    "transport_lkr",
                    &row.transport_lkr,
                )?,
                loading: cost_line(
                    "loading_usd",
                    &row.loading_usd,
                    "loading_lkr",
                    &row.loading_lkr,
                )?,
                airway: cost_line("airway_usd", &row.airway_usd, "airway_lkr", &row.airway_lkr)?,
                forwarding: cost_line(
                    "forwarding_usd",
                    &row.forwarding_usd,
                    "forwarding_lkr",
                    &row.forwarding_lkr,
                )?,
            },
            fob_price: parse_decimal("fob_price", &row.fob_price)?,
            freight_type,
            multiplier: parse_opt_decimal("multiplier", row.multiplier.as_deref())?,
            divisor: parse_decimal("divisor", &row.divisor)?,
            freight_costs: TierSet {
                kg45: parse_decimal("freight_cost_45kg", &row.freight_cost_45kg)?,
                kg100: parse_decimal("freight_cost_100kg", &row.freight_cost_100kg)?,
                kg300: parse_decimal("freight_cost_300kg", &row.freight_cost_300kg)?,
                kg500: parse_decimal("freight_cost_500kg", &row.freight_cost_500kg)?,
            },
            cnf: TierSet {
                kg45: parse_decimal("cnf_45kg", &row.cnf_45kg)?,
                kg100: parse_decimal("cnf_100kg", &row.cnf_100kg)?,
                kg300: parse_decimal("cnf_300kg", &row.cnf_300kg)?,
                kg500: parse_decimal("cnf_500kg", &row.cnf_500kg)?,
            },
            container_type,
            freight_cost_sea: parse_decimal("freight_cost_sea", &row.freight_cost_sea)?,
            cnf_sea: parse_decimal("cnf_sea", &row.cnf_sea)?,
            id: row.id,
            customer_id: row.customer_id,
            variant_id: row.variant_id,
            snapshot: ProductSnapshot {
                common_name: row.common_name,
                category: row.category,
                size_range: row.size_range,
            },
            country: row.country,
            airport_code: row.airport_code,
            port_code: row.port_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for export customer price records.
#[derive(Debug, Clone)]
pub struct ExportPriceRepository {
    pool: SqlitePool,
}

impl ExportPriceRepository {
    /// Creates a new ExportPriceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExportPriceRepository { pool }
    }

    /// Inserts a new export price record.
    pub async fn insert(&self, price: &ExportCustomerPrice) -> DbResult<ExportCustomerPrice> {
        debug!(
            customer_id = %price.customer_id,
            variant_id = %price.variant_id,
            freight_type = %price.freight_type.as_str(),
            "Inserting export price"
        );

        sqlx::query(
            r#"
            INSERT INTO export_customer_prices (
                id, customer_id, variant_id,
                common_name, category, size_range,
                ex_factory_price, usd_rate,
                documentation_usd, documentation_lkr,
                transport_usd, transport_lkr,
                loading_usd, loading_lkr,
                airway_usd, airway_lkr,
                forwarding_usd, forwarding_lkr,
                fob_price, freight_type, country, airport_code, port_code,
                multiplier, divisor,
                freight_cost_45kg, freight_cost_100kg,
                freight_cost_300kg, freight_cost_500kg,
                cnf_45kg, cnf_100kg, cnf_300kg, cnf_500kg,
                container_type, freight_cost_sea, cnf_sea,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
                ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30,
                ?31, ?32, ?33, ?34, ?35, ?36, ?37, ?38
            )
            "#,
        )
        .bind(&price.id)
        .bind(&price.customer_id)
        .bind(&price.variant_id)
        .bind(&price.snapshot.common_name)
        .bind(&price.snapshot.category)
        .bind(&price.snapshot.size_range)
        .bind(price.ex_factory_price.to_string())
        .bind(price.usd_rate.to_string())
        .bind(price.overheads.documentation.usd.to_string())
        .bind(price.overheads.documentation.lkr.to_string())
        .bind(price.overheads.transport.usd.to_string())
        .bind(price.overheads.transport.lkr.to_string())
        .bind(price.overheads.loading.usd.to_string())
        .bind(price.overheads.loading.lkr.to_string())
        .bind(price.overheads.airway.usd.to_string())
        .bind(price.overheads.airway.lkr.to_string())
        .bind(price.overheads.forwarding.usd.to_string())
        .bind(price.overheads.forwarding.lkr.to_string())
        .bind(price.fob_price.to_string())
        .bind(price.freight_type.as_str())
        .bind(&price.country)
        .bind(&price.airport_code)
        .bind(&price.port_code)
        .bind(price.multiplier.map(|m| m.to_string()))
        .bind(price.divisor.to_string())
        .bind(price.freight_costs.kg45.to_string())
        .bind(price.freight_costs.kg100.to_string())
        .bind(price.freight_costs.kg300.to_string())
        .bind(price.freight_costs.kg500.to_string())
        .bind(price.cnf.kg45.to_string())
        .bind(price.cnf.kg100.to_string())
        .bind(price.cnf.kg300.to_string())
        .bind(price.cnf.kg500.to_string())
        .bind(price.container_type.map(|c| c.as_str()))
        .bind(price.freight_cost_sea.to_string())
        .bind(price.cnf_sea.to_string())
        .bind(price.created_at)
        .bind(price.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(price.clone())
    }

    /// Gets an export price record by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<ExportCustomerPrice>> {
        let row = sqlx::query_as::<_, ExportPriceRow>(
            "SELECT * FROM export_customer_prices WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ExportCustomerPrice::try_from).transpose()
    }

    /// Lists export price records, optionally scoped to one customer.
    pub async fn list(&self, customer_id: Option<&str>) -> DbResult<Vec<ExportCustomerPrice>> {
        let rows = match customer_id {
            Some(customer_id) => {
                sqlx::query_as::<_, ExportPriceRow>(
                    r#"
                    SELECT * FROM export_customer_prices
                    WHERE customer_id = ?1
                    ORDER BY common_name, size_range
                    "#,
                )
                .bind(customer_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ExportPriceRow>(
                    "SELECT * FROM export_customer_prices ORDER BY customer_id, common_name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter()
            .map(ExportCustomerPrice::try_from)
            .collect()
    }

    /// Lists the records a freight-rate change touches: one freight type,
    /// one destination country (case-insensitive).
    pub async fn list_by_freight_type(
        &self,
        freight_type: FreightType,
        country: &str,
    ) -> DbResult<Vec<ExportCustomerPrice>> {
        let rows = sqlx::query_as::<_, ExportPriceRow>(
            r#"
            SELECT * FROM export_customer_prices
            WHERE freight_type = ?1 AND country = ?2 COLLATE NOCASE
            ORDER BY customer_id, common_name
            "#,
        )
        .bind(freight_type.as_str())
        .bind(country)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(ExportCustomerPrice::try_from)
            .collect()
    }

    /// Updates an export price record (all cached derived fields included).
    pub async fn update(&self, price: &ExportCustomerPrice) -> DbResult<()> {
        debug!(id = %price.id, "Updating export price");

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE export_customer_prices SET
                common_name = ?2, category = ?3, size_range = ?4,
                ex_factory_price = ?5, usd_rate = ?6,
                documentation_usd = ?7, documentation_lkr = ?8,
                transport_usd = ?9, transport_lkr = ?10,
                loading_usd = ?11, loading_lkr = ?12,
                airway_usd = ?13, airway_lkr = ?14,
                forwarding_usd = ?15, forwarding_lkr = ?16,
                fob_price = ?17, freight_type = ?18,
                country = ?19, airport_code = ?20, port_code = ?21,
                multiplier = ?22, divisor = ?23,
                freight_cost_45kg = ?24, freight_cost_100kg = ?25,
                freight_cost_300kg = ?26, freight_cost_500kg = ?27,
                cnf_45kg = ?28, cnf_100kg = ?29, cnf_300kg = ?30, cnf_500kg = ?31,
                container_type = ?32, freight_cost_sea = ?33, cnf_sea = ?34,
                updated_at = ?35
            WHERE id = ?1
            "#,
        )
        .bind(&price.id)
        .bind(&price.snapshot.common_name)
        .bind(&price.snapshot.category)
        .bind(&price.snapshot.size_range)
        .bind(price.ex_factory_price.to_string())
        .bind(price.usd_rate.to_string())
        .bind(price.overheads.documentation.usd.to_string())
        .bind(price.overheads.documentation.lkr.to_string())
        .bind(price.overheads.transport.usd.to_string())
        .bind(price.overheads.transport.lkr.to_string())
        .bind(price.overheads.loading.usd.to_string())
        .bind(price.overheads.loading.lkr.to_string())
        .bind(price.overheads.airway.usd.to_string())
        .bind(price.overheads.airway.lkr.to_string())
        .bind(price.overheads.forwarding.usd.to_string())
        .bind(price.overheads.forwarding.lkr.to_string())
        .bind(price.fob_price.to_string())
        .bind(price.freight_type.as_str())
        .bind(&price.country)
        .bind(&price.airport_code)
        .bind(&price.port_code)
        .bind(price.multiplier.map(|m| m.to_string()))
        .bind(price.divisor.to_string())
        .bind(price.freight_costs.kg45.to_string())
        .bind(price.freight_costs.kg100.to_string())
        .bind(price.freight_costs.kg300.to_string())
        .bind(price.freight_costs.kg500.to_string())
        .bind(price.cnf.kg45.to_string())
        .bind(price.cnf.kg100.to_string())
        .bind(price.cnf.kg300.to_string())
        .bind(price.cnf.kg500.to_string())
        .bind(price.container_type.map(|c| c.as_str()))
        .bind(price.freight_cost_sea.to_string())
        .bind(price.cnf_sea.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExportCustomerPrice", &price.id));
        }

        Ok(())
    }

    /// Deletes an export price record.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting export price");

        let result = sqlx::query("DELETE FROM export_customer_prices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ExportCustomerPrice", id));
        }

        Ok(())
    }
}
