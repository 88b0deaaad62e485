//! # Recalculation Orchestrator
//!
//! Re-derives every stored price that depends on a shared rate after that
//! rate changes.
//!
//! ## Cascade Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  USD rate changed                                                       │
//! │       │                                                                 │
//! │       ├──► every export variant: re-snapshot usd_rate,                  │
//! │       │    recompute ex_factory (purchase/packing/labour/profit fixed)  │
//! │       │                                                                 │
//! │       └──► every export price record: re-snapshot usd_rate,             │
//! │            recompute FOB + CNF (freight costs fixed)                    │
//! │                                                                         │
//! │  Air/sea tariff edited for a country                                    │
//! │       │                                                                 │
//! │       └──► every stored price of that freight type + country:           │
//! │            re-run the resolver fresh, recompute freight costs + CNF     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Batch Semantics
//! - Batches are serialized behind a `tokio::sync::Mutex`; a trigger that
//!   arrives mid-batch waits for the in-flight batch to finish
//! - Best-effort: a record that fails to load or write is logged and
//!   counted, the batch continues
//! - No retries; re-running the trigger re-derives everything idempotently
//! - A record whose country has no freight rate gets freight costs 0 with a
//!   warning - that is a price-list fact, not a batch error

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use marlin_core::costplus::{derive_ex_factory, CostInputs, ProfitInput};
use marlin_core::freight::{air_freight_costs, resolve_rate, sea_freight_cost};
use marlin_core::{cnf, validation, CoreError, FreightType, TierSet};
use marlin_db::Database;

use crate::error::RecalcResult;

// =============================================================================
// Batch Outcomes
// =============================================================================

/// Per-record tally of one best-effort batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Records successfully re-derived and written.
    pub updated: usize,
    /// Records that failed to write (logged, not retried).
    pub errors: usize,
}

impl BatchOutcome {
    fn record(&mut self, result: Result<(), marlin_db::DbError>, id: &str, what: &str) {
        match result {
            Ok(()) => self.updated += 1,
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to update {what}, continuing batch");
                self.errors += 1;
            }
        }
    }
}

/// Outcome of an exchange-rate cascade, which touches two record families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecalcReport {
    /// Export variants whose ex-factory price was re-derived.
    pub variants: BatchOutcome,
    /// Export price records whose FOB/CNF were re-derived.
    pub prices: BatchOutcome,
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Runs rate-change cascades over the store, one batch at a time.
///
/// ## Usage
/// ```rust,ignore
/// let orchestrator = Orchestrator::new(db);
/// let report = orchestrator.apply_usd_rate_change(dec!(310)).await?;
/// info!(updated = report.prices.updated, "USD cascade finished");
/// ```
pub struct Orchestrator {
    db: Database,
    /// Serializes rate-change batches.
    batch_lock: Mutex<()>,
}

impl Orchestrator {
    /// Creates a new orchestrator over the given database.
    pub fn new(db: Database) -> Self {
        Orchestrator {
            db,
            batch_lock: Mutex::new(()),
        }
    }

    /// Cascades a new exchange rate (LKR per USD) through every export
    /// variant and every export price record.
    ///
    /// Purchase costs, packing/labour costs, profit amounts, overhead lines
    /// and freight costs are all held fixed; only the rate snapshot and the
    /// values derived from it change.
    pub async fn apply_usd_rate_change(&self, new_rate: Decimal) -> RecalcResult<RecalcReport> {
        validation::validate_usd_rate(new_rate)?;
        let _guard = self.batch_lock.lock().await;
        info!(rate = %new_rate, "Starting USD rate cascade");

        let report = RecalcReport {
            variants: self.refresh_export_variants(new_rate).await?,
            prices: self.refresh_export_prices(new_rate).await?,
        };

        info!(
            variants_updated = report.variants.updated,
            variants_errors = report.variants.errors,
            prices_updated = report.prices.updated,
            prices_errors = report.prices.errors,
            "USD rate cascade finished"
        );
        Ok(report)
    }

    /// Re-resolves and recomputes air freight costs and CNF for every
    /// stored air-freight price of one destination country.
    pub async fn apply_air_rate_change(&self, country: &str) -> RecalcResult<BatchOutcome> {
        validation::validate_country(country)?;
        let _guard = self.batch_lock.lock().await;
        info!(country = %country, "Starting air tariff cascade");

        let history = self.db.freight_rates().list_air_for_country(country).await?;
        let records = self
            .db
            .export_prices()
            .list_by_freight_type(FreightType::Air, country)
            .await?;

        let mut outcome = BatchOutcome::default();
        for mut record in records {
            match resolve_rate(&history, &record.country, record.airport_code.as_deref()) {
                Ok(rate) => {
                    record.freight_costs =
                        air_freight_costs(&rate.rates, record.multiplier, record.divisor);
                }
                Err(CoreError::RateUnavailable { .. }) => {
                    warn!(
                        id = %record.id,
                        country = %record.country,
                        airport = ?record.airport_code,
                        "No air freight rate resolves, zeroing freight costs"
                    );
                    record.freight_costs = TierSet::zero();
                }
                Err(e) => {
                    warn!(id = %record.id, error = %e, "Air rate resolution failed");
                    outcome.errors += 1;
                    continue;
                }
            }
            cnf::reassemble(&mut record);
            let result = self.db.export_prices().update(&record).await;
            outcome.record(result, &record.id, "export price");
        }

        info!(
            updated = outcome.updated,
            errors = outcome.errors,
            "Air tariff cascade finished"
        );
        Ok(outcome)
    }

    /// Re-resolves and recomputes the sea freight cost and CNF for every
    /// stored sea-freight price of one destination country.
    pub async fn apply_sea_rate_change(&self, country: &str) -> RecalcResult<BatchOutcome> {
        validation::validate_country(country)?;
        let _guard = self.batch_lock.lock().await;
        info!(country = %country, "Starting sea tariff cascade");

        let history = self.db.freight_rates().list_sea_for_country(country).await?;
        let records = self
            .db
            .export_prices()
            .list_by_freight_type(FreightType::Sea, country)
            .await?;

        let mut outcome = BatchOutcome::default();
        for mut record in records {
            match resolve_rate(&history, &record.country, record.port_code.as_deref()) {
                Ok(rate) => {
                    record.freight_cost_sea = sea_freight_cost(rate, record.container_type);
                }
                Err(CoreError::RateUnavailable { .. }) => {
                    warn!(
                        id = %record.id,
                        country = %record.country,
                        port = ?record.port_code,
                        "No sea freight rate resolves, zeroing freight cost"
                    );
                    record.freight_cost_sea = Decimal::ZERO;
                }
                Err(e) => {
                    warn!(id = %record.id, error = %e, "Sea rate resolution failed");
                    outcome.errors += 1;
                    continue;
                }
            }
            cnf::reassemble(&mut record);
            let result = self.db.export_prices().update(&record).await;
            outcome.record(result, &record.id, "export price");
        }

        info!(
            updated = outcome.updated,
            errors = outcome.errors,
            "Sea tariff cascade finished"
        );
        Ok(outcome)
    }

    /// Re-snapshots the rate and re-derives the ex-factory price of every
    /// export variant, holding the stored profit amount fixed.
    async fn refresh_export_variants(&self, new_rate: Decimal) -> RecalcResult<BatchOutcome> {
        let variants = self.db.export_variants().list(None).await?;

        let mut outcome = BatchOutcome::default();
        for mut variant in variants {
            let inputs = CostInputs {
                purchasing_price: variant.purchasing_price,
                packing_cost: variant.packing_cost,
                labour_overhead: variant.labour_overhead,
                usd_rate: new_rate,
            };
            let breakdown = derive_ex_factory(&inputs, ProfitInput::Amount(variant.profit));

            variant.usd_rate = new_rate;
            variant.profit = breakdown.profit;
            variant.profit_margin = breakdown.profit_margin;
            variant.ex_factory_price = breakdown.ex_factory_price;

            let result = self.db.export_variants().update(&variant).await;
            outcome.record(result, &variant.id, "export variant");
        }
        Ok(outcome)
    }

    /// Re-snapshots the rate and re-derives FOB/CNF of every export price
    /// record, holding overhead lines and freight costs fixed.
    async fn refresh_export_prices(&self, new_rate: Decimal) -> RecalcResult<BatchOutcome> {
        let records = self.db.export_prices().list(None).await?;

        let mut outcome = BatchOutcome::default();
        for mut record in records {
            record.usd_rate = new_rate;
            cnf::reassemble(&mut record);

            let result = self.db.export_prices().update(&record).await;
            outcome.record(result, &record.id, "export price");
        }
        Ok(outcome)
    }
}

// =============================================================================
// Integration Tests (in-memory SQLite)
// =============================================================================
