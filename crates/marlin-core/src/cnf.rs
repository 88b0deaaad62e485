//! # FOB/CNF Assembler
//!
//! Combines the ex-factory price with the export overhead lines to produce
//! FOB (LKR), then adds freight (USD) to produce CNF per tier or container.
//!
//! ## Assembly Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ex_factory (LKR)                                                       │
//! │       │                                                                 │
//! │       + documentation + transport + loading + airway + forwarding      │
//! │       │   (each line enterable in USD or LKR; the edited side drives   │
//! │       │    the other through the currency converter)                   │
//! │       ▼                                                                 │
//! │  FOB (LKR)                                                              │
//! │       │                                                                 │
//! │       ÷ usd_rate                     ÷ usd_rate                         │
//! │       + tier freight cost (air)      + per-kilo freight cost (sea)     │
//! │       ▼                              ▼                                  │
//! │  CNF per weight tier (USD)       CNF sea (USD)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Switching freight type clears the *other* type's freight-cost and CNF
//! fields so a record never carries stale mixed-type data.

use rust_decimal::Decimal;

use crate::currency::{round_money, to_lkr, to_usd};
use crate::types::{CostLine, ExportCustomerPrice, FreightType, TierSet};
use crate::DEFAULT_DIVISOR;

// =============================================================================
// Overhead Lines
// =============================================================================

/// Which side of an overhead cost line the user edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSide {
    Usd(Decimal),
    Lkr(Decimal),
}

/// Rebuilds a cost line from the edited side, deriving the other through
/// the currency converter.
///
/// With an unconvertible (zero) rate the derived side becomes 0; the
/// entered side is kept so the user's input is never lost.
pub fn enter_cost_line(side: CostSide, usd_rate: Decimal) -> CostLine {
    match side {
        CostSide::Usd(usd) => CostLine {
            usd: round_money(usd),
            lkr: to_lkr(usd, usd_rate),
        },
        CostSide::Lkr(lkr) => CostLine {
            usd: to_usd(lkr, usd_rate),
            lkr: round_money(lkr),
        },
    }
}

// =============================================================================
// FOB / CNF
// =============================================================================

/// `fob = ex_factory + Σ overhead LKR`, 2 decimals.
pub fn fob_price(ex_factory_price: Decimal, overhead_total_lkr: Decimal) -> Decimal {
    round_money(ex_factory_price + overhead_total_lkr)
}

/// Per-tier CNF: `fob / usd_rate + tier freight cost`, 2 decimals.
///
/// An unconvertible rate leaves only the freight component.
pub fn cnf_air(fob_price_lkr: Decimal, usd_rate: Decimal, freight_costs: &TierSet) -> TierSet {
    let fob_usd = to_usd(fob_price_lkr, usd_rate);
    freight_costs.map(|cost| round_money(fob_usd + cost))
}

/// Sea CNF: `fob / usd_rate + per-kilo freight cost`, 2 decimals.
pub fn cnf_sea(fob_price_lkr: Decimal, usd_rate: Decimal, freight_cost_sea: Decimal) -> Decimal {
    round_money(to_usd(fob_price_lkr, usd_rate) + freight_cost_sea)
}

/// Recomputes the derived FOB and CNF fields of a price record in place,
/// from its stored inputs.
///
/// Freight costs themselves are NOT touched here - they belong to the
/// freight calculator. This is the function the exchange-rate cascade runs
/// with a fresh `usd_rate` already written onto the record.
pub fn reassemble(record: &mut ExportCustomerPrice) {
    record.fob_price = fob_price(record.ex_factory_price, record.overheads.total_lkr());
    match record.freight_type {
        FreightType::Air => {
            record.cnf = cnf_air(record.fob_price, record.usd_rate, &record.freight_costs);
            record.cnf_sea = Decimal::ZERO;
        }
        FreightType::Sea => {
            record.cnf_sea = cnf_sea(record.fob_price, record.usd_rate, record.freight_cost_sea);
            record.cnf = TierSet::zero();
        }
    }
}

/// Switches a record's freight type, clearing the other type's fields.
///
/// Entering sea mode also clears `multiplier`/`divisor`; switching back to
/// air leaves them cleared for re-entry. A no-op when the type is unchanged.
pub fn switch_freight_type(record: &mut ExportCustomerPrice, freight_type: FreightType) {
    if record.freight_type == freight_type {
        return;
    }
    record.freight_type = freight_type;
    match freight_type {
        FreightType::Air => {
            record.container_type = None;
            record.freight_cost_sea = Decimal::ZERO;
            record.cnf_sea = Decimal::ZERO;
        }
        FreightType::Sea => {
            record.multiplier = None;
            record.divisor = Decimal::from(DEFAULT_DIVISOR);
            record.freight_costs = TierSet::zero();
            record.cnf = TierSet::zero();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerType, OverheadCosts, ProductSnapshot};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn record(freight_type: FreightType) -> ExportCustomerPrice {
        ExportCustomerPrice {
            id: "p1".to_string(),
            customer_id: "c1".to_string(),
            variant_id: "v1".to_string(),
            snapshot: ProductSnapshot {
                common_name: "Yellowfin Tuna".to_string(),
                category: "Fresh Fish".to_string(),
                size_range: "20-30kg".to_string(),
            },
            ex_factory_price: dec!(45000),
            usd_rate: dec!(300),
            overheads: OverheadCosts {
                documentation: CostLine { usd: dec!(5), lkr: dec!(1500) },
                transport: CostLine { usd: dec!(10), lkr: dec!(3000) },
                loading: CostLine { usd: dec!(1), lkr: dec!(300) },
                airway: CostLine { usd: dec!(0.5), lkr: dec!(150) },
                forwarding: CostLine { usd: dec!(0.17), lkr: dec!(50) },
            },
            fob_price: Decimal::ZERO,
            freight_type,
            country: "Japan".to_string(),
            airport_code: Some("HND".to_string()),
            port_code: None,
            multiplier: Some(dec!(150)),
            divisor: Decimal::ONE,
            freight_costs: TierSet {
                kg45: dec!(553.50),
                kg100: dec!(480.00),
                kg300: dec!(442.50),
                kg500: dec!(420.00),
            },
            cnf: TierSet::zero(),
            container_type: None,
            freight_cost_sea: Decimal::ZERO,
            cnf_sea: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_enter_cost_line_from_usd() {
        let line = enter_cost_line(CostSide::Usd(dec!(5)), dec!(300));
        assert_eq!(line.usd, dec!(5.00));
        assert_eq!(line.lkr, dec!(1500.00));
    }

    #[test]
    fn test_enter_cost_line_from_lkr() {
        let line = enter_cost_line(CostSide::Lkr(dec!(1500)), dec!(300));
        assert_eq!(line.usd, dec!(5.00));
        assert_eq!(line.lkr, dec!(1500.00));
    }

    #[test]
    fn test_enter_cost_line_keeps_input_on_zero_rate() {
        let line = enter_cost_line(CostSide::Lkr(dec!(1500)), Decimal::ZERO);
        assert_eq!(line.lkr, dec!(1500.00));
        assert_eq!(line.usd, Decimal::ZERO);
    }

    #[test]
    fn test_cnf_air_example() {
        // fob 50,000 LKR at 300 LKR/USD with a 553.50 freight tier
        let freight = TierSet {
            kg45: dec!(553.50),
            kg100: dec!(480.00),
            kg300: dec!(442.50),
            kg500: dec!(420.00),
        };
        let cnf = cnf_air(dec!(50000), dec!(300), &freight);
        assert_eq!(cnf.kg45, dec!(720.17));
        assert_eq!(cnf.kg100, dec!(646.67));
    }

    #[test]
    fn test_cnf_sea() {
        assert_eq!(cnf_sea(dec!(50000), dec!(300), dec!(0.0942)), dec!(166.76));
    }

    #[test]
    fn test_reassemble_air_record() {
        let mut record = record(FreightType::Air);
        reassemble(&mut record);
        // 45,000 + 5,000 overhead LKR
        assert_eq!(record.fob_price, dec!(50000.00));
        assert_eq!(record.cnf.kg45, dec!(720.17));
        assert_eq!(record.cnf_sea, Decimal::ZERO);
    }

    #[test]
    fn test_reassemble_sea_record() {
        let mut record = record(FreightType::Sea);
        record.freight_costs = TierSet::zero();
        record.container_type = Some(ContainerType::TwentyFt);
        record.freight_cost_sea = dec!(0.0942);
        reassemble(&mut record);
        assert_eq!(record.fob_price, dec!(50000.00));
        assert_eq!(record.cnf_sea, dec!(166.76));
        assert!(record.cnf.is_zero());
    }

    #[test]
    fn test_reassemble_is_idempotent() {
        let mut record = record(FreightType::Air);
        reassemble(&mut record);
        let first = record.clone();
        reassemble(&mut record);
        assert_eq!(record.fob_price, first.fob_price);
        assert_eq!(record.cnf, first.cnf);
    }

    #[test]
    fn test_switch_to_sea_clears_air_fields() {
        let mut record = record(FreightType::Air);
        reassemble(&mut record);
        switch_freight_type(&mut record, FreightType::Sea);

        assert_eq!(record.freight_type, FreightType::Sea);
        assert!(record.freight_costs.is_zero());
        assert!(record.cnf.is_zero());
        assert_eq!(record.multiplier, None);
        assert_eq!(record.divisor, Decimal::ONE);
    }

    #[test]
    fn test_switch_to_air_clears_sea_fields() {
        let mut record = record(FreightType::Sea);
        record.container_type = Some(ContainerType::TwentyFt);
        record.freight_cost_sea = dec!(0.0942);
        record.cnf_sea = dec!(166.76);

        switch_freight_type(&mut record, FreightType::Air);
        assert_eq!(record.container_type, None);
        assert_eq!(record.freight_cost_sea, Decimal::ZERO);
        assert_eq!(record.cnf_sea, Decimal::ZERO);
    }

    #[test]
    fn test_switch_to_same_type_is_a_noop() {
        let mut record = record(FreightType::Air);
        reassemble(&mut record);
        let before = record.clone();
        switch_freight_type(&mut record, FreightType::Air);
        assert_eq!(record.cnf, before.cnf);
        assert_eq!(record.multiplier, before.multiplier);
    }
}
