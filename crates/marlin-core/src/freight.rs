//! # Freight Module
//!
//! Rate resolution and freight cost calculation, air and sea.
//!
//! ## Rate Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TWO-TIER MATCH: exact location first, else country-wide,              │
//! │                  always latest effective date                          │
//! │                                                                         │
//! │  Customer: country=Japan, airport=HND                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Filter history to country == "japan" (case-insensitive)               │
//! │       │                                                                 │
//! │       ├── empty? ──► RateUnavailable (caller zeroes freight + warns)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Rows with airport == "hnd"?                                            │
//! │       ├── yes ──► select within that subset                            │
//! │       └── no  ──► select within the country subset                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Max effective_date, ties broken by greatest id (deterministic)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An exact location match beats date recency across non-matching
//! locations: a 2024-01 HND row wins over a 2024-06 NRT row for an HND
//! customer.
//!
//! ## Freight Costs
//! - Air: `tier_cost = multiplier × tier_rate / divisor` for each of the
//!   four weight tiers; a missing multiplier or a degenerate divisor yields
//!   four zeros, not an error
//! - Sea: the chosen container's precomputed per-kilo rate (4 decimals);
//!   no container chosen means 0

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::currency::round_money;
use crate::error::{CoreError, CoreResult};
use crate::types::{AirFreightRate, ContainerType, SeaFreightRate, TierSet};

// =============================================================================
// Rate Row Seam
// =============================================================================

/// The fields rate resolution needs, shared by air and sea rows.
pub trait RateRow {
    fn id(&self) -> &str;
    fn country(&self) -> &str;
    /// Airport code for air rows, port code for sea rows.
    fn location(&self) -> Option<&str>;
    fn effective_date(&self) -> NaiveDate;
}

impl RateRow for AirFreightRate {
    fn id(&self) -> &str {
        &self.id
    }
    fn country(&self) -> &str {
        &self.country
    }
    fn location(&self) -> Option<&str> {
        self.airport_code.as_deref()
    }
    fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }
}

impl RateRow for SeaFreightRate {
    fn id(&self) -> &str {
        &self.id
    }
    fn country(&self) -> &str {
        &self.country
    }
    fn location(&self) -> Option<&str> {
        Some(&self.port_code)
    }
    fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Selects the applicable rate row for a customer's country and optional
/// location code.
///
/// This two-tier "exact-location-first, else country-wide, always-latest-
/// date" policy is the sole rate-selection rule for both air and sea.
///
/// ## Errors
/// [`CoreError::RateUnavailable`] when no row matches the country at all.
pub fn resolve_rate<'a, R: RateRow>(
    history: &'a [R],
    country: &str,
    location: Option<&str>,
) -> CoreResult<&'a R> {
    let country_rows: Vec<&R> = history
        .iter()
        .filter(|row| row.country().eq_ignore_ascii_case(country))
        .collect();

    if country_rows.is_empty() {
        return Err(CoreError::RateUnavailable {
            country: country.to_string(),
            location: location.map(str::to_string),
        });
    }

    let candidates: Vec<&R> = match location {
        Some(code) if !code.trim().is_empty() => {
            let exact: Vec<&R> = country_rows
                .iter()
                .copied()
                .filter(|row| {
                    row.location()
                        .is_some_and(|l| l.eq_ignore_ascii_case(code.trim()))
                })
                .collect();
            if exact.is_empty() {
                country_rows
            } else {
                exact
            }
        }
        _ => country_rows,
    };

    // Latest effective date wins; equal dates fall back to the greatest id
    // so the pick stays deterministic
    candidates
        .into_iter()
        .max_by(|a, b| {
            a.effective_date()
                .cmp(&b.effective_date())
                .then_with(|| a.id().cmp(b.id()))
        })
        .ok_or_else(|| CoreError::RateUnavailable {
            country: country.to_string(),
            location: location.map(str::to_string),
        })
}

// =============================================================================
// Freight Cost Calculator
// =============================================================================

/// Per-tier air freight costs: `multiplier × rate / divisor`, 2 decimals.
///
/// A missing multiplier or a divisor below 1 short-circuits to four zeros;
/// the price record stays saveable and the caller may warn.
pub fn air_freight_costs(
    rates: &TierSet,
    multiplier: Option<Decimal>,
    divisor: Decimal,
) -> TierSet {
    let Some(multiplier) = multiplier else {
        return TierSet::zero();
    };
    if divisor < Decimal::ONE {
        return TierSet::zero();
    }
    rates.map(|rate| round_money(multiplier * rate / divisor))
}

/// Sea freight cost per kilo for the chosen container, 4 decimals.
///
/// No container chosen means 0.
pub fn sea_freight_cost(rate: &SeaFreightRate, container: Option<ContainerType>) -> Decimal {
    match container {
        Some(container) => rate.freight_per_kilo(container),
        None => Decimal::ZERO,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn air_rate(id: &str, country: &str, airport: Option<&str>, date: &str) -> AirFreightRate {
        AirFreightRate {
            id: id.to_string(),
            country: country.to_string(),
            airport_code: airport.map(str::to_string),
            rates: TierSet {
                kg45: dec!(3.69),
                kg100: dec!(3.20),
                kg300: dec!(2.95),
                kg500: dec!(2.80),
            },
            effective_date: date.parse().unwrap(),
            updated_at: Utc::now(),
        }
    }

    fn sea_rate(id: &str, country: &str, port: &str, date: &str) -> SeaFreightRate {
        let mut rate = SeaFreightRate {
            id: id.to_string(),
            country: country.to_string(),
            port_code: port.to_string(),
            port_name: port.to_string(),
            rate_20ft: dec!(2450),
            kilos_20ft: dec!(26000),
            rate_40ft: dec!(3900),
            kilos_40ft: dec!(52000),
            freight_per_kilo_20ft: Decimal::ZERO,
            freight_per_kilo_40ft: Decimal::ZERO,
            effective_date: date.parse().unwrap(),
            updated_at: Utc::now(),
        };
        rate.derive_per_kilo();
        rate
    }

    #[test]
    fn test_exact_airport_match_beats_date_recency() {
        let history = vec![
            air_rate("a1", "Japan", Some("NRT"), "2024-01-01"),
            air_rate("a2", "Japan", Some("HND"), "2024-06-01"),
        ];
        // HND customer must get the HND row even if an NRT row were newer
        let resolved = resolve_rate(&history, "Japan", Some("HND")).unwrap();
        assert_eq!(resolved.id, "a2");

        let history = vec![
            air_rate("a1", "Japan", Some("NRT"), "2024-06-01"),
            air_rate("a2", "Japan", Some("HND"), "2024-01-01"),
        ];
        let resolved = resolve_rate(&history, "Japan", Some("HND")).unwrap();
        assert_eq!(resolved.id, "a2");
    }

    #[test]
    fn test_country_fallback_when_no_exact_airport() {
        let history = vec![
            air_rate("a1", "Japan", Some("NRT"), "2024-01-01"),
            air_rate("a2", "Japan", Some("HND"), "2024-06-01"),
        ];
        // KIX has no exact match: most recent Japan row wins
        let resolved = resolve_rate(&history, "Japan", Some("KIX")).unwrap();
        assert_eq!(resolved.id, "a2");
    }

    #[test]
    fn test_latest_date_within_matching_subset() {
        let history = vec![
            air_rate("a1", "Japan", Some("NRT"), "2024-01-01"),
            air_rate("a2", "Japan", Some("NRT"), "2024-06-01"),
            air_rate("a3", "Japan", Some("NRT"), "2024-03-01"),
        ];
        let resolved = resolve_rate(&history, "Japan", Some("NRT")).unwrap();
        assert_eq!(resolved.id, "a2");
    }

    #[test]
    fn test_equal_dates_break_ties_by_greatest_id() {
        let history = vec![
            air_rate("a1", "Japan", Some("NRT"), "2024-06-01"),
            air_rate("a2", "Japan", Some("NRT"), "2024-06-01"),
        ];
        let resolved = resolve_rate(&history, "Japan", Some("NRT")).unwrap();
        assert_eq!(resolved.id, "a2");
    }

    #[test]
    fn test_country_match_is_case_insensitive() {
        let history = vec![air_rate("a1", "Japan", None, "2024-01-01")];
        assert!(resolve_rate(&history, "JAPAN", None).is_ok());
        assert!(resolve_rate(&history, "japan", Some("nrt")).is_ok());
    }

    #[test]
    fn test_unknown_country_is_rate_unavailable() {
        let history = vec![air_rate("a1", "Japan", None, "2024-01-01")];
        let err = resolve_rate(&history, "Norway", Some("OSL")).unwrap_err();
        assert!(matches!(err, CoreError::RateUnavailable { .. }));
    }

    #[test]
    fn test_sea_resolution_uses_port_code() {
        let history = vec![
            sea_rate("s1", "Japan", "JPYOK", "2024-01-01"),
            sea_rate("s2", "Japan", "JPTYO", "2024-06-01"),
        ];
        let resolved = resolve_rate(&history, "Japan", Some("JPYOK")).unwrap();
        assert_eq!(resolved.id, "s1");
    }

    #[test]
    fn test_air_freight_costs_example() {
        let rates = TierSet {
            kg45: dec!(3.69),
            kg100: dec!(3.20),
            kg300: dec!(2.95),
            kg500: dec!(2.80),
        };
        let costs = air_freight_costs(&rates, Some(dec!(150)), Decimal::ONE);
        assert_eq!(costs.kg45, dec!(553.50));
        assert_eq!(costs.kg100, dec!(480.00));
        assert_eq!(costs.kg300, dec!(442.50));
        assert_eq!(costs.kg500, dec!(420.00));
    }

    #[test]
    fn test_air_freight_divisor_scales_down() {
        let rates = TierSet {
            kg45: dec!(3.69),
            kg100: dec!(3.20),
            kg300: dec!(2.95),
            kg500: dec!(2.80),
        };
        let costs = air_freight_costs(&rates, Some(dec!(150)), dec!(2));
        assert_eq!(costs.kg45, dec!(276.75));
    }

    #[test]
    fn test_air_freight_degenerate_inputs_yield_zero() {
        let rates = TierSet {
            kg45: dec!(3.69),
            kg100: dec!(3.20),
            kg300: dec!(2.95),
            kg500: dec!(2.80),
        };
        assert!(air_freight_costs(&rates, None, Decimal::ONE).is_zero());
        assert!(air_freight_costs(&rates, Some(dec!(150)), Decimal::ZERO).is_zero());
        assert!(air_freight_costs(&rates, Some(dec!(150)), dec!(0.5)).is_zero());
    }

    #[test]
    fn test_sea_freight_cost_per_container() {
        let rate = sea_rate("s1", "Japan", "JPYOK", "2024-06-01");
        assert_eq!(
            sea_freight_cost(&rate, Some(ContainerType::TwentyFt)),
            dec!(0.0942)
        );
        assert_eq!(
            sea_freight_cost(&rate, Some(ContainerType::FortyFt)),
            dec!(0.0750)
        );
        assert_eq!(sea_freight_cost(&rate, None), Decimal::ZERO);
    }
}
