//! # Cost-Plus Calculator (export ex-factory pricing)
//!
//! Export variants are priced cost-plus: the LKR purchase cost, plus
//! USD-denominated packing and labour costs converted at the variant's
//! exchange-rate snapshot, plus profit.
//!
//! ## Formula Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cost_price  = purchasing + packing_usd × rate + labour_usd × rate     │
//! │  ex_factory  = cost_price + profit                                      │
//! │                                                                         │
//! │  profit ⇄ margin inversion:                                             │
//! │    margin% = profit / (purchasing + profit) × 100    (0 on zero denom)  │
//! │    profit  = margin% × purchasing / (100 − margin%)  (0 at 0 or ≥100)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one of profit / profit margin is the authoritative input per
//! edit; the other and the ex-factory price are always re-derived. LKR
//! amounts round to 2 decimals, the margin percentage to 4 so that a
//! purchasing-price edit can re-derive the profit from it without drift.
//! The `usd_rate` snapshot is never user-edited - only an exchange-rate
//! recalculation batch refreshes it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::{round_money, round_percentage};

// =============================================================================
// Profit Input
// =============================================================================

/// The single authoritative profit field for one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitInput {
    /// Profit per unit in LKR.
    Amount(Decimal),
    /// Profit margin in percent (0 ≤ pct < 100).
    MarginPercent(Decimal),
}

/// Cost inputs of an export variant, exchange rate included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostInputs {
    /// Purchase cost in LKR.
    pub purchasing_price: Decimal,
    /// Packing cost in USD.
    pub packing_cost: Decimal,
    /// Labour overhead in USD.
    pub labour_overhead: Decimal,
    /// Exchange-rate snapshot, LKR per USD.
    pub usd_rate: Decimal,
}

/// The derived export pricing of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExFactoryBreakdown {
    /// Profit per unit in LKR.
    pub profit: Decimal,
    /// Profit margin in percent, derived from `profit`.
    pub profit_margin: Decimal,
    /// cost price + profit, in LKR.
    pub ex_factory_price: Decimal,
}

// =============================================================================
// Calculator
// =============================================================================

/// `purchasing + packing × rate + labour × rate`, in LKR.
///
/// A zero exchange rate leaves the USD costs unconverted (contributing 0),
/// matching the currency converter's "unconvertible means 0" contract.
pub fn cost_price(inputs: &CostInputs) -> Decimal {
    let rate = if inputs.usd_rate > Decimal::ZERO {
        inputs.usd_rate
    } else {
        Decimal::ZERO
    };
    round_money(inputs.purchasing_price + inputs.packing_cost * rate + inputs.labour_overhead * rate)
}

/// Derives profit, profit margin and ex-factory price from the cost inputs
/// and the one profit field the user edited.
///
/// ## Example
/// ```rust
/// use marlin_core::costplus::{derive_ex_factory, CostInputs, ProfitInput};
/// use rust_decimal::Decimal;
///
/// let inputs = CostInputs {
///     purchasing_price: Decimal::from(1000),
///     packing_cost: Decimal::from(2),
///     labour_overhead: Decimal::from(1),
///     usd_rate: Decimal::from(300),
/// };
/// let breakdown = derive_ex_factory(&inputs, ProfitInput::Amount(Decimal::from(250)));
/// // cost price 1000 + 600 + 300 = 1900, plus profit 250
/// assert_eq!(breakdown.ex_factory_price, Decimal::from(2150));
/// ```
pub fn derive_ex_factory(inputs: &CostInputs, profit_input: ProfitInput) -> ExFactoryBreakdown {
    let profit = match profit_input {
        ProfitInput::Amount(amount) => amount,
        ProfitInput::MarginPercent(pct) => profit_from_margin(inputs.purchasing_price, pct),
    };

    ExFactoryBreakdown {
        profit: round_money(profit),
        profit_margin: round_percentage(margin_from_profit(inputs.purchasing_price, profit)),
        ex_factory_price: round_money(cost_price(inputs) + profit),
    }
}

/// Re-derives the breakdown after a cost-input edit.
///
/// When the purchase price changed and a profit margin was previously set,
/// the profit is re-derived from that margin first; otherwise the stored
/// profit amount is held fixed. After an external import where both fields
/// are present, the profit amount wins.
pub fn reprice_for_costs(
    inputs: &CostInputs,
    current: &ExFactoryBreakdown,
    purchasing_changed: bool,
) -> ExFactoryBreakdown {
    let input = if purchasing_changed && !current.profit_margin.is_zero() {
        ProfitInput::MarginPercent(current.profit_margin)
    } else {
        ProfitInput::Amount(current.profit)
    };
    derive_ex_factory(inputs, input)
}

/// `profit / (purchasing + profit) × 100`, with a zero denominator mapping
/// to 0.
fn margin_from_profit(purchasing_price: Decimal, profit: Decimal) -> Decimal {
    let denominator = purchasing_price + profit;
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    profit / denominator * Decimal::ONE_HUNDRED
}

/// `margin% × purchasing / (100 − margin%)`, 0 when the percentage is 0 or
/// at/above 100.
fn profit_from_margin(purchasing_price: Decimal, pct: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    if pct <= Decimal::ZERO || pct >= hundred {
        return Decimal::ZERO;
    }
    pct * purchasing_price / (hundred - pct)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs() -> CostInputs {
        CostInputs {
            purchasing_price: dec!(1000),
            packing_cost: dec!(2),
            labour_overhead: dec!(1),
            usd_rate: dec!(300),
        }
    }

    #[test]
    fn test_cost_price() {
        // 1000 + 2×300 + 1×300
        assert_eq!(cost_price(&inputs()), dec!(1900));
    }

    #[test]
    fn test_cost_price_zero_rate_leaves_usd_unconverted() {
        let zero_rate = CostInputs {
            usd_rate: Decimal::ZERO,
            ..inputs()
        };
        assert_eq!(cost_price(&zero_rate), dec!(1000));
    }

    #[test]
    fn test_profit_amount_drives_margin() {
        let breakdown = derive_ex_factory(&inputs(), ProfitInput::Amount(dec!(250)));
        assert_eq!(breakdown.profit, dec!(250));
        assert_eq!(breakdown.ex_factory_price, dec!(2150));
        // 250 / 1250 × 100
        assert_eq!(breakdown.profit_margin, dec!(20));
    }

    #[test]
    fn test_margin_percent_drives_profit() {
        let breakdown = derive_ex_factory(&inputs(), ProfitInput::MarginPercent(dec!(20)));
        // 20 × 1000 / 80 = 250
        assert_eq!(breakdown.profit, dec!(250));
        assert_eq!(breakdown.ex_factory_price, dec!(2150));
        assert_eq!(breakdown.profit_margin, dec!(20));
    }

    #[test]
    fn test_profit_margin_round_trip() {
        let first = derive_ex_factory(&inputs(), ProfitInput::Amount(dec!(333.33)));
        let second = derive_ex_factory(&inputs(), ProfitInput::MarginPercent(first.profit_margin));
        assert!((second.profit - dec!(333.33)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_stored_margin_reprices_within_a_cent() {
        // a margin that is not exactly representable at 2 decimals:
        // 237.50 on 812.30 gives 22.6234%, and a purchasing edit that
        // re-derives the profit from it must land back within a cent
        let odd = CostInputs {
            purchasing_price: dec!(812.30),
            ..inputs()
        };
        let current = derive_ex_factory(&odd, ProfitInput::Amount(dec!(237.50)));
        assert_eq!(current.profit_margin, dec!(22.6234));

        let repriced = reprice_for_costs(&odd, &current, true);
        assert!((repriced.profit - dec!(237.50)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_degenerate_margins_yield_zero_profit() {
        for pct in [dec!(0), dec!(100), dec!(150), dec!(-5)] {
            let breakdown = derive_ex_factory(&inputs(), ProfitInput::MarginPercent(pct));
            assert_eq!(breakdown.profit, Decimal::ZERO, "pct {pct}");
            assert_eq!(breakdown.ex_factory_price, dec!(1900));
        }
    }

    #[test]
    fn test_zero_denominator_margin_is_zero() {
        let free = CostInputs {
            purchasing_price: Decimal::ZERO,
            packing_cost: Decimal::ZERO,
            labour_overhead: Decimal::ZERO,
            usd_rate: dec!(300),
        };
        let breakdown = derive_ex_factory(&free, ProfitInput::Amount(Decimal::ZERO));
        assert_eq!(breakdown.profit_margin, Decimal::ZERO);
    }

    #[test]
    fn test_purchasing_edit_rederives_profit_from_margin() {
        let current = derive_ex_factory(&inputs(), ProfitInput::MarginPercent(dec!(20)));
        let raised = CostInputs {
            purchasing_price: dec!(1200),
            ..inputs()
        };
        let repriced = reprice_for_costs(&raised, &current, true);
        // 20 × 1200 / 80 = 300
        assert_eq!(repriced.profit, dec!(300));
        assert_eq!(repriced.ex_factory_price, dec!(1200) + dec!(900) + dec!(300));
    }

    #[test]
    fn test_non_purchasing_edit_holds_profit_amount() {
        let current = derive_ex_factory(&inputs(), ProfitInput::Amount(dec!(250)));
        let more_packing = CostInputs {
            packing_cost: dec!(3),
            ..inputs()
        };
        let repriced = reprice_for_costs(&more_packing, &current, false);
        assert_eq!(repriced.profit, dec!(250));
        // 1000 + 900 + 300 + 250
        assert_eq!(repriced.ex_factory_price, dec!(2450));
    }

    #[test]
    fn test_exchange_rate_refresh_holds_profit_fixed() {
        // the orchestrator's exchange-rate path: same inputs, new rate,
        // profit untouched
        let current = derive_ex_factory(&inputs(), ProfitInput::Amount(dec!(250)));
        let new_rate = CostInputs {
            usd_rate: dec!(310),
            ..inputs()
        };
        let repriced = reprice_for_costs(&new_rate, &current, false);
        assert_eq!(repriced.profit, dec!(250));
        // 1000 + 2×310 + 1×310 + 250
        assert_eq!(repriced.ex_factory_price, dec!(2180));
    }
}
