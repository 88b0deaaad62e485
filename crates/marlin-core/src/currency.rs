//! # Currency Module
//!
//! LKR⇄USD conversion and the crate-wide rounding policy.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In f64 arithmetic:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  An export quotation repeats the same conversion over hundreds of      │
//! │  price records; a drifting CNF is a real commercial dispute.           │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Exact base-10 arithmetic, explicit rounding at the storage edge:    │
//! │    2 decimals for LKR/USD totals, 4 decimals for sea per-kilo rates    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unconvertible Values
//! A zero or missing exchange rate means "unconvertible". The converter
//! returns 0 instead of erroring so that a half-entered record can still be
//! saved and displayed; callers may flag the 0 as a warning.
//!
//! ## Usage
//! ```rust
//! use marlin_core::currency::{to_usd, to_lkr};
//! use rust_decimal::Decimal;
//!
//! let rate = Decimal::from(300); // 300 LKR per USD
//!
//! let usd = to_usd(Decimal::from(50_000), rate);
//! assert_eq!(usd, Decimal::new(16_667, 2)); // 166.67
//!
//! let lkr = to_lkr(Decimal::new(250, 1), rate); // 25.0 USD
//! assert_eq!(lkr, Decimal::from(7_500));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for LKR/USD monetary totals.
const MONEY_DP: u32 = 2;

/// Decimal places for sea freight per-kilo rates.
const PER_KILO_DP: u32 = 4;

/// Decimal places for stored percentages (margins, profit margins).
const PERCENT_DP: u32 = 4;

// =============================================================================
// Rounding
// =============================================================================

/// Rounds a monetary total (LKR or USD) to 2 decimal places, half away
/// from zero.
///
/// Every value that crosses the storage boundary goes through this (or
/// [`round_per_kilo`]) exactly once.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a sea-freight per-kilo rate to 4 decimal places.
///
/// ## Why 4 Decimals?
/// A container rate divided by its capacity (e.g. 2450 USD / 26000 kg =
/// 0.0942 USD/kg) would collapse to 0.09 at 2 decimals and skew the CNF by
/// whole dollars on large shipments.
#[inline]
pub fn round_per_kilo(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PER_KILO_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a stored percentage to 4 decimal places.
///
/// ## Why 4 Decimals?
/// Percentages feed back through the inversion
/// `purchasing × pct / (100 − pct)` on a purchasing-price edit. At 2
/// decimals that inversion drifts up to ~0.05 LKR on non-round inputs;
/// at 4 the monetary round trip stays within a cent. Display layers may
/// truncate further.
#[inline]
pub fn round_percentage(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Conversion
// =============================================================================

/// Converts an LKR amount to USD at the given rate (LKR per USD).
///
/// ## Contract
/// - `rate > 0`: returns `lkr / rate` rounded to 2 decimals
/// - `rate <= 0`: returns 0 (unconvertible, never an error)
///
/// ## Example
/// ```rust
/// use marlin_core::currency::to_usd;
/// use rust_decimal::Decimal;
///
/// assert_eq!(to_usd(Decimal::from(600), Decimal::from(300)), Decimal::from(2));
/// assert_eq!(to_usd(Decimal::from(600), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn to_usd(lkr: Decimal, rate: Decimal) -> Decimal {
    if rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_money(lkr / rate)
}

/// Converts a USD amount to LKR at the given rate (LKR per USD).
///
/// ## Contract
/// - `rate > 0`: returns `usd * rate` rounded to 2 decimals
/// - `rate <= 0`: returns 0 (unconvertible, never an error)
///
/// Round-trip tolerance: `to_lkr(to_usd(x, r), r)` reproduces `x` within
/// 2-decimal rounding.
pub fn to_lkr(usd: Decimal, rate: Decimal) -> Decimal {
    if rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_money(usd * rate)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_usd_basic() {
        assert_eq!(to_usd(dec!(50000), dec!(300)), dec!(166.67));
        assert_eq!(to_usd(dec!(600), dec!(300)), dec!(2.00));
    }

    #[test]
    fn test_to_lkr_basic() {
        assert_eq!(to_lkr(dec!(25), dec!(300)), dec!(7500.00));
        assert_eq!(to_lkr(dec!(1.5), dec!(310.25)), dec!(465.38));
    }

    #[test]
    fn test_zero_rate_is_unconvertible_not_an_error() {
        assert_eq!(to_usd(dec!(1000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(to_lkr(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(to_usd(dec!(1000), dec!(-300)), Decimal::ZERO);
    }

    #[test]
    fn test_round_trip_within_a_cent() {
        // LKR -> USD rounds to a cent of USD, so the reconstructed LKR can
        // drift by up to half a USD cent times the rate
        let rate = dec!(302.75);
        let tolerance = rate * dec!(0.005) + dec!(0.01);
        for lkr in [dec!(123.45), dec!(50000), dec!(0.01), dec!(99999.99)] {
            let back = to_lkr(to_usd(lkr, rate), rate);
            assert!(
                (back - lkr).abs() <= tolerance,
                "round trip drifted: {lkr} -> {back}"
            );
        }
    }

    #[test]
    fn test_usd_round_trip_exact_within_cent() {
        let rate = dec!(300);
        for usd in [dec!(1.23), dec!(553.50), dec!(720.17)] {
            let back = to_usd(to_lkr(usd, rate), rate);
            assert!((back - usd).abs() <= dec!(0.01));
        }
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(720.16666)), dec!(720.17));
    }

    #[test]
    fn test_round_per_kilo() {
        // 2450 USD for a 26,000 kg container
        assert_eq!(round_per_kilo(dec!(2450) / dec!(26000)), dec!(0.0942));
    }
}
