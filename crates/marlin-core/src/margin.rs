//! # Margin Calculator (local pricing)
//!
//! Local customers are priced by margin: purchase price plus one of
//! {margin, margin percentage, selling price}, with the other two derived.
//!
//! ## Directional Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EDITED FIELD WINS                                                      │
//! │                                                                         │
//! │  edit margin ──────────► selling = purchasing + margin                  │
//! │                          margin% = margin / selling × 100               │
//! │                                                                         │
//! │  edit margin% ─────────► margin  = purchasing × m% / (100 − m%)         │
//! │                          selling = purchasing + margin                  │
//! │                                                                         │
//! │  edit selling ─────────► margin  = selling − purchasing (may be < 0)    │
//! │                          margin% = margin / selling × 100               │
//! │                                                                         │
//! │  edit purchasing ──────► re-derive from the recorded last input;        │
//! │                          when none is recorded (imported row), prefer   │
//! │                          margin% over margin over selling price         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The edited field is an explicit tagged [`PriceInput`], never inferred
//! from which stored field happens to be non-zero. All three stay
//! numerically consistent after every edit; amounts are rounded to 2
//! decimals and the percentage to 4 before storage. The percentage keeps
//! the extra precision because a purchasing-price edit re-derives the
//! margin from it.
//!
//! ## Safe Defaults
//! - a zero selling price yields `margin_percentage = 0`, not an error
//! - a selling price below purchase cost yields a negative margin - the
//!   record is saved and the loss is the caller's to flag
//! - `margin_percentage = 100` is undefined and must be rejected by
//!   [`crate::validation::validate_percentage`] before calling in here

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::{round_money, round_percentage};
use crate::types::PriceInputKind;

// =============================================================================
// Price Input
// =============================================================================

/// The single authoritative margin field for one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceInput {
    /// Margin in LKR.
    Margin(Decimal),
    /// Margin as a percentage of selling price (0 ≤ pct < 100).
    MarginPercent(Decimal),
    /// Selling price in LKR.
    SellingPrice(Decimal),
}

impl PriceInput {
    /// The tag recorded on the stored price row.
    pub fn kind(&self) -> PriceInputKind {
        match self {
            PriceInput::Margin(_) => PriceInputKind::Margin,
            PriceInput::MarginPercent(_) => PriceInputKind::MarginPercent,
            PriceInput::SellingPrice(_) => PriceInputKind::SellingPrice,
        }
    }
}

/// The mutually consistent margin trio after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginBreakdown {
    /// Margin in LKR. Negative when selling below cost.
    pub margin: Decimal,
    /// Margin as a percentage of selling price. 0 when selling price is 0.
    pub margin_percentage: Decimal,
    /// Selling price in LKR.
    pub selling_price: Decimal,
}

// =============================================================================
// Calculator
// =============================================================================

/// Derives the full margin trio from the purchase price and the one field
/// the user edited.
///
/// ## Example
/// ```rust
/// use marlin_core::margin::{derive_margin, PriceInput};
/// use rust_decimal::Decimal;
///
/// let trio = derive_margin(Decimal::from(800), PriceInput::Margin(Decimal::from(200)));
/// assert_eq!(trio.selling_price, Decimal::from(1000));
/// assert_eq!(trio.margin_percentage, Decimal::from(20));
/// ```
pub fn derive_margin(purchasing_price: Decimal, input: PriceInput) -> MarginBreakdown {
    let (margin, selling_price) = match input {
        PriceInput::Margin(margin) => (margin, purchasing_price + margin),
        PriceInput::MarginPercent(pct) => {
            let margin = margin_from_percentage(purchasing_price, pct);
            (margin, purchasing_price + margin)
        }
        PriceInput::SellingPrice(selling) => (selling - purchasing_price, selling),
    };

    MarginBreakdown {
        margin: round_money(margin),
        margin_percentage: round_percentage(percentage_of_selling(margin, selling_price)),
        selling_price: round_money(selling_price),
    }
}

/// Re-derives the trio after a purchase-price edit.
///
/// The previously authoritative field (recorded as `last_input`) keeps its
/// value and the other two follow the new purchase price. Imported rows
/// without a tag use the precedence margin% > margin > selling price,
/// skipping zero fields.
pub fn reprice_for_purchasing(
    purchasing_price: Decimal,
    current: &MarginBreakdown,
    last_input: Option<PriceInputKind>,
) -> MarginBreakdown {
    let input = match last_input {
        Some(PriceInputKind::Margin) => PriceInput::Margin(current.margin),
        Some(PriceInputKind::MarginPercent) => PriceInput::MarginPercent(current.margin_percentage),
        Some(PriceInputKind::SellingPrice) => PriceInput::SellingPrice(current.selling_price),
        None => infer_input(current),
    };
    derive_margin(purchasing_price, input)
}

/// Precedence for untagged rows: margin% over margin over selling price,
/// whichever is non-zero.
fn infer_input(current: &MarginBreakdown) -> PriceInput {
    if !current.margin_percentage.is_zero() {
        PriceInput::MarginPercent(current.margin_percentage)
    } else if !current.margin.is_zero() {
        PriceInput::Margin(current.margin)
    } else {
        PriceInput::SellingPrice(current.selling_price)
    }
}

/// `margin = purchasing × pct / (100 − pct)`.
///
/// Undefined at pct = 100 (validation rejects it upstream); a pct of 100 or
/// more reaching this function yields 0 rather than a division blow-up.
fn margin_from_percentage(purchasing_price: Decimal, pct: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    if pct <= Decimal::ZERO || pct >= hundred {
        return Decimal::ZERO;
    }
    purchasing_price * pct / (hundred - pct)
}

/// `margin / selling × 100`, with a zero selling price mapping to 0.
fn percentage_of_selling(margin: Decimal, selling_price: Decimal) -> Decimal {
    if selling_price.is_zero() {
        return Decimal::ZERO;
    }
    margin / selling_price * Decimal::ONE_HUNDRED
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_edit_margin() {
        let trio = derive_margin(dec!(800), PriceInput::Margin(dec!(200)));
        assert_eq!(trio.margin, dec!(200));
        assert_eq!(trio.selling_price, dec!(1000));
        assert_eq!(trio.margin_percentage, dec!(20));
    }

    #[test]
    fn test_edit_margin_percentage() {
        // 20% of selling on an 800 purchase: margin = 800 × 20 / 80 = 200
        let trio = derive_margin(dec!(800), PriceInput::MarginPercent(dec!(20)));
        assert_eq!(trio.margin, dec!(200));
        assert_eq!(trio.selling_price, dec!(1000));
        assert_eq!(trio.margin_percentage, dec!(20));
    }

    #[test]
    fn test_edit_selling_price() {
        let trio = derive_margin(dec!(800), PriceInput::SellingPrice(dec!(1000)));
        assert_eq!(trio.margin, dec!(200));
        assert_eq!(trio.margin_percentage, dec!(20));
    }

    #[test]
    fn test_selling_below_cost_flags_a_loss_not_an_error() {
        let trio = derive_margin(dec!(800), PriceInput::SellingPrice(dec!(700)));
        assert_eq!(trio.margin, dec!(-100));
        assert_eq!(trio.margin_percentage, dec!(-14.2857));
    }

    #[test]
    fn test_zero_selling_price_gives_zero_percentage() {
        let trio = derive_margin(dec!(0), PriceInput::SellingPrice(dec!(0)));
        assert_eq!(trio.margin_percentage, Decimal::ZERO);
        assert_eq!(trio.margin, Decimal::ZERO);
    }

    #[test]
    fn test_trio_consistency_across_inputs() {
        // selling = purchasing + margin must hold for every input kind
        for input in [
            PriceInput::Margin(dec!(123.45)),
            PriceInput::MarginPercent(dec!(35)),
            PriceInput::SellingPrice(dec!(950.10)),
        ] {
            let trio = derive_margin(dec!(812.30), input);
            assert!(
                (trio.selling_price - dec!(812.30) - trio.margin).abs() <= dec!(0.01),
                "inconsistent trio for {input:?}: {trio:?}"
            );
        }
    }

    #[test]
    fn test_margin_round_trip_within_a_cent() {
        // edit margin, read back the derived percentage, re-derive margin
        let original = dec!(237.50);
        let first = derive_margin(dec!(812.30), PriceInput::Margin(original));
        let second = derive_margin(
            dec!(812.30),
            PriceInput::MarginPercent(first.margin_percentage),
        );
        assert!((second.margin - original).abs() <= dec!(0.01));
    }

    #[test]
    fn test_stored_percentage_reprices_within_a_cent() {
        // a percentage-tagged row survives storage and a purchasing edit:
        // 237.50 on 812.30 gives 22.6234%, which must re-derive the same
        // margin, not a 2-decimal approximation of it
        let current = derive_margin(dec!(812.30), PriceInput::Margin(dec!(237.50)));
        assert_eq!(current.margin_percentage, dec!(22.6234));

        let repriced =
            reprice_for_purchasing(dec!(812.30), &current, Some(PriceInputKind::MarginPercent));
        assert!((repriced.margin - dec!(237.50)).abs() <= dec!(0.01));

        // same holds for an untagged row, where the percentage wins
        let repriced = reprice_for_purchasing(dec!(812.30), &current, None);
        assert!((repriced.margin - dec!(237.50)).abs() <= dec!(0.01));
    }

    #[test]
    fn test_purchasing_edit_uses_recorded_input() {
        let current = derive_margin(dec!(800), PriceInput::Margin(dec!(200)));
        // purchase rises; recorded margin of 200 is held fixed
        let repriced =
            reprice_for_purchasing(dec!(900), &current, Some(PriceInputKind::Margin));
        assert_eq!(repriced.margin, dec!(200));
        assert_eq!(repriced.selling_price, dec!(1100));
    }

    #[test]
    fn test_purchasing_edit_prefers_percentage_when_untagged() {
        let current = MarginBreakdown {
            margin: dec!(200),
            margin_percentage: dec!(20),
            selling_price: dec!(1000),
        };
        let repriced = reprice_for_purchasing(dec!(900), &current, None);
        // 20% wins over the stale margin amount: 900 × 20 / 80 = 225
        assert_eq!(repriced.margin, dec!(225));
        assert_eq!(repriced.selling_price, dec!(1125));
    }

    #[test]
    fn test_untagged_fallback_order() {
        let no_pct = MarginBreakdown {
            margin: dec!(150),
            margin_percentage: Decimal::ZERO,
            selling_price: dec!(950),
        };
        let repriced = reprice_for_purchasing(dec!(850), &no_pct, None);
        assert_eq!(repriced.margin, dec!(150));
        assert_eq!(repriced.selling_price, dec!(1000));

        let only_selling = MarginBreakdown {
            margin: Decimal::ZERO,
            margin_percentage: Decimal::ZERO,
            selling_price: dec!(950),
        };
        let repriced = reprice_for_purchasing(dec!(850), &only_selling, None);
        assert_eq!(repriced.selling_price, dec!(950));
        assert_eq!(repriced.margin, dec!(100));
    }

    #[test]
    fn test_out_of_range_percentage_yields_zero_margin() {
        let trio = derive_margin(dec!(800), PriceInput::MarginPercent(dec!(100)));
        assert_eq!(trio.margin, Decimal::ZERO);
        assert_eq!(trio.selling_price, dec!(800));
    }
}
