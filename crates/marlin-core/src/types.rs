//! # Domain Types
//!
//! Core domain records used throughout Marlin.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Records                                  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌────────────────────┐   │
//! │  │    Product      │   │  ProductVariant  │   │   ExportVariant    │   │
//! │  │  ─────────────  │   │  ──────────────  │   │  ────────────────  │   │
//! │  │  id (UUID)      │──►│  size / unit     │──►│  usd_rate snapshot │   │
//! │  │  common_name    │   │  purchasing (LKR)│   │  packing / labour  │   │
//! │  │  category       │   │                  │   │  profit → ex-fact. │   │
//! │  └─────────────────┘   └──────────────────┘   └────────────────────┘   │
//! │          │ snapshot at creation time                   │               │
//! │          ▼                                             ▼               │
//! │  ┌─────────────────┐                        ┌────────────────────┐     │
//! │  │  CustomerPrice  │                        │ ExportCustomerPrice│     │
//! │  │  (local, LKR)   │                        │ (FOB/CNF, USD)     │     │
//! │  └─────────────────┘                        └────────────────────┘     │
//! │                                                                         │
//! │  Rate histories (append-only): AirFreightRate, SeaFreightRate, UsdRate │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Price records freeze `common_name`/`category`/`size_range` at creation or
//! edit time instead of live-joining the product. A renamed product leaves
//! older price rows showing the old name - deliberate staleness, not a bug.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has an immutable UUID v4 `id`; rate rows additionally carry
//! their business key (country + location code).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::round_per_kilo;

// =============================================================================
// Freight Enums
// =============================================================================

/// How an export shipment travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightType {
    /// Air freight, priced per kg across four weight tiers.
    Air,
    /// Sea freight, priced per kilo derived from a container rate.
    Sea,
}

impl FreightType {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            FreightType::Air => "air",
            FreightType::Sea => "sea",
        }
    }

    /// Parses the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "air" => Some(FreightType::Air),
            "sea" => Some(FreightType::Sea),
            _ => None,
        }
    }
}

/// Shipping container size for sea freight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    /// 20-foot container.
    TwentyFt,
    /// 40-foot container.
    FortyFt,
}

impl ContainerType {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerType::TwentyFt => "20ft",
            ContainerType::FortyFt => "40ft",
        }
    }

    /// Parses the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "20ft" => Some(ContainerType::TwentyFt),
            "40ft" => Some(ContainerType::FortyFt),
            _ => None,
        }
    }
}

// =============================================================================
// Weight Tiers
// =============================================================================

/// One value per air-freight weight bracket (45/100/300/500 kg).
///
/// The same shape carries per-kg tariff rates, computed freight costs and
/// CNF prices - the four brackets never vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierSet {
    pub kg45: Decimal,
    pub kg100: Decimal,
    pub kg300: Decimal,
    pub kg500: Decimal,
}

impl TierSet {
    /// All four tiers zero.
    pub fn zero() -> Self {
        TierSet::default()
    }

    /// Applies `f` to each tier independently.
    pub fn map(&self, f: impl Fn(Decimal) -> Decimal) -> TierSet {
        TierSet {
            kg45: f(self.kg45),
            kg100: f(self.kg100),
            kg300: f(self.kg300),
            kg500: f(self.kg500),
        }
    }

    /// True when every tier is zero.
    pub fn is_zero(&self) -> bool {
        *self == TierSet::default()
    }
}

// =============================================================================
// Catalogue
// =============================================================================

/// A seafood product in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Trade name shown on price lists (e.g. "Yellowfin Tuna").
    pub common_name: String,

    /// Latin name, when recorded.
    pub scientific_name: Option<String>,

    /// Catalogue category (e.g. "Fresh Fish", "Crustaceans").
    pub category: String,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A size/unit variant of a product, with its local purchase cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: String,
    pub product_id: String,

    /// Size label (e.g. "1-2kg", "U10").
    pub size: String,

    /// Selling unit (e.g. "kg", "piece").
    pub unit: String,

    /// Purchase cost in LKR. Never negative.
    pub purchasing_price: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An export-side variant: purchase cost plus USD-denominated packing and
/// labour costs, a profit input and the derived ex-factory price.
///
/// ## Invariants
/// - `profit` is the authoritative input at rest; `profit_margin` is always
///   re-derived from it (and vice versa during a margin-percent edit)
/// - `ex_factory_price` is always re-derived, never independently edited
/// - `usd_rate` is a snapshot taken when the variant was saved; it is only
///   refreshed by an exchange-rate recalculation batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportVariant {
    pub id: String,
    pub product_id: String,

    pub size: String,
    pub unit: String,

    /// Purchase cost in LKR.
    pub purchasing_price: Decimal,

    /// Exchange rate snapshot (LKR per USD) at save time.
    pub usd_rate: Decimal,

    /// Packing cost per unit, in USD.
    pub packing_cost: Decimal,

    /// Labour overhead per unit, in USD.
    pub labour_overhead: Decimal,

    /// Profit per unit in LKR (authoritative at rest).
    pub profit: Decimal,

    /// Profit margin in percent, derived from `profit`.
    pub profit_margin: Decimal,

    /// Derived: cost price + profit, in LKR.
    pub ex_factory_price: Decimal,

    /// Gross chargeable weight multiplier for air freight.
    pub multiplier: Option<Decimal>,

    /// Gross-weight divisor, at least 1. Defaults to 1.
    pub divisor: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields frozen onto a price record at creation/edit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product trade name at snapshot time.
    pub common_name: String,
    /// Category at snapshot time.
    pub category: String,
    /// Variant size label at snapshot time.
    pub size_range: String,
}

// =============================================================================
// Local Customer Price
// =============================================================================

/// Which margin field the user edited last.
///
/// Recording the tag removes any ambiguity about precedence when more than
/// one field is non-zero (e.g. after an external import).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceInputKind {
    Margin,
    MarginPercent,
    SellingPrice,
}

impl PriceInputKind {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceInputKind::Margin => "margin",
            PriceInputKind::MarginPercent => "margin_percent",
            PriceInputKind::SellingPrice => "selling_price",
        }
    }

    /// Parses the database string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "margin" => Some(PriceInputKind::Margin),
            "margin_percent" => Some(PriceInputKind::MarginPercent),
            "selling_price" => Some(PriceInputKind::SellingPrice),
            _ => None,
        }
    }
}

/// A local customer's price for one product variant.
///
/// ## Invariants (after every edit)
/// - `selling_price = purchasing_price + margin`
/// - `margin_percentage = margin / selling_price * 100` (0 when selling
///   price is 0)
/// - a negative `margin` signals a loss; it is kept, only flagged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerPrice {
    pub id: String,
    pub customer_id: String,
    pub variant_id: String,

    /// Frozen product fields (see [`ProductSnapshot`] staleness contract).
    pub snapshot: ProductSnapshot,

    /// Purchase cost in LKR.
    pub purchasing_price: Decimal,

    /// Margin in LKR.
    pub margin: Decimal,

    /// Margin as a percentage of selling price.
    pub margin_percentage: Decimal,

    /// Selling price in LKR.
    pub selling_price: Decimal,

    /// Which field was edited last. Absent for imported rows.
    pub last_input: Option<PriceInputKind>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Export Customer Price
// =============================================================================

/// One overhead cost line, enterable in either currency.
///
/// Whichever side was last edited drives the other through the currency
/// converter; both are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CostLine {
    pub usd: Decimal,
    pub lkr: Decimal,
}

/// The fixed set of export overhead cost lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverheadCosts {
    pub documentation: CostLine,
    pub transport: CostLine,
    pub loading: CostLine,
    pub airway: CostLine,
    pub forwarding: CostLine,
}

impl OverheadCosts {
    /// Sum of the LKR side of all five lines.
    pub fn total_lkr(&self) -> Decimal {
        self.documentation.lkr
            + self.transport.lkr
            + self.loading.lkr
            + self.airway.lkr
            + self.forwarding.lkr
    }
}

/// An export customer's price record: ex-factory price, overheads, FOB and
/// freight-type-specific CNF values.
///
/// ## Invariants
/// - `fob_price = ex_factory_price + Σ overhead LKR`
/// - air: `cnf.kgN = fob_price / usd_rate + freight_costs.kgN` per tier
/// - sea: `cnf_sea = fob_price / usd_rate + freight_cost_sea`
/// - the fields of the *inactive* freight type are zeroed (see
///   [`crate::cnf::switch_freight_type`])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportCustomerPrice {
    pub id: String,
    pub customer_id: String,
    pub variant_id: String,

    /// Frozen product fields (see [`ProductSnapshot`] staleness contract).
    pub snapshot: ProductSnapshot,

    /// Ex-factory price in LKR, copied from the export variant.
    pub ex_factory_price: Decimal,

    /// Exchange rate snapshot (LKR per USD).
    pub usd_rate: Decimal,

    /// The five overhead cost lines.
    pub overheads: OverheadCosts,

    /// Derived: ex-factory price + overhead LKR total.
    pub fob_price: Decimal,

    /// Active freight type.
    pub freight_type: FreightType,

    /// Destination country, used to resolve freight rates.
    pub country: String,

    /// Destination airport code (air freight), e.g. "NRT".
    pub airport_code: Option<String>,

    /// Destination port code (sea freight), e.g. "JPYOK".
    pub port_code: Option<String>,

    /// Gross chargeable weight multiplier (air only).
    pub multiplier: Option<Decimal>,

    /// Gross-weight divisor (air only), at least 1.
    pub divisor: Decimal,

    /// Per-tier air freight costs in USD.
    pub freight_costs: TierSet,

    /// Per-tier CNF prices in USD.
    pub cnf: TierSet,

    /// Chosen container (sea only).
    pub container_type: Option<ContainerType>,

    /// Sea freight cost in USD per kilo (4-decimal precision).
    pub freight_cost_sea: Decimal,

    /// Sea CNF price in USD.
    pub cnf_sea: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Rate Histories
// =============================================================================

/// One row of the air freight tariff history.
///
/// Rows are append-only: editing a tariff adds a row; past CNF computations
/// are only revisited when a recalculation batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirFreightRate {
    pub id: String,

    /// Destination country.
    pub country: String,

    /// Destination airport code, when the tariff is airport-specific.
    pub airport_code: Option<String>,

    /// Per-kg USD rates for the four weight tiers.
    pub rates: TierSet,

    /// Date the tariff takes effect.
    pub effective_date: NaiveDate,

    pub updated_at: DateTime<Utc>,
}

/// One row of the sea freight tariff history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeaFreightRate {
    pub id: String,

    pub country: String,
    pub port_code: String,
    pub port_name: String,

    /// Rate in USD for a 20ft container.
    pub rate_20ft: Decimal,
    /// Capacity in kilos of a 20ft container.
    pub kilos_20ft: Decimal,

    /// Rate in USD for a 40ft container.
    pub rate_40ft: Decimal,
    /// Capacity in kilos of a 40ft container.
    pub kilos_40ft: Decimal,

    /// Derived: rate_20ft / kilos_20ft, 4 decimals.
    pub freight_per_kilo_20ft: Decimal,
    /// Derived: rate_40ft / kilos_40ft, 4 decimals.
    pub freight_per_kilo_40ft: Decimal,

    pub effective_date: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl SeaFreightRate {
    /// Recomputes both per-kilo fields from the container rates.
    ///
    /// A zero or missing capacity yields a per-kilo of 0 rather than a
    /// division error.
    pub fn derive_per_kilo(&mut self) {
        self.freight_per_kilo_20ft = per_kilo(self.rate_20ft, self.kilos_20ft);
        self.freight_per_kilo_40ft = per_kilo(self.rate_40ft, self.kilos_40ft);
    }

    /// The precomputed per-kilo rate for a container size.
    pub fn freight_per_kilo(&self, container: ContainerType) -> Decimal {
        match container {
            ContainerType::TwentyFt => self.freight_per_kilo_20ft,
            ContainerType::FortyFt => self.freight_per_kilo_40ft,
        }
    }
}

fn per_kilo(rate: Decimal, kilos: Decimal) -> Decimal {
    if kilos <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_per_kilo(rate / kilos)
}

/// One row of the exchange-rate history (LKR per USD).
///
/// The most recently updated entry is authoritative; the orchestrator takes
/// the new rate as an explicit parameter rather than reading ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsdRate {
    pub id: String,

    /// LKR per USD. Always positive.
    pub rate: Decimal,

    /// Date the rate takes effect.
    pub effective_date: NaiveDate,

    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_freight_type_round_trip() {
        assert_eq!(FreightType::parse("air"), Some(FreightType::Air));
        assert_eq!(FreightType::parse("sea"), Some(FreightType::Sea));
        assert_eq!(FreightType::parse("rail"), None);
        assert_eq!(FreightType::Sea.as_str(), "sea");
    }

    #[test]
    fn test_container_type_round_trip() {
        assert_eq!(ContainerType::parse("20ft"), Some(ContainerType::TwentyFt));
        assert_eq!(ContainerType::parse("40ft"), Some(ContainerType::FortyFt));
        assert_eq!(ContainerType::parse("60ft"), None);
    }

    #[test]
    fn test_serde_tags_match_db_strings() {
        // the JSON tag and the stored TEXT tag must never diverge
        for freight_type in [FreightType::Air, FreightType::Sea] {
            let json = serde_json::to_string(&freight_type).unwrap();
            assert_eq!(json, format!("\"{}\"", freight_type.as_str()));
        }
        for kind in [
            PriceInputKind::Margin,
            PriceInputKind::MarginPercent,
            PriceInputKind::SellingPrice,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_tier_set_map() {
        let rates = TierSet {
            kg45: dec!(3.69),
            kg100: dec!(3.20),
            kg300: dec!(2.95),
            kg500: dec!(2.80),
        };
        let doubled = rates.map(|r| r * dec!(2));
        assert_eq!(doubled.kg45, dec!(7.38));
        assert_eq!(doubled.kg500, dec!(5.60));
        assert!(TierSet::zero().is_zero());
        assert!(!rates.is_zero());
    }

    #[test]
    fn test_overhead_total_lkr() {
        let mut overheads = OverheadCosts::default();
        overheads.documentation.lkr = dec!(1500);
        overheads.transport.lkr = dec!(3000);
        overheads.forwarding.lkr = dec!(250.50);
        assert_eq!(overheads.total_lkr(), dec!(4750.50));
    }

    #[test]
    fn test_sea_rate_per_kilo_derivation() {
        let mut rate = SeaFreightRate {
            id: "r1".to_string(),
            country: "Japan".to_string(),
            port_code: "JPYOK".to_string(),
            port_name: "Yokohama".to_string(),
            rate_20ft: dec!(2450),
            kilos_20ft: dec!(26000),
            rate_40ft: dec!(3900),
            kilos_40ft: dec!(52000),
            freight_per_kilo_20ft: Decimal::ZERO,
            freight_per_kilo_40ft: Decimal::ZERO,
            effective_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            updated_at: Utc::now(),
        };
        rate.derive_per_kilo();
        assert_eq!(rate.freight_per_kilo_20ft, dec!(0.0942));
        assert_eq!(rate.freight_per_kilo_40ft, dec!(0.0750));
        assert_eq!(
            rate.freight_per_kilo(ContainerType::TwentyFt),
            dec!(0.0942)
        );
    }

    #[test]
    fn test_sea_rate_zero_capacity_is_safe() {
        let mut rate = SeaFreightRate {
            id: "r2".to_string(),
            country: "Japan".to_string(),
            port_code: "JPYOK".to_string(),
            port_name: "Yokohama".to_string(),
            rate_20ft: dec!(2450),
            kilos_20ft: Decimal::ZERO,
            rate_40ft: dec!(3900),
            kilos_40ft: dec!(52000),
            freight_per_kilo_20ft: dec!(99),
            freight_per_kilo_40ft: dec!(99),
            effective_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            updated_at: Utc::now(),
        };
        rate.derive_per_kilo();
        assert_eq!(rate.freight_per_kilo_20ft, Decimal::ZERO);
        assert_eq!(rate.freight_per_kilo_40ft, dec!(0.0750));
    }
}
