//! # marlin-core: Pure Pricing Logic for Marlin
//!
//! This crate is the **heart** of Marlin, a pricing catalogue for a seafood
//! exporter. It contains every pricing and freight formula as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Marlin Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   marlin-recalc (Batch Layer)                   │   │
//! │  │    USD rate changed ──► re-derive every dependent price         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ marlin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │ currency │ │  margin  │ │ costplus │ │ freight  │         │   │
//! │  │   │ LKR⇄USD  │ │  local   │ │ex-factory│ │ resolve  │         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐                      │   │
//! │  │   │   cnf    │ │  types   │ │validation│                      │   │
//! │  │   │ FOB/CNF  │ │ records  │ │  rules   │                      │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘                      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    marlin-db (Database Layer)                   │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (ProductVariant, ExportCustomerPrice, rates)
//! - [`currency`] - LKR⇄USD conversion and rounding policy
//! - [`margin`] - Local customer pricing (margin / margin% / selling price)
//! - [`costplus`] - Export ex-factory pricing (cost plus profit)
//! - [`freight`] - Freight rate resolution and air/sea freight costs
//! - [`cnf`] - FOB assembly and CNF per tier/container
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every calculator is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Decimal Money**: All monetary values are `rust_decimal::Decimal`,
//!    rounded to 2 decimals (4 for sea per-kilo rates) before storage
//! 4. **Safe Defaults**: An unconvertible value (zero exchange rate, missing
//!    freight rate) yields 0, never a panic
//!
//! ## Example Usage
//!
//! ```rust
//! use marlin_core::currency::{to_usd, to_lkr};
//! use rust_decimal::Decimal;
//!
//! let rate = Decimal::from(300);          // 300 LKR per USD
//! let fob = Decimal::from(50_000);        // LKR
//!
//! // 50,000 LKR at 300 LKR/USD = 166.67 USD
//! assert_eq!(to_usd(fob, rate), Decimal::new(16_667, 2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cnf;
pub mod costplus;
pub mod currency;
pub mod error;
pub mod freight;
pub mod margin;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use marlin_core::ExportCustomerPrice` instead of
// `use marlin_core::types::ExportCustomerPrice`

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default gross-weight divisor for air freight.
///
/// ## Why a constant?
/// A variant saved without an explicit divisor behaves as if the chargeable
/// weight ratio were multiplier/1. Divisors below 1 are rejected by
/// validation.
pub const DEFAULT_DIVISOR: u32 = 1;
