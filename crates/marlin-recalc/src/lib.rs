//! # marlin-recalc: Recalculation Orchestrator for Marlin
//!
//! When a shared rate changes - the LKR/USD exchange rate or a country's
//! air/sea freight tariff - every stored price derived from it is stale.
//! This crate re-derives them in best-effort batches.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   rate edit ──► marlin-recalc (THIS CRATE) ──► marlin-db ──► SQLite     │
//! │                       │                                                  │
//! │                       └── pure math from marlin-core                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`orchestrator`] - The [`Orchestrator`] and its three cascade triggers
//! - [`error`] - [`RecalcError`] for batch-fatal conditions

pub mod error;
pub mod orchestrator;

pub use error::{RecalcError, RecalcResult};
pub use orchestrator::{BatchOutcome, Orchestrator, RecalcReport};
