//! # marlin-db: Database Layer for Marlin
//!
//! SQLite persistence for the pricing catalogue: products, variants,
//! customer price records and the append-only rate histories.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   marlin-recalc ──► marlin-db (THIS CRATE) ──► SQLite                   │
//! │                          │                                              │
//! │                          └── row structs parse TEXT columns into       │
//! │                              marlin-core Decimal domain records        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`pool`] - Connection pool and the [`Database`] handle
//! - [`migrations`] - Embedded schema migrations
//! - [`repository`] - One repository per aggregate
//! - [`error`] - [`DbError`] taxonomy

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
