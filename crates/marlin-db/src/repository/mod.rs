//! # Repositories
//!
//! One repository per aggregate, each owning a clone of the pool.
//!
//! ## Row Mapping
//! Monetary columns are stored as TEXT and parsed into `Decimal` here, at
//! the row boundary. A row that fails to parse was written outside the
//! repositories and surfaces as [`DbError::Decode`].

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

pub mod customer_price;
pub mod export_price;
pub mod product;
pub mod rates;
pub mod variant;

/// Generates a new UUID v4 entity id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parses a TEXT monetary column into a Decimal.
pub(crate) fn parse_decimal(column: &str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| DbError::decode(column, value))
}

/// Parses an optional TEXT monetary column.
pub(crate) fn parse_opt_decimal(column: &str, value: Option<&str>) -> DbResult<Option<Decimal>> {
    value.map(|v| parse_decimal(column, v)).transpose()
}
