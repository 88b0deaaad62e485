//! # Validation Module
//!
//! Input validation rules for Marlin.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller input (forms, imports)                                │
//! │  ├── THIS MODULE: rejected before any calculation runs                 │
//! │  └── No partial write ever happens on a validation failure             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Calculators (marlin-core)                                    │
//! │  ├── Undefined arithmetic → safe 0, never a panic                      │
//! │  └── Missing freight rate → freight = 0 + warning                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use marlin_core::validation::{validate_usd_rate, validate_percentage};
//! use rust_decimal::Decimal;
//!
//! validate_usd_rate(Decimal::from(300)).unwrap();
//! assert!(validate_percentage("profit_margin", Decimal::from(100)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Monetary Validators
// =============================================================================

/// Validates a purchase/cost price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (cost not yet known)
pub fn validate_price(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an exchange rate (LKR per USD).
///
/// ## Rules
/// - Must be strictly positive; a zero rate cannot price anything
pub fn validate_usd_rate(rate: Decimal) -> ValidationResult<()> {
    if rate <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "usd_rate".to_string(),
        });
    }
    Ok(())
}

/// Validates a margin/profit percentage.
///
/// ## Rules
/// - Must be at least 0 and strictly below 100
/// - 100 makes the inversion formula divide by zero; the calculators would
///   fall back to 0, so it is rejected here instead of silently ignored
pub fn validate_percentage(field: &str, pct: Decimal) -> ValidationResult<()> {
    if pct < Decimal::ZERO || pct >= Decimal::ONE_HUNDRED {
        return Err(ValidationError::PercentOutOfRange {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an air-freight gross-weight divisor.
///
/// ## Rules
/// - Must be at least 1 (the default)
pub fn validate_divisor(divisor: Decimal) -> ValidationResult<()> {
    if divisor < Decimal::ONE {
        return Err(ValidationError::DivisorTooSmall {
            got: divisor.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a country name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 80 characters
pub fn validate_country(country: &str) -> ValidationResult<()> {
    let country = country.trim();
    if country.is_empty() {
        return Err(ValidationError::Required {
            field: "country".to_string(),
        });
    }
    if country.len() > 80 {
        return Err(ValidationError::TooLong {
            field: "country".to_string(),
            max: 80,
        });
    }
    Ok(())
}

/// Validates an airport or port code.
///
/// ## Rules
/// - Must not be empty when present
/// - Must be at most 10 characters
/// - Only alphanumeric characters
pub fn validate_location_code(field: &str, code: &str) -> ValidationResult<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if code.len() > 10 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 10,
        });
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_price() {
        assert!(validate_price("purchasing_price", dec!(1000)).is_ok());
        assert!(validate_price("purchasing_price", Decimal::ZERO).is_ok());
        assert!(validate_price("purchasing_price", dec!(-1)).is_err());
    }

    #[test]
    fn test_validate_usd_rate() {
        assert!(validate_usd_rate(dec!(300)).is_ok());
        assert!(validate_usd_rate(Decimal::ZERO).is_err());
        assert!(validate_usd_rate(dec!(-300)).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage("profit_margin", Decimal::ZERO).is_ok());
        assert!(validate_percentage("profit_margin", dec!(99.99)).is_ok());
        assert!(validate_percentage("profit_margin", dec!(100)).is_err());
        assert!(validate_percentage("profit_margin", dec!(-1)).is_err());
    }

    #[test]
    fn test_validate_divisor() {
        assert!(validate_divisor(Decimal::ONE).is_ok());
        assert!(validate_divisor(dec!(2.5)).is_ok());
        assert!(validate_divisor(dec!(0.5)).is_err());
        assert!(validate_divisor(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_validate_country() {
        assert!(validate_country("Japan").is_ok());
        assert!(validate_country("  ").is_err());
        assert!(validate_country(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_location_code() {
        assert!(validate_location_code("airport_code", "NRT").is_ok());
        assert!(validate_location_code("port_code", "JPYOK").is_ok());
        assert!(validate_location_code("airport_code", "").is_err());
        assert!(validate_location_code("airport_code", "N R T").is_err());
        assert!(validate_location_code("airport_code", "TOOLONGCODE1").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
